use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use cyldoc_core::changelog;

pub fn make_subcommand() -> Command {
    Command::new("changelog")
        .about("Print the structured changelog as JSON")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Changelog to extract")
                .default_value("CHANGELOG.md"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<String>("file")
        .map(String::as_str)
        .unwrap_or("CHANGELOG.md");

    println!("{}", changelog_json(Path::new(path))?);

    Ok(())
}

/// Pretty-printed JSON for the changelog at `path`.
fn changelog_json(path: &Path) -> Result<String> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let result = changelog::extract(&document);

    Ok(serde_json::to_string_pretty(&result)?)
}
