use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use cyldoc_core::DocsBuilder;
use tracing::info;

use crate::config::load_build_config;

// No clap defaults here: unset args fall through to env, file and defaults
pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Project root containing CHANGELOG.md and examples/ [default: .]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated site [default: ./docs/website]"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory with templates and assets [default: ./theme]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./cyldoc.toml]"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build the documentation site")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = load_build_config(args)?;
    let build = config.build_config();

    let site = DocsBuilder::new()
        .project_root(&build.root)
        .output_dir(&build.output)
        .theme_dir(&build.theme)
        .config(config.site_config().clone())
        .build()?;

    info!(
        versions = site.changelog().versions.len(),
        examples = site.examples().len(),
        "Collected site data"
    );

    site.render_all()?;

    println!("Documentation built in {}", site.output_dir().display());

    Ok(())
}
