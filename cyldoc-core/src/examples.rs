use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const EXAMPLE_EXTENSION: &str = "cyl";

/// An example program shown on the examples page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleProgram {
    pub name: String,
    pub filename: String,
    pub code: String,
    pub description: String,
}

/// Collect the `.cyl` programs sitting directly in `dir`, sorted by file name.
///
/// Empty files are skipped. A missing directory yields no examples.
pub fn scan<P: AsRef<Path>>(dir: P) -> Vec<ExampleProgram> {
    let dir = dir.as_ref();
    info!("Extracting examples from {}", dir.display());

    if !dir.is_dir() {
        warn!("Examples directory not found: {}", dir.display());
        return Vec::new();
    }

    let mut examples = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == EXAMPLE_EXTENSION)
                    .unwrap_or(false)
        })
    {
        let path = entry.path();
        let code = match std::fs::read_to_string(path) {
            Ok(code) => code,
            Err(e) => {
                warn!("Skipping unreadable example {}: {}", path.display(), e);
                continue;
            }
        };

        if code.trim().is_empty() {
            debug!("Skipping empty example {}", path.display());
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        examples.push(ExampleProgram {
            name: title_case(&stem.replace('_', " ")),
            description: describe(&stem, &code),
            code: code.trim().to_string(),
            filename,
        });
    }

    info!("Found {} examples", examples.len());
    examples
}

/// Guess a one-line description from the first familiar construct in `code`.
fn describe(stem: &str, code: &str) -> String {
    let name = stem.replace('_', " ");
    let blurb = [
        ("print", "Demonstrates printing and basic output"),
        ("let", "Shows variable declaration and usage"),
        ("if", "Illustrates conditional logic and control flow"),
        ("fn", "Example of function definition and usage"),
    ]
    .into_iter()
    .find(|(keyword, _)| code.contains(keyword))
    .map(|(_, blurb)| blurb)
    .unwrap_or("Example Cyl program");

    format!("{} - {}", name, blurb)
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }

    out
}
