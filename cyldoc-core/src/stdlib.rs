use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

static FUNCTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+)$").expect("function heading pattern"));

/// Standard library docs: the raw markdown and its `##` headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdlibDocs {
    pub content: String,
    pub functions: Vec<String>,
}

pub fn parse(content: &str) -> StdlibDocs {
    let functions = FUNCTION_HEADING
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .collect();

    StdlibDocs {
        content: content.to_string(),
        functions,
    }
}

/// Read a STDLIB.md file. Missing or unreadable files give `None`.
pub fn load<P: AsRef<Path>>(path: P) -> Option<StdlibDocs> {
    let path = path.as_ref();
    info!("Extracting standard library from {}", path.display());

    if !path.is_file() {
        warn!("Standard library docs not found: {}", path.display());
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Some(parse(&content)),
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            None
        }
    }
}
