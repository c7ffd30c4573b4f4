//! Changelog extraction.
//!
//! A changelog is split into one [`VersionRecord`] per `## ` section. Each
//! record carries the section body rendered to HTML as well as a flat list of
//! the individual changes found in it, grouped by their `### ` category.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::markdown;

static SECTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## ").expect("section pattern"));
static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("semver pattern"));

/// Date shown for every release. Headings are not parsed for dates.
pub const UNDATED: &str = "Recent";
const DEFAULT_CATEGORY: &str = "Changes";
const NOTES_CATEGORY: &str = "Notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub category: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub version: String,
    pub date: String,
    pub anchor: String,
    pub content_html: String,
    pub changes: Vec<ChangeEntry>,
    pub summary: String,
}

/// Table of contents row for a single release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub version: String,
    pub date: String,
    pub anchor: String,
    pub summary: String,
}

impl From<&VersionRecord> for TocEntry {
    fn from(record: &VersionRecord) -> Self {
        Self {
            version: record.version.clone(),
            date: record.date.clone(),
            anchor: record.anchor.clone(),
            summary: record.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangelogResult {
    pub versions: Vec<VersionRecord>,
    pub toc: Vec<TocEntry>,
}

impl ChangelogResult {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Split a changelog document into version records.
///
/// Text before the first `## ` line is ignored. A document without any such
/// line yields an empty result.
pub fn extract(document: &str) -> ChangelogResult {
    let versions: Vec<VersionRecord> = SECTION_MARKER
        .split(document)
        .skip(1)
        .map(parse_section)
        .collect();
    let toc = versions.iter().map(TocEntry::from).collect();

    ChangelogResult { versions, toc }
}

/// Read and extract the changelog at `path`.
///
/// A missing or unreadable file is not an error for a docs build; it is
/// logged and an empty result is returned.
pub fn load<P: AsRef<Path>>(path: P) -> ChangelogResult {
    let path = path.as_ref();
    info!("Extracting changelog from {}", path.display());

    let document = match std::fs::read_to_string(path) {
        Ok(document) => document,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Changelog not found: {}", path.display());
            return ChangelogResult::default();
        }
        Err(e) => {
            warn!("Failed to read changelog {}: {}", path.display(), e);
            return ChangelogResult::default();
        }
    };

    let result = extract(&document);
    info!("Found {} changelog entries", result.versions.len());
    result
}

fn parse_section(section: &str) -> VersionRecord {
    let mut lines = section.trim().split('\n');
    let heading = lines.next().unwrap_or_default().trim();
    let body: Vec<&str> = lines.collect();

    let version = version_from_heading(heading);
    let anchor = anchor_for(&version);
    debug!(%version, %anchor, "parsed changelog section");

    let changes = parse_changes(&body);
    let summary = if changes.is_empty() {
        "Initial release".to_string()
    } else {
        format!("{} changes", changes.len())
    };

    VersionRecord {
        version,
        date: UNDATED.to_string(),
        anchor,
        content_html: markdown::render(&body.join("\n")),
        changes,
        summary,
    }
}

/// Prefer a semantic version anywhere in the heading, else whatever precedes
/// the first parenthesis.
fn version_from_heading(heading: &str) -> String {
    if let Some(semver) = SEMVER.find(heading) {
        return semver.as_str().to_string();
    }

    match heading.split('(').next() {
        Some(prefix) if !prefix.is_empty() => prefix.trim().to_string(),
        _ => heading.to_string(),
    }
}

/// Anchor slug used to link to a release, e.g. `1.2.3` becomes `v1-2-3`.
pub fn anchor_for(version: &str) -> String {
    format!("v{}", version.replace(['.', ' '], "-")).to_lowercase()
}

fn parse_changes(lines: &[&str]) -> Vec<ChangeEntry> {
    let mut changes = Vec::new();
    let mut category: Option<&str> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(heading) = line.strip_prefix("### ") {
            category = Some(heading.trim());
        } else if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            changes.push(ChangeEntry {
                category: category
                    .filter(|c| !c.is_empty())
                    .unwrap_or(DEFAULT_CATEGORY)
                    .to_string(),
                text: text.trim().to_string(),
            });
        } else if !line.starts_with('#') {
            changes.push(ChangeEntry {
                category: NOTES_CATEGORY.to_string(),
                text: line.to_string(),
            });
        }
    }

    changes
}
