//! Test coverage summaries for the coverage page.
//!
//! TypeScript coverage comes from an istanbul `coverage-summary.json`, or
//! failing that from the percentages in its HTML `index.html`. Rust coverage
//! comes from a Cobertura `cobertura.xml`. Every report is optional; a report
//! that can't be parsed is logged and left out.

use std::path::Path;
use std::sync::LazyLock;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

const SUMMARY_JSON: &str = "coverage-summary.json";
const HTML_INDEX: &str = "index.html";
const COBERTURA_XML: &str = "cobertura.xml";

const GREEN: &str = "#28a745";
const YELLOW: &str = "#ffc107";
const RED: &str = "#dc3545";

static HTML_FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<span class='fraction'>(\d+)/(\d+)</span>").expect("fraction pattern")
});

#[derive(Debug, Error)]
enum CoverageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("no overall percentages found")]
    MissingTotals,
}

/// One coverage figure with its display color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub pct: f64,
    pub covered: u64,
    pub total: u64,
    pub color: String,
}

impl Metric {
    fn new(pct: f64, covered: u64, total: u64) -> Self {
        Self {
            pct,
            covered,
            total,
            color: coverage_color(pct).to_string(),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::new(0.0, 0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeScriptFile {
    pub name: String,
    pub statements: Metric,
    pub branches: Metric,
    pub functions: Metric,
    pub lines: Metric,
    pub overall_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeScriptCoverage {
    pub statements: Metric,
    pub branches: Metric,
    pub functions: Metric,
    pub lines: Metric,
    pub files: Vec<TypeScriptFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RustFile {
    pub name: String,
    pub lines: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RustCoverage {
    pub lines: Metric,
    pub files: Vec<RustFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageReport {
    /// Date (YYYY-MM-DD) of the newest report file.
    pub last_updated: Option<String>,
    pub typescript: Option<TypeScriptCoverage>,
    pub rust: Option<RustCoverage>,
}

/// Green from 80%, yellow from 60%, red below.
pub fn coverage_color(pct: f64) -> &'static str {
    if pct >= 80.0 {
        GREEN
    } else if pct >= 60.0 {
        YELLOW
    } else {
        RED
    }
}

/// Read whatever coverage reports exist in `dir`.
pub fn scan<P: AsRef<Path>>(dir: P) -> CoverageReport {
    let dir = dir.as_ref();
    info!("Extracting coverage information from {}", dir.display());

    let mut report = CoverageReport::default();
    if !dir.is_dir() {
        warn!("Coverage directory not found: {}", dir.display());
        return report;
    }

    let summary = dir.join(SUMMARY_JSON);
    if summary.is_file() {
        report.typescript = log_failure(&summary, parse_typescript_summary(&summary));
    }

    if report.typescript.is_none() {
        let index = dir.join(HTML_INDEX);
        if index.is_file() {
            report.typescript = log_failure(&index, parse_typescript_html(&index));
        }
    }

    let cobertura = dir.join(COBERTURA_XML);
    if cobertura.is_file() {
        report.rust = log_failure(&cobertura, parse_cobertura(&cobertura));
    }

    report.last_updated = last_updated(dir);

    info!(
        typescript = report.typescript.is_some(),
        rust = report.rust.is_some(),
        "Coverage data extracted"
    );
    report
}

fn log_failure<T>(path: &Path, result: Result<T, CoverageError>) -> Option<T> {
    result
        .map_err(|e| warn!("Error parsing coverage report {}: {}", path.display(), e))
        .ok()
}

fn parse_typescript_summary(path: &Path) -> Result<TypeScriptCoverage, CoverageError> {
    let data = std::fs::read_to_string(path)?;
    let summary: Value = serde_json::from_str(&data)?;
    Ok(typescript_from_summary(&summary))
}

/// Totals from the `total` entry, plus one row per file entry.
fn typescript_from_summary(summary: &Value) -> TypeScriptCoverage {
    let empty = Value::Null;
    let total = summary.get("total").unwrap_or(&empty);

    let files = summary
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(name, data)| name.as_str() != "total" && data.is_object())
        .map(|(name, data)| TypeScriptFile {
            name: name.clone(),
            statements: json_metric(data.get("statements")),
            branches: json_metric(data.get("branches")),
            functions: json_metric(data.get("functions")),
            lines: json_metric(data.get("lines")),
            overall_pct: data
                .get("lines")
                .and_then(|l| l.get("pct"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
        })
        .collect();

    TypeScriptCoverage {
        statements: json_metric(total.get("statements")),
        branches: json_metric(total.get("branches")),
        functions: json_metric(total.get("functions")),
        lines: json_metric(total.get("lines")),
        files,
    }
}

fn json_metric(metric: Option<&Value>) -> Metric {
    let Some(metric) = metric.filter(|m| m.is_object()) else {
        return Metric::default();
    };

    let number = |key: &str| metric.get(key).and_then(Value::as_u64).unwrap_or(0);
    Metric::new(
        metric.get("pct").and_then(Value::as_f64).unwrap_or(0.0),
        number("covered"),
        number("total"),
    )
}

fn parse_typescript_html(path: &Path) -> Result<TypeScriptCoverage, CoverageError> {
    let html = std::fs::read_to_string(path)?;
    typescript_from_html(&html).ok_or(CoverageError::MissingTotals)
}

/// Pull the headline percentages out of an istanbul HTML report.
fn typescript_from_html(html: &str) -> Option<TypeScriptCoverage> {
    let percent = |label: &str| -> Option<f64> {
        let pattern = format!(
            r#"<span class="strong">([0-9.]+)%\s*</span>\s*<span class="quiet">{}</span>"#,
            label
        );
        let caps = Regex::new(&pattern).ok()?.captures(html)?;
        caps[1].parse().ok()
    };

    let statements = percent("Statements")?;
    let lines = percent("Lines")?;
    let branches = percent("Branches").unwrap_or(0.0);
    let functions = percent("Functions").unwrap_or(0.0);

    // The first fraction on the page belongs to statements
    let (covered, total) = HTML_FRACTION
        .captures(html)
        .and_then(|caps| Some((caps[1].parse().ok()?, caps[2].parse().ok()?)))
        .unwrap_or((0, 0));

    Some(TypeScriptCoverage {
        statements: Metric::new(statements, covered, total),
        branches: Metric::new(branches, 0, 0),
        functions: Metric::new(functions, 0, 0),
        lines: Metric::new(lines, 0, 0),
        files: Vec::new(),
    })
}

// Cobertura layout: coverage > packages > package > classes > class, with
// <line> elements both directly under the class and under its methods.

#[derive(Debug, Default, Deserialize)]
struct Cobertura {
    #[serde(default)]
    packages: Packages,
}

#[derive(Debug, Default, Deserialize)]
struct Packages {
    #[serde(default)]
    package: Vec<Package>,
}

#[derive(Debug, Default, Deserialize)]
struct Package {
    #[serde(default)]
    classes: Classes,
}

#[derive(Debug, Default, Deserialize)]
struct Classes {
    #[serde(default)]
    class: Vec<Class>,
}

#[derive(Debug, Default, Deserialize)]
struct Class {
    #[serde(rename = "@filename", default)]
    filename: String,
    #[serde(default)]
    methods: Methods,
    #[serde(default)]
    lines: Lines,
}

#[derive(Debug, Default, Deserialize)]
struct Methods {
    #[serde(default)]
    method: Vec<Method>,
}

#[derive(Debug, Default, Deserialize)]
struct Method {
    #[serde(default)]
    lines: Lines,
}

#[derive(Debug, Default, Deserialize)]
struct Lines {
    #[serde(default)]
    line: Vec<Line>,
}

#[derive(Debug, Deserialize)]
struct Line {
    #[serde(rename = "@hits", default = "zero_hits")]
    hits: String,
}

fn zero_hits() -> String {
    "0".to_string()
}

impl Class {
    fn lines(&self) -> impl Iterator<Item = &Line> {
        self.methods
            .method
            .iter()
            .flat_map(|m| m.lines.line.iter())
            .chain(self.lines.line.iter())
    }
}

fn parse_cobertura(path: &Path) -> Result<RustCoverage, CoverageError> {
    let xml = std::fs::read_to_string(path)?;
    rust_from_cobertura(&xml)
}

fn rust_from_cobertura(xml: &str) -> Result<RustCoverage, CoverageError> {
    let report: Cobertura = quick_xml::de::from_str(xml)?;

    let mut files = Vec::new();
    let mut total_lines = 0u64;
    let mut covered_lines = 0u64;

    for class in report
        .packages
        .package
        .iter()
        .flat_map(|p| p.classes.class.iter())
    {
        let file_total = class.lines().count() as u64;
        let file_covered = class.lines().filter(|l| l.hits != "0").count() as u64;

        if file_total > 0 {
            let pct = file_covered as f64 / file_total as f64 * 100.0;
            files.push(RustFile {
                name: class.filename.clone(),
                lines: Metric {
                    pct: round2(pct),
                    covered: file_covered,
                    total: file_total,
                    color: coverage_color(pct).to_string(),
                },
            });
        }

        total_lines += file_total;
        covered_lines += file_covered;
    }

    let pct = if total_lines > 0 {
        covered_lines as f64 / total_lines as f64 * 100.0
    } else {
        0.0
    };

    Ok(RustCoverage {
        lines: Metric {
            pct: round2(pct),
            covered: covered_lines,
            total: total_lines,
            color: coverage_color(pct).to_string(),
        },
        files,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn last_updated(dir: &Path) -> Option<String> {
    [HTML_INDEX, COBERTURA_XML, SUMMARY_JSON]
        .iter()
        .filter_map(|name| std::fs::metadata(dir.join(name)).ok()?.modified().ok())
        .max()
        .map(|modified: SystemTime| DateTime::<Local>::from(modified).format("%Y-%m-%d").to_string())
}
