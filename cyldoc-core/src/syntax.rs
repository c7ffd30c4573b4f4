//! Syntax reference rules for the syntax page.
//!
//! Rules come from the `[syntax]` config section, grouped by category, and are
//! topped up with one entry per `parse_*` function found in the compiler's
//! parser sources.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{SyntaxCategory, SyntaxConfig};
use crate::examples::title_case;

/// Parser sources, relative to the project root.
const PARSER_SOURCES: [&str; 4] = [
    "compiler/src/parser.rs",
    "compiler/src/parser/mod.rs",
    "compiler/src/parser/statements.rs",
    "compiler/src/parser/expressions.rs",
];

const DEFAULT_ICON: &str = "file-text";
const INTERNALS_CATEGORY: &str = "parser_internals";
const INTERNALS_NAME: &str = "Parser Internals";

static PARSE_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fn\s+(parse_\w+)").expect("parse fn pattern"));

/// One entry on the syntax page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxRule {
    pub name: String,
    pub category: String,
    pub category_name: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub syntax: String,
    pub description: String,
    pub examples: Vec<String>,
    pub heritage: String,
    pub category_icon: Option<String>,
    pub category_description: Option<String>,
}

/// Build the rule list from the config plus the parser sources under
/// `project_root`.
pub fn extract<P: AsRef<Path>>(project_root: P, config: &SyntaxConfig) -> Vec<SyntaxRule> {
    info!("Extracting syntax information");

    let mut rules = configured_rules(config);
    let categories = rules
        .iter()
        .map(|r| r.category.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    for function in parser_functions(project_root.as_ref()) {
        add_parser_rule(&mut rules, &function);
    }

    info!(
        "Generated {} syntax rules across {} categories",
        rules.len(),
        categories
    );
    rules
}

/// Rules from the config, in category order. Categories without rules are
/// dropped.
pub fn configured_rules(config: &SyntaxConfig) -> Vec<SyntaxRule> {
    let mut rules = Vec::new();

    for category in &config.categories {
        let Some(configured) = config.rules.get(&category.id) else {
            continue;
        };

        // Later categories with the same id override earlier metadata
        let metadata = config
            .categories
            .iter()
            .rev()
            .find(|c| c.id == category.id)
            .unwrap_or(category);

        rules.extend(configured.iter().map(|rule| SyntaxRule {
            name: rule.name.clone(),
            category: category.id.clone(),
            category_name: category.name.clone(),
            rule_type: rule_type(&category.id).to_string(),
            syntax: rule.syntax.clone(),
            description: rule.description.clone(),
            examples: rule.examples.clone(),
            heritage: rule.heritage.clone(),
            category_icon: Some(icon(metadata)),
            category_description: Some(metadata.description.clone().unwrap_or_default()),
        }));
    }

    rules
}

fn icon(category: &SyntaxCategory) -> String {
    category
        .icon
        .clone()
        .unwrap_or_else(|| DEFAULT_ICON.to_string())
}

/// Rule type shown for a category id.
pub fn rule_type(category_id: &str) -> &'static str {
    match category_id {
        "declarations" => "declaration",
        "statements" => "statement",
        "expressions" => "expression",
        "control_flow" => "control_structure",
        "types" => "primitive_type",
        "operators" => "operator",
        "comments" => "comment",
        _ => "syntax_rule",
    }
}

/// Names of the `parse_*` functions in the parser sources, in file order.
fn parser_functions(project_root: &Path) -> Vec<String> {
    let mut functions = Vec::new();

    for source in PARSER_SOURCES {
        let path = project_root.join(source);
        if !path.is_file() {
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!("Found parser file {}", path.display());
                functions.extend(
                    PARSE_FN
                        .captures_iter(&content)
                        .map(|caps| caps[1].to_string()),
                );
            }
            Err(e) => warn!("Error reading {}: {}", path.display(), e),
        }
    }

    functions
}

/// `parse_binary_expr` becomes "Binary Expr"
pub fn parser_rule_name(function: &str) -> String {
    title_case(&function.replace("parse_", "").replace('_', " "))
}

/// Add an internal rule for `function` unless a rule with the same name
/// (ignoring case) is already present.
fn add_parser_rule(rules: &mut Vec<SyntaxRule>, function: &str) {
    let name = parser_rule_name(function);
    let lower = name.to_lowercase();

    if rules.iter().any(|r| r.name.to_lowercase() == lower) {
        return;
    }

    rules.push(SyntaxRule {
        category: INTERNALS_CATEGORY.to_string(),
        category_name: INTERNALS_NAME.to_string(),
        rule_type: "parser_rule".to_string(),
        syntax: format!("// Parsed by {function}()"),
        description: format!("Internal parser rule for {lower}."),
        examples: vec!["// Implementation specific".to_string()],
        heritage: "Internal compiler parsing logic.".to_string(),
        category_icon: None,
        category_description: None,
        name,
    });
}
