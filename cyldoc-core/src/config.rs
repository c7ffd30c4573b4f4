use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
}

/// Site configuration. Every section may be omitted.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub branding: BrandingConfig,
    pub footer: FooterConfig,
    pub navigation: NavigationConfig,
    pub content: ContentConfig,
    pub syntax: SyntaxConfig,
    pub backends: Vec<Backend>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }

    /// Configured backends, or the built-in list when none are configured.
    pub fn backends_or_default(&self) -> Vec<Backend> {
        if self.backends.is_empty() {
            default_backends()
        } else {
            self.backends.clone()
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Cyl".into(),
            description: "A programming language".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct BrandingConfig {
    /// Relative to the project root.
    pub favicon_path: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            favicon_path: "icon.png".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct FooterConfig {
    pub copyright: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            copyright: "2025 Cyl Programming Language".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct NavigationConfig {
    pub main_nav: Vec<NavLink>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        let nav = [
            ("Home", "index.html"),
            ("Syntax", "syntax.html"),
            ("Examples", "examples.html"),
            ("Coverage", "coverage.html"),
            ("Changelog", "changelog.html"),
            ("Backends", "backends.html"),
        ];

        Self {
            main_nav: nav
                .into_iter()
                .map(|(name, url)| NavLink {
                    name: name.into(),
                    url: url.into(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct NavLink {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ContentConfig {
    pub hero: HeroConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct HeroConfig {
    pub title: String,
    pub description: String,
    pub primary_button: Option<Link>,
    pub secondary_button: Option<Link>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title: "Cyl Programming Language".into(),
            description: "A modern, efficient programming language designed for performance and simplicity.".into(),
            primary_button: Some(Link {
                text: "Get Started".into(),
                url: "syntax.html".into(),
            }),
            secondary_button: Some(Link {
                text: "View Examples".into(),
                url: "examples.html".into(),
            }),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// Language syntax reference: categories, and the rules listed under each
/// category id.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SyntaxConfig {
    pub categories: Vec<SyntaxCategory>,
    pub rules: BTreeMap<String, Vec<SyntaxRuleConfig>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxCategory {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SyntaxRuleConfig {
    pub name: String,
    pub syntax: String,
    pub description: String,
    pub examples: Vec<String>,
    pub heritage: String,
}

impl Default for SyntaxRuleConfig {
    fn default() -> Self {
        Self {
            name: "Unknown Rule".into(),
            syntax: String::new(),
            description: String::new(),
            examples: Vec::new(),
            heritage: String::new(),
        }
    }
}

/// A compilation backend listed on the backends page.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Backend {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub usage: String,
}

fn default_backends() -> Vec<Backend> {
    let backend = |name: &str, description: &str, features: [&str; 3], usage: &str| Backend {
        name: name.into(),
        description: description.into(),
        features: features.iter().map(|f| f.to_string()).collect(),
        usage: usage.into(),
    };

    vec![
        backend(
            "Cranelift",
            "Pure Rust code generation backend (default)",
            ["Fast compilation", "No external dependencies", "Object file generation"],
            "--backend cranelift",
        ),
        backend(
            "LLVM",
            "High-performance optimized code generation",
            ["Advanced optimizations", "Cross-platform support", "Production-ready"],
            "--backend llvm",
        ),
        backend(
            "Interpreter",
            "Direct execution engine for development and testing",
            ["Immediate execution", "No compilation step", "Educational purposes"],
            "--backend interpreter",
        ),
    ]
}
