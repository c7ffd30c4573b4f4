use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "./cyldoc.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CyldocConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Site configuration (from cyldoc-core)
    #[serde(flatten)]
    pub site: cyldoc_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Project root containing CHANGELOG.md, examples/ and package.json
    pub root: String,
    /// Output directory for generated site
    pub output: String,
    /// Theme directory
    pub theme: String,
    /// Configuration file path
    pub config: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            output: "./docs/website".to_string(),
            theme: "./theme".to_string(),
            config: DEFAULT_CONFIG_FILE.to_string(),
        }
    }
}

impl CyldocConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (CYLDOC_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = arg(args, "config").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        // 3. Add environment variables with CYLDOC_ prefix
        builder = builder.add_source(
            Environment::with_prefix("CYLDOC")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        for key in ["root", "output", "theme", "config"] {
            if let Some(value) = arg(args, key) {
                builder = builder.set_override(format!("build.{key}"), value)?;
            }
        }

        let config = builder.build()?;
        let cyldoc_config: CyldocConfig = config.try_deserialize()?;

        Ok(cyldoc_config)
    }

    /// Get just the site configuration for passing to cyldoc-core
    pub fn site_config(&self) -> &cyldoc_core::config::Config {
        &self.site
    }

    /// Get the build configuration
    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

// Only look at args that are defined for this command
fn arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

/// Load configuration specifically for build commands
pub fn load_build_config(args: &ArgMatches) -> Result<CyldocConfig> {
    CyldocConfig::load(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    #[test]
    fn test_default_config() {
        let config = CyldocConfig::default();
        assert_eq!(config.build.root, ".");
        assert_eq!(config.build.output, "./docs/website");
        assert_eq!(config.build.theme, "./theme");
        assert_eq!(config.site.site.title, "Cyl");
    }

    #[test]
    #[serial_test::serial]
    fn test_cli_args_override() {
        let app = Command::new("test")
            .arg(Arg::new("root").long("root").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"));

        let matches = app
            .try_get_matches_from(vec![
                "test",
                "--root",
                "/custom/project",
                "--output",
                "/custom/output",
            ])
            .unwrap();

        let config = CyldocConfig::load(&matches).unwrap();
        assert_eq!(config.build.root, "/custom/project");
        assert_eq!(config.build.output, "/custom/output");
        // Should still have defaults for non-overridden values
        assert_eq!(config.build.theme, "./theme");
    }

    #[test]
    #[serial_test::serial]
    fn test_config_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.toml");
        std::fs::write(
            &path,
            r#"
            [build]
            theme = "/themes/dark"

            [site]
            title = "Cyl Reference"

            [footer]
            copyright = "2026 Cyl"
            "#,
        )
        .unwrap();

        let app = Command::new("test")
            .arg(Arg::new("theme").long("theme"))
            .arg(Arg::new("config").long("config"));
        let matches = app
            .try_get_matches_from(vec!["test", "--config", path.to_str().unwrap()])
            .unwrap();

        let config = CyldocConfig::load(&matches).unwrap();
        assert_eq!(config.build.theme, "/themes/dark");
        assert_eq!(config.site.site.title, "Cyl Reference");
        assert_eq!(config.site.footer.copyright, "2026 Cyl");
        // Untouched sections keep their defaults
        assert_eq!(config.site.branding.favicon_path, "icon.png");
        assert_eq!(config.site.navigation.main_nav.len(), 6);
    }

    #[test]
    #[serial_test::serial]
    fn test_env_layer_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.toml");
        std::fs::write(
            &path,
            r#"
            [build]
            theme = "/file/theme"
            output = "/file/output"

            [site]
            title = "FromFile"
            "#,
        )
        .unwrap();

        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::set_var("CYLDOC_SITE__TITLE", "FromEnv");
            std::env::set_var("CYLDOC_BUILD__THEME", "/env/theme");
        }

        let app = || {
            Command::new("test")
                .arg(Arg::new("theme").long("theme"))
                .arg(Arg::new("config").long("config"))
        };
        let config_path = path.to_str().unwrap();

        let from_env = app()
            .try_get_matches_from(vec!["test", "--config", config_path])
            .map_err(anyhow::Error::from)
            .and_then(|m| CyldocConfig::load(&m));
        let from_cli = app()
            .try_get_matches_from(vec!["test", "--config", config_path, "--theme", "/cli"])
            .map_err(anyhow::Error::from)
            .and_then(|m| CyldocConfig::load(&m));

        unsafe {
            std::env::remove_var("CYLDOC_SITE__TITLE");
            std::env::remove_var("CYLDOC_BUILD__THEME");
        }

        // Env beats the file, untouched file values still apply
        let from_env = from_env.unwrap();
        assert_eq!(from_env.site.site.title, "FromEnv");
        assert_eq!(from_env.build.theme, "/env/theme");
        assert_eq!(from_env.build.output, "/file/output");

        // CLI beats env
        let from_cli = from_cli.unwrap();
        assert_eq!(from_cli.build.theme, "/cli");
        assert_eq!(from_cli.site.site.title, "FromEnv");
    }
}
