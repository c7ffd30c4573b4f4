use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Context;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::changelog::{self, ChangelogResult};
use crate::config::{Backend, Config, ConfigError};
use crate::coverage::{self, CoverageReport};
use crate::examples::{self, ExampleProgram};
use crate::stdlib::{self, StdlibDocs};
use crate::syntax::{self, SyntaxRule};
use crate::template::{TemplateError, TemplateRenderer};

const DEFAULT_OUTPUT_DIR: &str = "docs/website";
const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Project root not specified")]
    MissingProjectRoot,
    #[error("Theme directory not found: {}", .0.display())]
    MissingThemeDir(PathBuf),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Build information exposed to every template.
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub version: String,
}

/// The pages of the documentation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    Syntax,
    Examples,
    Coverage,
    Changelog,
    Backends,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Index,
        Page::Syntax,
        Page::Examples,
        Page::Coverage,
        Page::Changelog,
        Page::Backends,
    ];

    pub fn template_name(&self) -> &'static str {
        match self {
            Page::Index => "index.html",
            Page::Syntax => "syntax.html",
            Page::Examples => "examples.html",
            Page::Coverage => "coverage.html",
            Page::Changelog => "changelog.html",
            Page::Backends => "backends.html",
        }
    }

    /// Output file, relative to the output directory
    pub fn output_name(&self) -> &'static str {
        // Pages keep their template's file name
        self.template_name()
    }
}

pub struct DocsBuilder {
    project_root: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    theme_dir: PathBuf,
    config: Config,
}

impl Default for DocsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocsBuilder {
    pub fn new() -> Self {
        Self {
            project_root: None,
            output_dir: None,
            theme_dir: PathBuf::from("./theme"),
            config: Config::default(),
        }
    }

    // Required configuration
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    // Defaults to <project root>/docs/website
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Read the site config from a TOML file.
    pub fn config_file<P: AsRef<Path>>(self, path: P) -> Result<Self, BuildError> {
        let config = Config::read(path)?;
        Ok(self.config(config))
    }

    /// Load the theme and extract everything the pages need.
    pub fn build(self) -> Result<DocSite, BuildError> {
        let project_root = self.project_root.ok_or(BuildError::MissingProjectRoot)?;
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| project_root.join(DEFAULT_OUTPUT_DIR));

        if !self.theme_dir.is_dir() {
            return Err(BuildError::MissingThemeDir(self.theme_dir));
        }

        info!("Generating Cyl documentation from {}", project_root.display());
        let mut renderer = TemplateRenderer::new(&self.theme_dir)?;

        let changelog = changelog::load(project_root.join("CHANGELOG.md"));
        let examples = examples::scan(project_root.join("examples"));
        let syntax = syntax::extract(&project_root, &self.config.syntax);
        let stdlib = stdlib::load(project_root.join("STDLIB.md"));
        let coverage = coverage::scan(project_root.join("coverage"));
        let backends = self.config.backends_or_default();
        let meta = Meta {
            generated_at: chrono::Local::now().to_rfc3339(),
            version: project_version(&project_root),
        };

        renderer.add_global("meta", &meta);
        renderer.add_global("config", &self.config);

        Ok(DocSite {
            renderer,
            project_root,
            output_dir,
            theme_dir: self.theme_dir,
            config: self.config,
            changelog,
            examples,
            syntax,
            stdlib,
            coverage,
            backends,
            meta,
        })
    }
}

/// The `version` field of the project's package.json, if there is one.
fn project_version(project_root: &Path) -> String {
    let path = project_root.join("package.json");

    let version = std::fs::read_to_string(&path)
        .ok()
        .and_then(|data| serde_json::from_str::<serde_json::Value>(&data).ok())
        .and_then(|package| package.get("version")?.as_str().map(str::to_string));

    version.unwrap_or_else(|| {
        debug!("No version in {}, using {}", path.display(), DEFAULT_VERSION);
        DEFAULT_VERSION.to_string()
    })
}

pub struct DocSite {
    renderer: TemplateRenderer,
    project_root: PathBuf,
    output_dir: PathBuf,
    theme_dir: PathBuf,
    config: Config,
    changelog: ChangelogResult,
    examples: Vec<ExampleProgram>,
    syntax: Vec<SyntaxRule>,
    stdlib: Option<StdlibDocs>,
    coverage: CoverageReport,
    backends: Vec<Backend>,
    meta: Meta,
}

impl DocSite {
    pub fn changelog(&self) -> &ChangelogResult {
        &self.changelog
    }

    pub fn examples(&self) -> &[ExampleProgram] {
        &self.examples
    }

    pub fn syntax(&self) -> &[SyntaxRule] {
        &self.syntax
    }

    pub fn stdlib(&self) -> Option<&StdlibDocs> {
        self.stdlib.as_ref()
    }

    pub fn coverage(&self) -> &CoverageReport {
        &self.coverage
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn page_context(&self, page: Page) -> Context {
        let mut context = Context::new();

        match page {
            Page::Index => {
                context.insert("syntax", &self.syntax);
                context.insert("syntax_categories", &self.config.syntax.categories);
                context.insert("examples", &self.examples);
                context.insert("changelog", &self.changelog);
                context.insert("stdlib", &self.stdlib);
                context.insert("backends", &self.backends);
                context.insert("coverage", &self.coverage);
            }
            Page::Syntax => {
                context.insert("syntax", &self.syntax);
                context.insert("syntax_categories", &self.config.syntax.categories);
            }
            Page::Examples => context.insert("examples", &self.examples),
            Page::Coverage => context.insert("coverage", &self.coverage),
            Page::Changelog => context.insert("changelog", &self.changelog),
            Page::Backends => context.insert("backends", &self.backends),
        }

        context
    }

    fn render_page(&self, page: Page) -> Result<(), RenderError> {
        if !self.renderer.has_template(page.template_name()) {
            warn!("Theme has no {} template, skipping", page.template_name());
            return Ok(());
        }

        let context = self.page_context(page);
        let output_path = self.output_dir.join(page.output_name());
        self.renderer
            .render_to_file(page.template_name(), &context, &output_path)?;

        info!("Generated {}", page.output_name());
        Ok(())
    }

    /// Copy `<theme>/assets` into the output directory.
    fn copy_assets(&self) -> Result<(), RenderError> {
        let source = self.theme_dir.join("assets");
        if !source.is_dir() {
            debug!("No theme assets at {}", source.display());
            return Ok(());
        }

        copy_tree(&source, &self.output_dir.join("assets"))
    }

    /// Replace `<output>/coverage` with a copy of `<root>/coverage` so the
    /// coverage page can link to the full reports. Failures only warn.
    fn copy_coverage(&self) {
        let source = self.project_root.join("coverage");
        if !source.is_dir() {
            debug!("No coverage reports at {}", source.display());
            return;
        }

        let dest = self.output_dir.join("coverage");
        let result = if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(RenderError::from)
        } else {
            Ok(())
        };

        match result.and_then(|()| copy_tree(&source, &dest)) {
            Ok(()) => info!("Coverage files copied to {}", dest.display()),
            Err(e) => warn!("Could not copy coverage files: {}", e),
        }
    }

    fn copy_favicon(&self) -> Result<(), RenderError> {
        let favicon = self.project_root.join(&self.config.branding.favicon_path);
        let Some(file_name) = favicon.file_name() else {
            return Ok(());
        };

        if !favicon.is_file() {
            debug!("No favicon at {}", favicon.display());
            return Ok(());
        }

        let target = self.output_dir.join("assets").join(file_name);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&favicon, target)?;

        Ok(())
    }

    pub fn render_all(&self) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.output_dir)?;

        self.copy_assets()?;
        self.copy_favicon()?;
        self.copy_coverage();

        for page in Page::ALL {
            self.render_page(page)?;
        }

        info!("Documentation written to {}", self.output_dir.display());
        Ok(())
    }
}

/// Recursively copy the contents of `source` into `dest`.
fn copy_tree(source: &Path, dest: &Path) -> Result<(), RenderError> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| RenderError::InvalidPath(entry.path().to_path_buf()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            debug!("Copied {}", relative.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_project_root() {
        let result = DocsBuilder::new().theme_dir("/tmp").build();
        assert!(matches!(result, Err(BuildError::MissingProjectRoot)));
    }

    #[test]
    fn test_missing_theme_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocsBuilder::new()
            .project_root(dir.path())
            .theme_dir(dir.path().join("no-theme"))
            .build();
        assert!(matches!(result, Err(BuildError::MissingThemeDir(_))));
    }

    #[test]
    fn test_project_version() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(project_version(dir.path()), "1.0.0");

        std::fs::write(dir.path().join("package.json"), r#"{"name": "cyl", "version": "0.4.2"}"#)
            .unwrap();
        assert_eq!(project_version(dir.path()), "0.4.2");

        std::fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        assert_eq!(project_version(dir.path()), "1.0.0");
    }

    #[test]
    fn test_page_names() {
        let names: Vec<&str> = Page::ALL.iter().map(|p| p.output_name()).collect();
        assert_eq!(
            names,
            vec![
                "index.html",
                "syntax.html",
                "examples.html",
                "coverage.html",
                "changelog.html",
                "backends.html",
            ]
        );
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cyldoc.toml");
        std::fs::write(&path, "[site]\ntitle = \"Cyl Handbook\"\n").unwrap();

        let site = DocsBuilder::new()
            .project_root(dir.path())
            .theme_dir(dir.path())
            .config_file(&path)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(site.config.site.title, "Cyl Handbook");

        let missing = DocsBuilder::new().config_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(BuildError::Config(ConfigError::Io(_)))));
    }

    #[test]
    fn test_copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("coverage");
        std::fs::create_dir_all(source.join("lcov-report")).unwrap();
        std::fs::write(source.join("cobertura.xml"), "<coverage/>").unwrap();
        std::fs::write(source.join("lcov-report/index.html"), "report").unwrap();

        let dest = dir.path().join("out/coverage");
        copy_tree(&source, &dest).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("cobertura.xml")).unwrap(), "<coverage/>");
        assert_eq!(
            std::fs::read_to_string(dest.join("lcov-report/index.html")).unwrap(),
            "report"
        );
    }
}
