use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tera templates plus a global context shared by every render.
pub struct TemplateRenderer {
    tera: Tera,
    globals: Context,
}

impl TemplateRenderer {
    /// Load every `*.html` template below `theme_dir`.
    pub fn new<P: AsRef<Path>>(theme_dir: P) -> Result<Self, TemplateError> {
        let pattern = theme_dir.as_ref().join("**").join("*.html");
        let tera = Tera::new(&pattern.to_string_lossy())?;

        Ok(Self::from_tera(tera))
    }

    pub fn from_tera(tera: Tera) -> Self {
        Self {
            tera,
            globals: Context::new(),
        }
    }

    /// Add a value visible to every template
    pub fn add_global<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.globals.insert(key, value);
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }

    /// Render a template with the globals overlaid by `context`
    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        let mut merged = self.globals.clone();
        merged.extend(context.clone());

        Ok(self.tera.render(template, &merged)?)
    }

    /// Render a template and write it to `output_path`
    pub fn render_to_file(
        &self,
        template: &str,
        context: &Context,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.render(template, context)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}
