//! Documentation site generator for the Cyl programming language.
//!
//! The text-processing core ([`markdown`], [`changelog`]) is pure. The other
//! page data comes from [`examples`], [`syntax`], [`stdlib`] and [`coverage`],
//! and [`builder`] renders it all through [`template`].

pub mod builder;
pub mod changelog;
pub mod config;
pub mod coverage;
pub mod examples;
pub mod markdown;
pub mod stdlib;
pub mod syntax;
pub mod template;

// Re-export main types
pub use builder::{BuildError, DocSite, DocsBuilder, Meta, Page, RenderError};
pub use changelog::{ChangeEntry, ChangelogResult, TocEntry, VersionRecord};
pub use coverage::CoverageReport;
pub use examples::ExampleProgram;
pub use markdown::{Block, apply_inline, render};
pub use stdlib::StdlibDocs;
pub use syntax::SyntaxRule;
pub use template::{TemplateError, TemplateRenderer};
