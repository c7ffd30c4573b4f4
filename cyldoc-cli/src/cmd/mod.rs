pub mod build;
pub mod changelog;
