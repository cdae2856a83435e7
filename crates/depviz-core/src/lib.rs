//! Core types, configuration, and error handling for depviz.
//!
//! This crate provides the shared foundation used by the other depviz crates:
//! - [`DiagramError`]: unified error type using `thiserror`
//! - [`DepvizConfig`]: configuration loaded from `.depviz.toml`
//! - [`ScanPolicy`]: compiled ignore globs and extension allowlist
//! - Shared types: [`FileRecord`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    DepvizConfig, Direction, ExportConfig, GraphConfig, RenderConfig, ScanConfig, ScanPolicy,
};
pub use error::{DiagramError, ExportAttempt, ExportFailure};
pub use types::{FileRecord, OutputFormat};

/// A convenience `Result` type for depviz operations.
pub type Result<T> = std::result::Result<T, DiagramError>;
