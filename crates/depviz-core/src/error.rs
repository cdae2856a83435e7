use std::fmt;
use std::path::PathBuf;

/// Errors that can occur across the depviz workspace.
///
/// Library crates return this type directly; the binary renders it as a
/// `miette` diagnostic at the boundary.
///
/// # Examples
///
/// ```
/// use depviz_core::DiagramError;
///
/// let err = DiagramError::Config("max_backbone must be positive".into());
/// assert!(err.to_string().contains("max_backbone"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DiagramError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(depviz::io))]
    Io(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    #[diagnostic(code(depviz::config))]
    Config(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(depviz::config::toml))]
    Toml(#[from] toml::de::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(depviz::serialization))]
    Serialization(#[from] serde_json::Error),

    /// An ignore glob or extraction pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    #[diagnostic(code(depviz::pattern))]
    Pattern { pattern: String, message: String },

    /// The scan root does not exist or is not a directory.
    #[error("scan root not found: {}", .0.display())]
    #[diagnostic(
        code(depviz::root_not_found),
        help("pass --path pointing at an existing directory")
    )]
    RootNotFound(PathBuf),

    /// Every external renderer strategy failed.
    #[error(transparent)]
    #[diagnostic(
        code(depviz::export),
        help("install @mermaid-js/mermaid-cli (npm i -g @mermaid-js/mermaid-cli) or make npx available")
    )]
    Export(#[from] ExportFailure),
}

/// One failed attempt to run an external renderer.
///
/// # Examples
///
/// ```
/// use depviz_core::ExportAttempt;
///
/// let attempt = ExportAttempt {
///     strategy: "local mmdc".into(),
///     reason: "not found on PATH".into(),
/// };
/// assert_eq!(attempt.to_string(), "local mmdc: not found on PATH");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportAttempt {
    /// Human-readable strategy name.
    pub strategy: String,
    /// Why the strategy failed.
    pub reason: String,
}

impl fmt::Display for ExportAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Aggregated failure of every export strategy, in the order they were tried.
///
/// # Examples
///
/// ```
/// use depviz_core::{ExportAttempt, ExportFailure};
///
/// let failure = ExportFailure {
///     attempts: vec![
///         ExportAttempt { strategy: "a".into(), reason: "missing".into() },
///         ExportAttempt { strategy: "b".into(), reason: "exit status 1".into() },
///     ],
/// };
/// let msg = failure.to_string();
/// assert!(msg.contains("a: missing"));
/// assert!(msg.contains("b: exit status 1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFailure {
    /// Every attempt, first to last.
    pub attempts: Vec<ExportAttempt>,
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return write!(f, "diagram export failed: no renderer strategies configured");
        }
        write!(
            f,
            "diagram export failed after {} attempt(s)",
            self.attempts.len()
        )?;
        for attempt in &self.attempts {
            write!(f, "\n  - {attempt}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExportFailure {}
