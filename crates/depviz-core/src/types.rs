use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A collected source file.
///
/// Created once per eligible file during collection and never mutated.
///
/// # Examples
///
/// ```
/// use depviz_core::FileRecord;
/// use std::path::PathBuf;
///
/// let record = FileRecord::new(
///     PathBuf::from("/repo/src/main.ts"),
///     "src/main.ts".into(),
///     "const a = 1;\nconst b = 2;\n".into(),
/// );
/// assert_eq!(record.line_count, 2);
/// assert_eq!(record.basename(), "main.ts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Absolute filesystem path.
    pub path: PathBuf,
    /// Path relative to the scan root, with `/` separators.
    pub name: String,
    /// Full file content.
    pub content: String,
    /// Number of lines in `content`.
    pub line_count: usize,
}

impl FileRecord {
    /// Build a record, counting lines from `content`.
    pub fn new(path: PathBuf, name: String, content: String) -> Self {
        let line_count = content.lines().count();
        Self {
            path,
            name,
            content,
            line_count,
        }
    }

    /// Last component of the relative name.
    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Output format for rendered diagrams.
///
/// # Examples
///
/// ```
/// use depviz_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw Mermaid flowchart text.
    #[default]
    Mermaid,
    /// Mermaid wrapped in a fenced code block.
    Markdown,
    /// Machine-readable graph summary with camelCase keys.
    Json,
}

impl OutputFormat {
    /// Conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mermaid => "mmd",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Mermaid => write!(f, "mermaid"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
