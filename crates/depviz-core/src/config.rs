use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

/// Top-level configuration loaded from `.depviz.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use depviz_core::DepvizConfig;
///
/// let config = DepvizConfig::default();
/// assert_eq!(config.graph.max_symbols, 8);
/// assert_eq!(config.render.max_backbone, 200);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepvizConfig {
    /// Which files are collected.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Graph construction limits.
    #[serde(default)]
    pub graph: GraphConfig,
    /// Diagram rendering settings.
    #[serde(default)]
    pub render: RenderConfig,
    /// External renderer settings.
    #[serde(default)]
    pub export: ExportConfig,
}

impl DepvizConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Io`] if the file cannot be read, or
    /// [`DiagramError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use depviz_core::DepvizConfig;
    /// use std::path::Path;
    ///
    /// let config = DepvizConfig::from_file(Path::new(".depviz.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, DiagramError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Toml`] if parsing fails, or
    /// [`DiagramError::Config`] if a limit is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use depviz_core::DepvizConfig;
    ///
    /// let toml = r#"
    /// [render]
    /// max_backbone = 50
    /// "#;
    /// let config = DepvizConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.render.max_backbone, 50);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, DiagramError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DiagramError> {
        if self.render.max_backbone == 0 {
            return Err(DiagramError::Config(
                "render.max_backbone must be at least 1".into(),
            ));
        }
        if self.export.max_text_size == 0 {
            return Err(DiagramError::Config(
                "export.max_text_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// File collection settings.
///
/// # Examples
///
/// ```
/// use depviz_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert!(config.ignore.iter().any(|p| p == "node_modules"));
/// assert!(config.extensions.iter().any(|e| e == "ts"));
/// assert!(config.include_extensionless);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns matched against every component of a relative path.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// Eligible file extensions, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Whether files without any extension are collected.
    #[serde(default = "default_true")]
    pub include_extensionless: bool,
    /// Extensions tried when resolving a relative import.
    #[serde(default = "default_resolve_extensions")]
    pub resolve_extensions: Vec<String>,
}

fn default_ignore() -> Vec<String> {
    [
        // version-control metadata: .git, .gitignore, .github, .hgignore, ...
        ".git*",
        ".svn",
        ".hg*",
        "node_modules",
        "bower_components",
        "vendor",
        "dist",
        "build",
        "out",
        "target",
        ".next",
        ".nuxt",
        "coverage",
        "__pycache__",
        ".venv",
        "venv",
        ".cache",
        ".idea",
        ".vscode",
        ".DS_Store",
        "Thumbs.db",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "Cargo.lock",
        "*.lock",
        ".env",
        ".env.*",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extensions() -> Vec<String> {
    [
        "js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte", "py", "rb", "go", "rs", "java",
        "kt", "swift", "c", "h", "cpp", "hpp", "cs", "php", "sh", "json", "md", "css", "scss",
        "html", "yml", "yaml", "toml", "txt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_resolve_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx", "mjs", "cjs", "json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            extensions: default_extensions(),
            include_extensionless: true,
            resolve_extensions: default_resolve_extensions(),
        }
    }
}

/// Compiled scan-exclusion policy threaded through file collection.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use depviz_core::{ScanConfig, ScanPolicy};
///
/// let policy = ScanPolicy::from_config(&ScanConfig::default()).unwrap();
/// assert!(policy.is_ignored(Path::new("node_modules/react/index.js")));
/// assert!(!policy.is_ignored(Path::new("src/layout.ts")));
/// assert!(policy.is_eligible(Path::new("src/app.ts")));
/// assert!(!policy.is_eligible(Path::new("logo.png")));
/// ```
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    ignore: Vec<glob::Pattern>,
    extensions: HashSet<String>,
    include_extensionless: bool,
}

impl ScanPolicy {
    /// Compile a policy from explicit patterns and extensions.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Pattern`] for an invalid glob.
    pub fn new<I, E>(ignore: I, extensions: E, include_extensionless: bool) -> Result<Self, DiagramError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let ignore = ignore
            .into_iter()
            .map(|p| {
                glob::Pattern::new(p.as_ref()).map_err(|e| DiagramError::Pattern {
                    pattern: p.as_ref().to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();

        Ok(Self {
            ignore,
            extensions,
            include_extensionless,
        })
    }

    /// Compile the policy described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Pattern`] for an invalid glob.
    pub fn from_config(config: &ScanConfig) -> Result<Self, DiagramError> {
        Self::new(
            &config.ignore,
            &config.extensions,
            config.include_extensionless,
        )
    }

    /// True if any component of `relative` matches an ignore pattern.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        relative.components().any(|component| match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                self.ignore.iter().any(|p| p.matches(&part))
            }
            _ => false,
        })
    }

    /// True if the file's extension is allowlisted, or it has none and
    /// extensionless files are enabled.
    pub fn is_eligible(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => self
                .extensions
                .contains(&ext.to_string_lossy().to_ascii_lowercase()),
            None => self.include_extensionless,
        }
    }
}

/// Graph construction limits.
///
/// # Examples
///
/// ```
/// use depviz_core::GraphConfig;
///
/// assert_eq!(GraphConfig::default().max_symbols, 8);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum function nodes, and separately class nodes, per file (default: 8).
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,
}

fn default_max_symbols() -> usize {
    8
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_symbols: default_max_symbols(),
        }
    }
}

/// Diagram rendering settings.
///
/// # Examples
///
/// ```
/// use depviz_core::{Direction, RenderConfig};
///
/// let config = RenderConfig::default();
/// assert_eq!(config.direction, Direction::TopDown);
/// assert_eq!(config.max_backbone, 200);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Flowchart direction (default: `TD`).
    #[serde(default)]
    pub direction: Direction,
    /// Maximum file nodes chained by the dashed backbone (default: 200).
    #[serde(default = "default_max_backbone")]
    pub max_backbone: usize,
}

fn default_max_backbone() -> usize {
    200
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            max_backbone: default_max_backbone(),
        }
    }
}

/// Flowchart layout direction.
///
/// # Examples
///
/// ```
/// use depviz_core::Direction;
///
/// let d: Direction = "lr".parse().unwrap();
/// assert_eq!(d, Direction::LeftRight);
/// assert_eq!(d.to_string(), "LR");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TD", alias = "td", alias = "TB", alias = "tb")]
    TopDown,
    #[serde(rename = "LR", alias = "lr")]
    LeftRight,
    #[serde(rename = "BT", alias = "bt")]
    BottomUp,
    #[serde(rename = "RL", alias = "rl")]
    RightLeft,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TopDown => write!(f, "TD"),
            Direction::LeftRight => write!(f, "LR"),
            Direction::BottomUp => write!(f, "BT"),
            Direction::RightLeft => write!(f, "RL"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Ok(Direction::TopDown),
            "LR" => Ok(Direction::LeftRight),
            "BT" => Ok(Direction::BottomUp),
            "RL" => Ok(Direction::RightLeft),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// External renderer settings.
///
/// # Examples
///
/// ```
/// use depviz_core::ExportConfig;
///
/// let config = ExportConfig::default();
/// assert_eq!(config.max_text_size, 90_000);
/// assert_eq!(config.command, "mmdc");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Largest diagram text the renderer accepts (default: 90000).
    #[serde(default = "default_max_text_size")]
    pub max_text_size: usize,
    /// Locally installed renderer binary name (default: `mmdc`).
    #[serde(default = "default_command")]
    pub command: String,
}

fn default_max_text_size() -> usize {
    90_000
}

fn default_command() -> String {
    "mmdc".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_text_size: default_max_text_size(),
            command: default_command(),
        }
    }
}
