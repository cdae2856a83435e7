use std::fmt;
use std::path::{Path, PathBuf};

use depviz_core::ExportConfig;
use tracing::debug;

/// Package run through `npx` when no local renderer is installed.
pub const NPX_PACKAGE: &str = "@mermaid-js/mermaid-cli";

/// One way of invoking the renderer.
///
/// The command line is `<program> <prefix_args…> -i <input> -o <output> -c <config>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStrategy {
    /// Short name used in logs and failure reports.
    pub name: String,
    /// Program to spawn.
    pub program: PathBuf,
    /// Arguments placed before the renderer's own flags.
    pub prefix_args: Vec<String>,
}

impl ExportStrategy {
    /// A strategy that runs `program` directly.
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Add arguments placed before `-i`.
    pub fn with_prefix<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The full argument list for one invocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use depviz_export::ExportStrategy;
    ///
    /// let s = ExportStrategy::new("npx", "npx").with_prefix(["-y", "pkg"]);
    /// let args = s.args(Path::new("in.mmd"), Path::new("out.svg"), Path::new("c.json"));
    /// assert_eq!(args, vec!["-y", "pkg", "-i", "in.mmd", "-o", "out.svg", "-c", "c.json"]);
    /// ```
    pub fn args(&self, input: &Path, output: &Path, config: &Path) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        for (flag, path) in [("-i", input), ("-o", output), ("-c", config)] {
            args.push(flag.to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        args
    }
}

impl fmt::Display for ExportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.name, self.program.display())?;
        for arg in &self.prefix_args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

/// The default strategy list for a project at `root`.
///
/// 1. `local`: `<root>/node_modules/.bin/<command>` if it exists, else
///    `<command>` located on `PATH`. When neither is found the bare command
///    name is kept so the attempt is reported as not found.
/// 2. `npx`: `npx -y @mermaid-js/mermaid-cli`.
pub fn default_strategies(root: &Path, config: &ExportConfig) -> Vec<ExportStrategy> {
    vec![
        ExportStrategy::new("local", local_program(root, &config.command)),
        ExportStrategy::new("npx", "npx").with_prefix(["-y", NPX_PACKAGE]),
    ]
}

fn local_program(root: &Path, command: &str) -> PathBuf {
    let bundled = root.join("node_modules").join(".bin").join(command);
    if bundled.is_file() {
        debug!(path = %bundled.display(), "using project-local renderer");
        return bundled;
    }
    match which::which(command) {
        Ok(path) => {
            debug!(path = %path.display(), "using renderer from PATH");
            path
        }
        Err(_) => PathBuf::from(command),
    }
}
