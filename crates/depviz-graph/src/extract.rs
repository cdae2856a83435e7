//! Surface-syntax symbol extraction.
//!
//! Extraction is deliberately approximate: three independent regex scans
//! over the raw text, with no lexing, scoping or type information. It
//! misses nested declarations, methods, re-exports and dynamic imports, and
//! it reports matches inside strings and comments. Callers must treat the
//! result as a hint, not as ground truth.

use depviz_core::DiagramError;
use regex::Regex;

/// Matches `import … from "x"`, `import "x"` and `require("x")`.
pub const IMPORT_PATTERN: &str = r#"\bimport\s+(?:[\w*{}\s,$]+?\s+from\s+)?["']([^"'\n]+)["']|\brequire\s*\(\s*["']([^"'\n]+)["']\s*\)"#;

/// Matches `function name(` and `const name = (…) =>`.
pub const FUNCTION_PATTERN: &str = r"\bfunction(?:\s*\*\s*|\s+)([A-Za-z_$][\w$]*)\s*\(|\bconst\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>";

/// Matches `class Name`.
pub const CLASS_PATTERN: &str = r"\bclass\s+([A-Za-z_$][\w$]*)";

/// Signals extracted from one file, in order of appearance.
///
/// # Examples
///
/// ```
/// use depviz_graph::extract::Extraction;
///
/// let empty = Extraction::default();
/// assert!(empty.imports.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Raw module strings; duplicates kept.
    pub imports: Vec<String>,
    /// Function names.
    pub functions: Vec<String>,
    /// Class names.
    pub classes: Vec<String>,
}

/// A pluggable extraction stage.
///
/// Implementations must be pure: the same content always yields the same
/// [`Extraction`].
pub trait Extractor {
    /// Extract imports, functions and classes from `content`.
    fn extract(&self, content: &str) -> Extraction;
}

/// Regex-based [`Extractor`].
///
/// # Examples
///
/// ```
/// use depviz_graph::extract::{Extractor, PatternExtractor};
///
/// let extractor = PatternExtractor::default();
/// let result = extractor.extract(r#"
/// import { api } from "./api";
/// const _ = require("lodash");
/// function main() {}
/// class App {}
/// "#);
/// assert_eq!(result.imports, vec!["./api", "lodash"]);
/// assert_eq!(result.functions, vec!["main"]);
/// assert_eq!(result.classes, vec!["App"]);
/// ```
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    imports: Regex,
    functions: Regex,
    classes: Regex,
}

impl PatternExtractor {
    /// Build an extractor from custom patterns.
    ///
    /// In each pattern the first capture group that participates in a match
    /// supplies the extracted value.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Pattern`] if a pattern does not compile.
    pub fn new(imports: &str, functions: &str, classes: &str) -> Result<Self, DiagramError> {
        Ok(Self {
            imports: compile(imports)?,
            functions: compile(functions)?,
            classes: compile(classes)?,
        })
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(IMPORT_PATTERN, FUNCTION_PATTERN, CLASS_PATTERN)
            .expect("built-in extraction patterns compile")
    }
}

impl Extractor for PatternExtractor {
    fn extract(&self, content: &str) -> Extraction {
        Extraction {
            imports: scan(&self.imports, content),
            functions: scan(&self.functions, content),
            classes: scan(&self.classes, content),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, DiagramError> {
    Regex::new(pattern).map_err(|e| DiagramError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn scan(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .next()
                .map(|m| m.as_str().to_string())
        })
        .collect()
}
