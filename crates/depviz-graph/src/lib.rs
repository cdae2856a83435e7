//! File-level dependency diagrams via pattern extraction and a topological
//! backbone.
//!
//! Walks a directory tree, pulls import strings and top-level function and
//! class names out of each file with regexes, resolves relative imports
//! against the filesystem, builds a petgraph dependency graph, orders the
//! files with Kahn's algorithm, and renders everything as a Mermaid
//! flowchart.

pub mod backbone;
pub mod collector;
pub mod extract;
pub mod graph;
pub mod ids;
pub mod render;
pub mod resolve;

use std::path::Path;

use depviz_core::{DepvizConfig, DiagramError, OutputFormat, RenderConfig, ScanPolicy};
use tracing::{debug, info};

use backbone::Backbone;
use extract::{Extractor, PatternExtractor};
use graph::DependencyGraph;
use resolve::Resolver;

/// A scanned tree: its dependency graph and backbone order.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub backbone: Backbone,
}

impl Analysis {
    /// Render in `format`, with the backbone truncated to
    /// `render.max_backbone` entries.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::Serialization`] if JSON output fails.
    pub fn render(&self, format: OutputFormat, render: &RenderConfig) -> Result<String, DiagramError> {
        let chain = self.backbone.truncated(render.max_backbone);
        match format {
            OutputFormat::Mermaid => Ok(render::format_mermaid(&self.graph, chain, render.direction)),
            OutputFormat::Markdown => Ok(render::format_markdown(&self.graph, chain, render.direction)),
            OutputFormat::Json => render::format_json(&self.graph, chain),
        }
    }
}

/// Run the pipeline up to the backbone order.
///
/// Returns `Ok(None)` when no eligible file exists under `root`.
///
/// # Errors
///
/// Returns [`DiagramError::RootNotFound`] if `root` is not a readable
/// directory, or [`DiagramError::Pattern`] if an ignore glob is invalid.
pub fn analyze(
    root: &Path,
    config: &DepvizConfig,
    extractor: &dyn Extractor,
) -> Result<Option<Analysis>, DiagramError> {
    let policy = ScanPolicy::from_config(&config.scan)?;
    let files = collector::collect(root, &policy)?;
    if files.is_empty() {
        info!(root = %root.display(), "no eligible files");
        return Ok(None);
    }

    let extractions: Vec<_> = files.iter().map(|f| extractor.extract(&f.content)).collect();
    let resolver = Resolver::new(&config.scan.resolve_extensions);
    let graph = DependencyGraph::build(&files, &extractions, &resolver, config.graph.max_symbols);
    let backbone = Backbone::compute(&graph);

    debug!(
        files = graph.file_count(),
        externals = graph.externals().len(),
        edges = graph.edge_count(),
        cyclic = backbone.has_cycle(),
        "graph built"
    );

    Ok(Some(Analysis { graph, backbone }))
}

/// Generate a diagram of the tree at `root`.
///
/// Uses the default [`PatternExtractor`]. Returns `Ok(None)` when there is
/// nothing to draw.
///
/// # Errors
///
/// Returns [`DiagramError`] if the root is missing, the configuration
/// is invalid, or serialization fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use depviz_core::{DepvizConfig, OutputFormat};
/// use depviz_graph::generate_diagram;
///
/// let config = DepvizConfig::default();
/// if let Some(text) = generate_diagram(Path::new("."), &config, OutputFormat::Mermaid).unwrap() {
///     println!("{text}");
/// }
/// ```
pub fn generate_diagram(
    root: &Path,
    config: &DepvizConfig,
    format: OutputFormat,
) -> Result<Option<String>, DiagramError> {
    let extractor = PatternExtractor::default();
    match analyze(root, config, &extractor)? {
        Some(analysis) => analysis.render(format, &config.render).map(Some),
        None => Ok(None),
    }
}
