use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use depviz_core::FileRecord;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, warn};

use crate::collector::normalize;
use crate::extract::Extraction;
use crate::ids::{IdAllocator, IdCollision, NodeId};
use crate::resolve::Resolver;

/// What a [`GraphNode`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A scanned source file.
    File,
    /// An import target outside the scanned tree.
    External,
    /// A function nested under a file.
    Function,
    /// A class nested under a file.
    Class,
    /// Placeholder for a file with no extracted symbols.
    Summary,
}

/// A vertex of the dependency graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Renderer-safe identifier.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
    /// Node category.
    pub kind: NodeKind,
}

/// A directed import edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Resolved relative import between two scanned files.
    Import,
    /// Unresolved bare import to an external node.
    External,
}

/// A file node together with its nested symbol nodes.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// The file's own node.
    pub node: NodeIndex,
    /// Relative name of the file.
    pub name: String,
    /// Line count of the file.
    pub line_count: usize,
    /// Function, class or summary nodes, in display order.
    pub members: Vec<NodeIndex>,
}

/// Directed graph of files, external packages and per-file symbols.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use depviz_core::FileRecord;
/// use depviz_graph::extract::{Extractor, PatternExtractor};
/// use depviz_graph::graph::DependencyGraph;
/// use depviz_graph::resolve::Resolver;
///
/// let files = vec![FileRecord::new(
///     PathBuf::from("/virtual/app.ts"),
///     "app.ts".into(),
///     "import React from 'react';\nfunction App() {}\n".into(),
/// )];
/// let extractions: Vec<_> = files
///     .iter()
///     .map(|f| PatternExtractor::default().extract(&f.content))
///     .collect();
/// let graph = DependencyGraph::build(&files, &extractions, &Resolver::new(["ts"]), 8);
/// assert_eq!(graph.file_count(), 1);
/// assert_eq!(graph.externals().len(), 1);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, EdgeKind>,
    files: Vec<FileEntry>,
    externals: Vec<NodeIndex>,
    incoming: HashMap<NodeIndex, usize>,
    outgoing: HashMap<NodeIndex, usize>,
    collisions: Vec<IdCollision>,
}

impl DependencyGraph {
    /// Build the graph from collected files and their extractions.
    ///
    /// `extractions[i]` belongs to `files[i]`. At most `max_symbols`
    /// distinct functions and `max_symbols` distinct classes are kept per
    /// file; a file with neither gets one summary node instead.
    ///
    /// For every import: a resolved target inside the file set yields a
    /// file-to-file edge and bumps the degree counters; an unresolved
    /// import that does not start with `.` yields an edge to a shared
    /// external node; anything else is dropped.
    pub fn build(
        files: &[FileRecord],
        extractions: &[Extraction],
        resolver: &Resolver,
        max_symbols: usize,
    ) -> Self {
        debug_assert_eq!(files.len(), extractions.len());

        let mut graph = DiGraph::new();
        let mut ids = IdAllocator::new();
        let mut by_path: HashMap<PathBuf, NodeIndex> = HashMap::new();
        let mut entries = Vec::with_capacity(files.len());

        // File ids first so they win any collision with symbol ids.
        for record in files {
            let node = graph.add_node(GraphNode {
                id: ids.allocate(&record.name),
                label: record.name.clone(),
                kind: NodeKind::File,
            });
            by_path.insert(normalize(&record.path), node);
            entries.push(FileEntry {
                node,
                name: record.name.clone(),
                line_count: record.line_count,
                members: Vec::new(),
            });
        }

        for ((record, extraction), entry) in files.iter().zip(extractions).zip(&mut entries) {
            for name in distinct(&extraction.functions, max_symbols) {
                entry.members.push(graph.add_node(GraphNode {
                    id: ids.allocate(&format!("{}#fn:{name}", record.name)),
                    label: format!("{name}()"),
                    kind: NodeKind::Function,
                }));
            }
            for name in distinct(&extraction.classes, max_symbols) {
                entry.members.push(graph.add_node(GraphNode {
                    id: ids.allocate(&format!("{}#class:{name}", record.name)),
                    label: format!("class {name}"),
                    kind: NodeKind::Class,
                }));
            }
            if entry.members.is_empty() {
                entry.members.push(graph.add_node(GraphNode {
                    id: ids.allocate(&format!("{}#summary", record.name)),
                    label: format!("{} ({} lines)", record.basename(), record.line_count),
                    kind: NodeKind::Summary,
                }));
            }
        }

        let mut externals = Vec::new();
        let mut external_by_name: HashMap<String, NodeIndex> = HashMap::new();
        let mut incoming: HashMap<NodeIndex, usize> = HashMap::new();
        let mut outgoing: HashMap<NodeIndex, usize> = HashMap::new();

        for ((record, extraction), entry) in files.iter().zip(extractions).zip(&entries) {
            for import in &extraction.imports {
                let target = resolver
                    .resolve(&record.path, import)
                    .and_then(|p| by_path.get(&normalize(&p)).copied());

                match target {
                    Some(to) => {
                        graph.add_edge(entry.node, to, EdgeKind::Import);
                        *outgoing.entry(entry.node).or_default() += 1;
                        *incoming.entry(to).or_default() += 1;
                    }
                    None if !import.starts_with('.') => {
                        let to = *external_by_name.entry(import.clone()).or_insert_with(|| {
                            let node = graph.add_node(GraphNode {
                                id: ids.allocate(&format!("ext:{import}")),
                                label: import.clone(),
                                kind: NodeKind::External,
                            });
                            externals.push(node);
                            node
                        });
                        graph.add_edge(entry.node, to, EdgeKind::External);
                    }
                    None => {
                        debug!(file = %record.name, import = %import, "dropping unresolved relative import");
                    }
                }
            }
        }

        for c in ids.collisions() {
            warn!(
                existing = %c.existing,
                incoming = %c.incoming,
                assigned = %c.assigned,
                "node id collision"
            );
        }

        Self {
            graph,
            files: entries,
            externals,
            incoming,
            outgoing,
            collisions: ids.collisions().to_vec(),
        }
    }

    /// The node at `index`.
    pub fn node(&self, index: NodeIndex) -> &GraphNode {
        &self.graph[index]
    }

    /// File entries in collection order.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// External nodes in first-seen order.
    pub fn externals(&self) -> &[NodeIndex] {
        &self.externals
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of import edges, file-to-file and file-to-external.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every import edge in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, EdgeKind)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), *e.weight()))
    }

    /// Targets of `node`'s outgoing edges, in insertion order, with
    /// duplicates for repeated imports.
    pub fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Count of file-to-file edges into `node`.
    pub fn incoming(&self, node: NodeIndex) -> usize {
        self.incoming.get(&node).copied().unwrap_or(0)
    }

    /// Count of file-to-file edges out of `node`.
    pub fn outgoing(&self, node: NodeIndex) -> usize {
        self.outgoing.get(&node).copied().unwrap_or(0)
    }

    /// File nodes nothing imports, in collection order.
    pub fn entries(&self) -> Vec<NodeIndex> {
        self.files
            .iter()
            .map(|f| f.node)
            .filter(|n| self.incoming(*n) == 0)
            .collect()
    }

    /// File nodes that import no other file, in collection order.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.files
            .iter()
            .map(|f| f.node)
            .filter(|n| self.outgoing(*n) == 0)
            .collect()
    }

    /// True if `node` is a file node.
    pub fn is_file(&self, node: NodeIndex) -> bool {
        self.graph[node].kind == NodeKind::File
    }

    /// Identifier collisions detected while allocating node ids.
    pub fn collisions(&self) -> &[IdCollision] {
        &self.collisions
    }
}

/// First `limit` distinct names, preserving order.
fn distinct(names: &[String], limit: usize) -> Vec<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|n| seen.insert(*n))
        .take(limit)
        .collect()
}
