use std::fmt::Write;

use depviz_core::{DiagramError, Direction};
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::graph::{DependencyGraph, EdgeKind, NodeKind};
use crate::ids::{IdAllocator, IdCollision, NodeId};

const INDENT: &str = "    ";

/// Render the graph and backbone as a Mermaid flowchart.
///
/// Emits, in order: the header, the `Start`/`End` anchors, one subgraph per
/// file holding its symbol or summary nodes, the external nodes, one edge per
/// import, one dashed edge per consecutive backbone pair, and the anchor
/// edges to every entry and leaf file.
///
/// # Examples
///
/// ```
/// use depviz_core::Direction;
/// use depviz_graph::graph::DependencyGraph;
/// use depviz_graph::render::format_mermaid;
/// use depviz_graph::resolve::Resolver;
///
/// let graph = DependencyGraph::build(&[], &[], &Resolver::new(["ts"]), 8);
/// let text = format_mermaid(&graph, &[], Direction::TopDown);
/// assert!(text.starts_with("flowchart TD\n"));
/// assert!(text.contains("Start((\"Start\"))"));
/// ```
pub fn format_mermaid(
    graph: &DependencyGraph,
    backbone: &[NodeIndex],
    direction: Direction,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "flowchart {direction}");
    let _ = writeln!(out, "{INDENT}{}((\"Start\"))", IdAllocator::start());
    let _ = writeln!(out, "{INDENT}{}((\"End\"))", IdAllocator::end());

    for file in graph.files() {
        let node = graph.node(file.node);
        let _ = writeln!(out, "{INDENT}subgraph {}[\"{}\"]", node.id, escape(&node.label));
        for member in &file.members {
            let m = graph.node(*member);
            let _ = writeln!(out, "{INDENT}{INDENT}{}", shape(&m.id, &m.label, m.kind));
        }
        let _ = writeln!(out, "{INDENT}end");
    }

    for external in graph.externals() {
        let n = graph.node(*external);
        let _ = writeln!(out, "{INDENT}{}", shape(&n.id, &n.label, n.kind));
    }

    for (from, to, _) in graph.edges() {
        let _ = writeln!(out, "{INDENT}{} --> {}", graph.node(from).id, graph.node(to).id);
    }

    for pair in backbone.windows(2) {
        let _ = writeln!(
            out,
            "{INDENT}{} -.-> {}",
            graph.node(pair[0]).id,
            graph.node(pair[1]).id
        );
    }

    for entry in graph.entries() {
        let _ = writeln!(out, "{INDENT}{} --> {}", IdAllocator::start(), graph.node(entry).id);
    }
    for leaf in graph.leaves() {
        let _ = writeln!(out, "{INDENT}{} --> {}", graph.node(leaf).id, IdAllocator::end());
    }

    out
}

/// Wrap the Mermaid text in a fenced code block.
///
/// # Examples
///
/// ```
/// use depviz_core::Direction;
/// use depviz_graph::graph::DependencyGraph;
/// use depviz_graph::render::format_markdown;
/// use depviz_graph::resolve::Resolver;
///
/// let graph = DependencyGraph::build(&[], &[], &Resolver::new(["ts"]), 8);
/// let md = format_markdown(&graph, &[], Direction::LeftRight);
/// assert!(md.starts_with("```mermaid\nflowchart LR\n"));
/// assert!(md.ends_with("```\n"));
/// ```
pub fn format_markdown(
    graph: &DependencyGraph,
    backbone: &[NodeIndex],
    direction: Direction,
) -> String {
    format!(
        "```mermaid\n{}```\n",
        format_mermaid(graph, backbone, direction)
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagramOutput<'a> {
    files: Vec<FileOutput<'a>>,
    externals: Vec<NodeOutput<'a>>,
    edges: Vec<EdgeOutput<'a>>,
    backbone: Vec<&'a NodeId>,
    entries: Vec<&'a NodeId>,
    leaves: Vec<&'a NodeId>,
    collisions: &'a [IdCollision],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileOutput<'a> {
    id: &'a NodeId,
    name: &'a str,
    line_count: usize,
    symbols: Vec<NodeOutput<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeOutput<'a> {
    id: &'a NodeId,
    label: &'a str,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EdgeOutput<'a> {
    from: &'a NodeId,
    to: &'a NodeId,
    kind: &'static str,
}

/// Serialize the graph structure as pretty JSON.
///
/// # Errors
///
/// Returns [`DiagramError::Serialization`] if serialization fails.
///
/// # Examples
///
/// ```
/// use depviz_graph::graph::DependencyGraph;
/// use depviz_graph::render::format_json;
/// use depviz_graph::resolve::Resolver;
///
/// let graph = DependencyGraph::build(&[], &[], &Resolver::new(["ts"]), 8);
/// let json = format_json(&graph, &[]).unwrap();
/// assert!(json.contains("\"files\": []"));
/// ```
pub fn format_json(
    graph: &DependencyGraph,
    backbone: &[NodeIndex],
) -> Result<String, DiagramError> {
    let node_output = move |index: &NodeIndex| {
        let n = graph.node(*index);
        NodeOutput {
            id: &n.id,
            label: &n.label,
            kind: kind_label(n.kind),
        }
    };
    let id_of = move |index: NodeIndex| &graph.node(index).id;

    let output = DiagramOutput {
        files: graph
            .files()
            .iter()
            .map(|f| FileOutput {
                id: id_of(f.node),
                name: &f.name,
                line_count: f.line_count,
                symbols: f.members.iter().map(node_output).collect(),
            })
            .collect(),
        externals: graph.externals().iter().map(node_output).collect(),
        edges: graph
            .edges()
            .map(|(from, to, kind)| EdgeOutput {
                from: id_of(from),
                to: id_of(to),
                kind: match kind {
                    EdgeKind::Import => "import",
                    EdgeKind::External => "external",
                },
            })
            .collect(),
        backbone: backbone.iter().map(|n| id_of(*n)).collect(),
        entries: graph.entries().into_iter().map(id_of).collect(),
        leaves: graph.leaves().into_iter().map(id_of).collect(),
        collisions: graph.collisions(),
    };

    serde_json::to_string_pretty(&output).map_err(DiagramError::from)
}

fn shape(id: &NodeId, label: &str, kind: NodeKind) -> String {
    let label = escape(label);
    match kind {
        NodeKind::External => format!("{id}{{{{\"{label}\"}}}}"),
        NodeKind::Class => format!("{id}[[\"{label}\"]]"),
        NodeKind::Summary => format!("{id}([\"{label}\"])"),
        NodeKind::Function | NodeKind::File => format!("{id}[\"{label}\"]"),
    }
}

fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::File => "file",
        NodeKind::External => "external",
        NodeKind::Function => "function",
        NodeKind::Class => "class",
        NodeKind::Summary => "summary",
    }
}

/// Make `label` safe inside a double-quoted Mermaid label.
fn escape(label: &str) -> String {
    label.replace('"', "#quot;")
}
