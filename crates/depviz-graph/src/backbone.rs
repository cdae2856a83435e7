use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;

use crate::graph::DependencyGraph;

/// A total order over every file node, for drawing a sequential chain.
///
/// Where the file-to-file graph is acyclic the order respects it (importer
/// before imported). Nodes left over by cycles are appended in collection
/// order, so every file node appears exactly once.
///
/// # Examples
///
/// ```
/// use depviz_graph::backbone::Backbone;
/// use depviz_graph::graph::DependencyGraph;
/// use depviz_graph::resolve::Resolver;
///
/// let graph = DependencyGraph::build(&[], &[], &Resolver::new(["ts"]), 8);
/// let backbone = Backbone::compute(&graph);
/// assert!(backbone.order().is_empty());
/// assert!(!backbone.has_cycle());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backbone {
    order: Vec<NodeIndex>,
    sorted: usize,
}

impl Backbone {
    /// Run Kahn's algorithm over the file nodes of `graph`.
    ///
    /// The queue is seeded with zero in-degree files in collection order and
    /// successors are relaxed in edge insertion order. Edges to external
    /// nodes are skipped.
    pub fn compute(graph: &DependencyGraph) -> Self {
        let files: Vec<NodeIndex> = graph.files().iter().map(|f| f.node).collect();

        let mut in_degree: HashMap<NodeIndex, usize> =
            files.iter().map(|n| (*n, graph.incoming(*n))).collect();

        let mut queue: VecDeque<NodeIndex> = files
            .iter()
            .copied()
            .filter(|n| in_degree[n] == 0)
            .collect();

        let mut order = Vec::with_capacity(files.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for next in graph.successors(node) {
                let Some(degree) = in_degree.get_mut(&next) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    queue.push_back(next);
                }
            }
        }

        let sorted = order.len();
        if sorted < files.len() {
            let placed: HashSet<NodeIndex> = order.iter().copied().collect();
            order.extend(files.iter().copied().filter(|n| !placed.contains(n)));
        }

        Self { order, sorted }
    }

    /// The complete order.
    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }

    /// The first `max` entries of the order.
    pub fn truncated(&self, max: usize) -> &[NodeIndex] {
        &self.order[..self.order.len().min(max)]
    }

    /// True if some files could only be placed by the fallback append.
    pub fn has_cycle(&self) -> bool {
        self.sorted < self.order.len()
    }

    /// Number of files placed by Kahn's algorithm proper.
    pub fn sorted_len(&self) -> usize {
        self.sorted
    }
}
