use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Identifiers the diagram language treats specially, plus the two anchors.
const RESERVED: &[&str] = &[
    "Start",
    "End",
    "end",
    "graph",
    "flowchart",
    "subgraph",
    "direction",
    "style",
    "class",
    "classDef",
    "click",
    "linkStyle",
    "default",
];

/// A renderer-safe node identifier: ASCII alphanumerics and `_`, never
/// starting with `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two distinct labels sanitized to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCollision {
    /// The identifier both labels sanitize to.
    pub sanitized: String,
    /// Label that owns `sanitized`.
    pub existing: String,
    /// Label that was moved to `assigned`.
    pub incoming: String,
    /// Identifier given to `incoming` instead.
    pub assigned: NodeId,
}

/// Replace every non-alphanumeric character with `_` and strip leading
/// underscores. Empty results become `node`.
///
/// # Examples
///
/// ```
/// use depviz_graph::ids::sanitize;
///
/// assert_eq!(sanitize("src/app.ts"), "src_app_ts");
/// assert_eq!(sanitize("@scope/pkg"), "scope_pkg");
/// assert_eq!(sanitize("__init__.py"), "init___py");
/// assert_eq!(sanitize("///"), "node");
/// ```
pub fn sanitize(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = replaced.trim_start_matches('_');
    if trimmed.is_empty() {
        "node".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Allocation table from labels to unique [`NodeId`]s.
///
/// The same label always maps to the same id. A different label whose
/// sanitized form is already taken gets a numeric suffix, and the clash is
/// recorded as an [`IdCollision`] instead of merging the two nodes.
///
/// # Examples
///
/// ```
/// use depviz_graph::ids::IdAllocator;
///
/// let mut ids = IdAllocator::new();
/// let a = ids.allocate("src/a.ts");
/// let b = ids.allocate("src_a.ts");
/// assert_eq!(a.as_str(), "src_a_ts");
/// assert_eq!(b.as_str(), "src_a_ts_2");
/// assert_eq!(ids.collisions().len(), 1);
/// assert_eq!(ids.allocate("src/a.ts"), a);
/// ```
#[derive(Debug, Clone)]
pub struct IdAllocator {
    by_label: HashMap<String, NodeId>,
    owners: HashMap<String, String>,
    collisions: Vec<IdCollision>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Create a table with the anchor ids and diagram keywords reserved.
    pub fn new() -> Self {
        let owners = RESERVED
            .iter()
            .map(|id| (id.to_string(), format!("<reserved {id}>")))
            .collect();
        Self {
            by_label: HashMap::new(),
            owners,
            collisions: Vec::new(),
        }
    }

    /// The id of `label`, allocating one on first use.
    pub fn allocate(&mut self, label: &str) -> NodeId {
        if let Some(id) = self.by_label.get(label) {
            return id.clone();
        }

        let base = sanitize(label);
        let id = match self.owners.get(&base) {
            None => NodeId(base),
            Some(existing) => {
                let existing = existing.clone();
                let mut n = 2;
                let assigned = loop {
                    let candidate = format!("{base}_{n}");
                    if !self.owners.contains_key(&candidate) {
                        break NodeId(candidate);
                    }
                    n += 1;
                };
                self.collisions.push(IdCollision {
                    sanitized: base,
                    existing,
                    incoming: label.to_string(),
                    assigned: assigned.clone(),
                });
                assigned
            }
        };

        self.owners.insert(id.0.clone(), label.to_string());
        self.by_label.insert(label.to_string(), id.clone());
        id
    }

    /// The reserved anchor id for entry points.
    pub fn start() -> NodeId {
        NodeId("Start".into())
    }

    /// The reserved anchor id for leaves.
    pub fn end() -> NodeId {
        NodeId("End".into())
    }

    /// Every collision seen so far, in allocation order.
    pub fn collisions(&self) -> &[IdCollision] {
        &self.collisions
    }
}
