//! Dependency-graph assembly on petgraph.
//!
//! [`GraphBuilder`] turns scan results into a [`DependencyGraph`]: one node
//! per scanned file, one node per referenced file or dataset, and directed
//! edges from producers to consumers. A cycle is a *data* condition, not a
//! build failure — when the graph is not acyclic a distinguished warning
//! node is attached for downstream rendering, and construction completes
//! normally.
//!
//! | Operation | Algorithm |
//! |-----------|-----------|
//! | Acyclicity check | `petgraph::algo::is_cyclic_directed` |
//! | Cycle membership | Tarjan's SCC algorithm |

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::analyzer::FileAnalyzer;

/// Fill color for scanned file nodes.
pub const FILE_NODE_COLOR: &str = "seagreen3";
/// Fill color for orphan nodes (referenced but never produced).
pub const ORPHAN_NODE_COLOR: &str = "gold";
/// Label of the warning node attached when the graph is not acyclic.
pub const CYCLE_WARNING_LABEL: &str = "CYCLES DETECTED, DAG IS NOT ACYCLIC!";

/// Node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A script file, scanned or referenced.
    File,
    /// A named dataset.
    Dataset,
    /// The cycle-warning flag node.
    Warning,
}

/// Edge classification: what kind of reference created the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// An `INPUT_FILE` reference.
    File,
    /// An `INPUT_DATASET`/`OUTPUT` reference.
    Dataset,
}

impl LinkKind {
    /// Stable lowercase name, used in DOT attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dataset => "dataset",
        }
    }
}

/// A graph node: a file, a dataset, or the cycle-warning flag.
#[derive(Debug, Clone)]
pub struct Node {
    /// Normalized path or dataset name (the node key).
    pub name: String,
    /// Node classification.
    pub kind: NodeKind,
    /// Fill color for rendering, when one applies.
    pub color: Option<String>,
    /// Whether the node was only inferred from being referenced.
    pub orphan: bool,
}

/// A directed dependency graph over files and datasets.
pub struct DependencyGraph {
    graph: DiGraph<Node, LinkKind>,
    indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// The underlying petgraph graph.
    #[must_use]
    pub fn graph(&self) -> &DiGraph<Node, LinkKind> {
        &self.graph
    }

    /// Look up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.indices.get(name).map(|&idx| &self.graph[idx])
    }

    /// Whether a node with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether an edge `from -> to` exists, returning its link kind.
    #[must_use]
    pub fn edge(&self, from: &str, to: &str) -> Option<LinkKind> {
        let from = *self.indices.get(from)?;
        let to = *self.indices.get(to)?;
        self.graph
            .find_edge(from, to)
            .map(|edge| self.graph[edge])
    }

    /// Whether the graph is acyclic.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Whether the cycle-warning node is attached.
    #[must_use]
    pub fn has_cycle_warning(&self) -> bool {
        self.indices.contains_key(CYCLE_WARNING_LABEL)
    }

    /// Node names of every cycle, one group per strongly connected
    /// component of more than one node (or a self-referencing node).
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || (component.len() == 1
                        && self.graph.find_edge(component[0], component[0]).is_some())
            })
            .map(|component| {
                component
                    .iter()
                    .map(|&idx| self.graph[idx].name.clone())
                    .collect()
            })
            .collect()
    }

    /// Names of every node, in insertion order.
    #[must_use]
    pub fn node_names(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].name.as_str())
            .collect()
    }
}

/// Assembles a [`DependencyGraph`] from scan results.
///
/// Orphan coloring and dangling trimming are independently toggleable; both
/// apply to dataset nodes only. A file appearing as a root or leaf is
/// expected (entry points and final outputs) and is left alone.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    color_orphans: bool,
    trim_dangling: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// A builder with both post-processing passes enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            color_orphans: true,
            trim_dangling: true,
        }
    }

    /// Toggle coloring of dataset nodes that nothing produces.
    #[must_use]
    pub fn color_orphans(mut self, enabled: bool) -> Self {
        self.color_orphans = enabled;
        self
    }

    /// Toggle removal of dataset nodes that nothing consumes.
    #[must_use]
    pub fn trim_dangling(mut self, enabled: bool) -> Self {
        self.trim_dangling = enabled;
        self
    }

    /// Build the graph from scanned files.
    #[must_use]
    pub fn build(&self, scanned: &[FileAnalyzer]) -> DependencyGraph {
        let mut graph: DiGraph<Node, LinkKind> = DiGraph::new();
        let mut indices: HashMap<String, NodeIndex> = HashMap::new();

        // Scanned files first, so inputs referencing them resolve to
        // non-orphan nodes regardless of declaration order.
        for code in scanned {
            let Some(relative) = code.relative_path() else {
                continue;
            };
            ensure_node(
                &mut graph,
                &mut indices,
                relative,
                NodeKind::File,
                Some(FILE_NODE_COLOR),
                false,
            );
        }

        for code in scanned {
            let Some(relative) = code.relative_path() else {
                continue;
            };
            let Some(&child) = indices.get(relative) else {
                continue;
            };

            for input_file in code.input_files() {
                // Referenced but never scanned: an orphan file node.
                let parent = ensure_node(
                    &mut graph,
                    &mut indices,
                    input_file,
                    NodeKind::File,
                    Some(ORPHAN_NODE_COLOR),
                    true,
                );
                graph.update_edge(parent, child, LinkKind::File);
            }

            for input_dataset in code.input_datasets() {
                // A file that both produces and consumes the same dataset
                // is not an inter-file edge.
                if code.output_datasets().contains(input_dataset) {
                    continue;
                }
                let parent = ensure_node(
                    &mut graph,
                    &mut indices,
                    input_dataset,
                    NodeKind::Dataset,
                    None,
                    false,
                );
                graph.update_edge(parent, child, LinkKind::Dataset);
            }

            for output_dataset in code.output_datasets() {
                let node = ensure_node(
                    &mut graph,
                    &mut indices,
                    output_dataset,
                    NodeKind::Dataset,
                    None,
                    false,
                );
                graph.update_edge(child, node, LinkKind::Dataset);
            }
        }

        if is_cyclic_directed(&graph) {
            ensure_node(
                &mut graph,
                &mut indices,
                CYCLE_WARNING_LABEL,
                NodeKind::Warning,
                Some("white"),
                false,
            );
        }

        if self.color_orphans {
            for idx in graph.node_indices() {
                if graph[idx].kind != NodeKind::Dataset {
                    continue;
                }
                // No incoming edge means no ancestors: asserted as input
                // but never produced by anything observed.
                if graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
                {
                    let node = &mut graph[idx];
                    node.color = Some(ORPHAN_NODE_COLOR.to_string());
                    node.orphan = true;
                }
            }
        }

        if self.trim_dangling {
            let mut trim: Vec<NodeIndex> = graph
                .node_indices()
                .filter(|&idx| {
                    graph[idx].kind == NodeKind::Dataset
                        && graph
                            .neighbors_directed(idx, Direction::Outgoing)
                            .next()
                            .is_none()
                })
                .collect();
            // remove_node swaps the last node into the hole; removing from
            // the highest index down keeps the pending indices valid.
            trim.sort_unstable();
            for idx in trim.into_iter().rev() {
                graph.remove_node(idx);
            }
            // Rebuild the name map after index invalidation.
            indices = graph
                .node_indices()
                .map(|idx| (graph[idx].name.clone(), idx))
                .collect();
        }

        DependencyGraph { graph, indices }
    }
}

/// Look up or insert a node, returning its index.
///
/// An existing node keeps its kind and attributes: a name referenced both
/// as a file and as a dataset stays whatever it was first.
fn ensure_node(
    graph: &mut DiGraph<Node, LinkKind>,
    indices: &mut HashMap<String, NodeIndex>,
    name: &str,
    kind: NodeKind,
    color: Option<&str>,
    orphan: bool,
) -> NodeIndex {
    if let Some(&idx) = indices.get(name) {
        return idx;
    }
    let idx = graph.add_node(Node {
        name: name.to_string(),
        kind,
        color: color.map(String::from),
        orphan,
    });
    indices.insert(name.to_string(), idx);
    idx
}
