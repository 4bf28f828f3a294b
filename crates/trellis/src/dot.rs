//! DOT serialization of the dependency graph.
//!
//! Produces graphviz text only — laying out or rasterizing the image is the
//! renderer's job, not this crate's. Node and edge tags (`kind`,
//! `link_type`, colors) are carried as DOT attributes so a downstream
//! renderer can style them without re-deriving anything.

use std::fmt::Write;

use crate::graph::{DependencyGraph, NodeKind};

/// Graph-level default attributes.
const GRAPH_ATTRS: &[&str] = &["rankdir=LR"];
/// Node-level default attributes.
const NODE_ATTRS: &[&str] = &["style=filled"];
/// Edge-level default attributes.
const EDGE_ATTRS: &[&str] = &["arrowsize=1.5"];

/// Quote and escape a DOT identifier.
fn quoted(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

impl DependencyGraph {
    /// Serialize the graph as DOT text.
    ///
    /// When the graph is not acyclic the background turns red, matching the
    /// attached warning node.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dependencies {\n");

        let mut graph_attrs: Vec<&str> = GRAPH_ATTRS.to_vec();
        if !self.is_acyclic() {
            graph_attrs.push("bgcolor=red");
        }
        let _ = writeln!(out, "    graph [{}];", graph_attrs.join(" "));
        let _ = writeln!(out, "    node [{}];", NODE_ATTRS.join(" "));
        let _ = writeln!(out, "    edge [{}];", EDGE_ATTRS.join(" "));

        let graph = self.graph();
        for idx in graph.node_indices() {
            let node = &graph[idx];
            let mut attrs: Vec<String> = Vec::new();
            match node.kind {
                NodeKind::File => attrs.push("shape=note".to_string()),
                NodeKind::Dataset => {}
                NodeKind::Warning => {
                    attrs.push("shape=plain".to_string());
                    attrs.push("fontsize=24".to_string());
                }
            }
            if let Some(color) = &node.color {
                attrs.push(format!("color={color}"));
            }

            if attrs.is_empty() {
                let _ = writeln!(out, "    {};", quoted(&node.name));
            } else {
                let _ = writeln!(out, "    {} [{}];", quoted(&node.name), attrs.join(" "));
            }
        }

        for edge in graph.edge_indices() {
            if let Some((from, to)) = graph.edge_endpoints(edge) {
                let _ = writeln!(
                    out,
                    "    {} -> {} [link_type={}];",
                    quoted(&graph[from].name),
                    quoted(&graph[to].name),
                    graph[edge].as_str()
                );
            }
        }

        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::analyzer::FileAnalyzer;
    use crate::graph::{CYCLE_WARNING_LABEL, GraphBuilder};
    use crate::kinds;

    fn analyzed(relative: &str, text: &str) -> FileAnalyzer {
        let mut analyzer = FileAnalyzer::new(kinds::python().compile().unwrap());
        analyzer
            .set_path(Some(relative), None, "/proj", Some("code"), None)
            .unwrap();
        analyzer.analyze_text(text, None);
        analyzer
    }

    #[test]
    fn dot_carries_default_attributes() {
        let scanned = vec![
            analyzed("make.py", "# OUTPUT: x.csv\n"),
            analyzed("use.py", "# INPUT_DATASET: x.csv\n# OUTPUT: y.csv\n"),
        ];
        let dot = GraphBuilder::new().trim_dangling(false).build(&scanned).to_dot();

        assert!(dot.starts_with("digraph dependencies {"));
        assert!(dot.contains("graph [rankdir=LR];"));
        assert!(dot.contains("node [style=filled];"));
        assert!(dot.contains("edge [arrowsize=1.5];"));
        assert!(dot.contains("\"make.py\" [shape=note color=seagreen3];"));
        assert!(dot.contains("\"make.py\" -> \"x.csv\" [link_type=dataset];"));
        assert!(!dot.contains("bgcolor=red"));
    }

    #[test]
    fn cyclic_graph_gets_red_background_and_warning() {
        let scanned = vec![
            analyzed("a.py", "# INPUT_DATASET: b_out.csv\n# OUTPUT: a_out.csv\n"),
            analyzed("b.py", "# INPUT_DATASET: a_out.csv\n# OUTPUT: b_out.csv\n"),
        ];
        let dot = GraphBuilder::new().build(&scanned).to_dot();

        assert!(dot.contains("bgcolor=red"));
        assert!(dot.contains(CYCLE_WARNING_LABEL));
        assert!(dot.contains("shape=plain"));
    }

    #[test]
    fn names_with_quotes_are_escaped() {
        assert_eq!(super::quoted(r#"a"b"#), r#""a\"b""#);
        assert_eq!(super::quoted(r"a\b"), r#""a\\b""#);
    }
}
