//! Graphviz rendering of table structure.
//!
//! Every table renders itself through [`Graph`], which produces a
//! deterministic `strict digraph`: node declarations in the order they were
//! added, then edge declarations in the order they were added.
//! Ids that are not plain identifiers or numerals, such as keys with spaces
//! or the empty key, are written quoted.
//!
//! ```text
//! strict digraph AVL {
//!   node [shape=oval];
//!
//!   B [label="B,2"];
//!   A [label="A,1"];
//!
//!   B -> A [];
//! }
//! ```

use std::borrow::Cow;
use std::fmt;

/// How an edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeStyle {
    /// A structural parent to child edge, rendered with no attributes.
    #[default]
    Solid,
    /// A navigational back-link, rendered dashed.
    Dashed,
}

impl EdgeStyle {
    const fn attributes(self) -> &'static str {
        match self {
            Self::Solid => "",
            Self::Dashed => "style=dashed",
        }
    }
}

#[derive(Debug, Clone)]
struct Edge {
    from: String,
    to: String,
    style: EdgeStyle,
}

/// Builder for a `strict digraph` document.
///
/// # Examples
///
/// ```rust
/// use symtab::graphviz::{EdgeStyle, Graph};
///
/// let mut graph = Graph::new("AVL");
/// graph.node("B", "B,2");
/// graph.node("A", "A,1");
/// graph.edge("B", "A", EdgeStyle::Solid);
///
/// assert_eq!(
///     graph.to_string(),
///     "strict digraph AVL {\n  node [shape=oval];\n\n  B [label=\"B,2\"];\n  A [label=\"A,1\"];\n\n  B -> A [];\n}"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    nodes: Vec<(String, String)>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Creates an empty graph called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Declares a node with the given id and label.
    pub fn node(&mut self, id: impl Into<String>, label: impl Into<String>) -> &mut Self {
        self.nodes.push((id.into(), label.into()));
        self
    }

    /// Declares an edge between two node ids.
    pub fn edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        style: EdgeStyle,
    ) -> &mut Self {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            style,
        });
        self
    }

    /// Returns `true` if no node has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "strict digraph {} {{", self.name)?;
        writeln!(formatter, "  node [shape=oval];")?;

        if !self.nodes.is_empty() {
            writeln!(formatter)?;
            for (id, label) in &self.nodes {
                writeln!(formatter, "  {} [label=\"{}\"];", quote(id), escape(label))?;
            }
        }

        if !self.edges.is_empty() {
            writeln!(formatter)?;
            for edge in &self.edges {
                writeln!(
                    formatter,
                    "  {} -> {} [{}];",
                    quote(&edge.from),
                    quote(&edge.to),
                    edge.style.attributes()
                )?;
            }
        }

        write!(formatter, "}}")
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes `id` bare when it is a dot identifier or numeral, quoted otherwise.
fn quote(id: &str) -> Cow<'_, str> {
    let word = id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let numeral = id.chars().all(|c| c.is_ascii_digit());
    let leading_digit = id.starts_with(|c: char| c.is_ascii_digit());
    if !id.is_empty() && word && (numeral || !leading_digit) {
        Cow::Borrowed(id)
    } else {
        Cow::Owned(format!("\"{}\"", escape(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_empty_graph_renders_header_only() {
        let graph = Graph::new("AVL");
        assert!(graph.is_empty());
        assert_eq!(
            graph.to_string(),
            "strict digraph AVL {\n  node [shape=oval];\n}"
        );
    }

    #[rstest]
    fn test_single_node_has_no_edge_section() {
        let mut graph = Graph::new("BTree");
        graph.node("n0", "A,1");
        assert_eq!(
            graph.to_string(),
            "strict digraph BTree {\n  node [shape=oval];\n\n  n0 [label=\"A,1\"];\n}"
        );
    }

    #[rstest]
    fn test_dashed_edges_carry_style() {
        let mut graph = Graph::new("Patricia");
        graph
            .node("A", "A,1")
            .node("B", "B,2")
            .edge("A", "B", EdgeStyle::Solid)
            .edge("B", "A", EdgeStyle::Dashed);
        let rendered = graph.to_string();
        assert!(rendered.contains("  A -> B [];\n"));
        assert!(rendered.contains("  B -> A [style=dashed];\n"));
    }

    #[rstest]
    #[case::identifier("node_1", "node_1")]
    #[case::numeral("42", "42")]
    #[case::empty("", r#""""#)]
    #[case::space("New York", r#""New York""#)]
    #[case::leading_digit("1a", r#""1a""#)]
    #[case::negative("-5", r#""-5""#)]
    #[case::embedded_quote(r#"say "hi""#, r#""say \"hi\"""#)]
    fn test_ids_are_quoted_unless_bare(#[case] id: &str, #[case] expected: &str) {
        assert_eq!(quote(id), expected);
    }

    #[rstest]
    fn test_quoted_ids_in_nodes_and_edges() {
        let mut graph = Graph::new("AVL");
        graph
            .node("New York", "New York,1")
            .node("", ",0")
            .edge("New York", "", EdgeStyle::Solid);
        let rendered = graph.to_string();
        assert!(rendered.contains("  \"New York\" [label=\"New York,1\"];\n"));
        assert!(rendered.contains("  \"\" [label=\",0\"];\n"));
        assert!(rendered.contains("  \"New York\" -> \"\" [];\n"));
    }

    #[rstest]
    fn test_labels_are_escaped() {
        let mut graph = Graph::new("AVL");
        graph.node("q", "say \"hi\",1");
        assert!(graph.to_string().contains(r#"q [label="say \"hi\",1"];"#));
    }
}
