use serde::{Deserialize, Serialize};
use serde_json::Value;
use tablekit_ops::NodeKind;

/// One node of a graph document: an operator tag, a config dictionary,
/// and an optional display label. Legacy config aliases (`on` for
/// `left_on`/`right_on`, `detail_key` for `join_keys`, …) are resolved by
/// the operator itself at the point of use, not here — `config` stays a
/// plain JSON value all the way to dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_config")]
    pub config: Value,
}

fn default_config() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A directed edge; ordering among edges sharing a `target` is
/// semantically significant (join's first input is the left table,
/// reconcile's first is the detail table, vlookup's first is the main
/// table) and must be preserved exactly as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Inbound edges for `target`, in document order — the order that
    /// determines argument position for binary/variadic operators.
    pub fn inbound_edges<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == target)
    }

    pub fn outbound_edges<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_document() {
        let json = serde_json::json!({
            "nodes": [
                {"id": "a", "type": "source_csv", "config": {"file_id": "f1"}},
                {"id": "b", "type": "transform", "config": {}},
            ],
            "edges": [{"source": "a", "target": "b"}],
        });
        let doc: GraphDocument = serde_json::from_value(json).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.inbound_edges("b").count(), 1);
    }

    #[test]
    fn inbound_edge_order_is_preserved() {
        let json = serde_json::json!({
            "nodes": [
                {"id": "l", "type": "source_csv", "config": {}},
                {"id": "r", "type": "source_csv", "config": {}},
                {"id": "j", "type": "join", "config": {}},
            ],
            "edges": [
                {"source": "r", "target": "j"},
                {"source": "l", "target": "j"},
            ],
        });
        let doc: GraphDocument = serde_json::from_value(json).unwrap();
        let order: Vec<&str> = doc.inbound_edges("j").map(|e| e.source.as_str()).collect();
        assert_eq!(order, vec!["r", "l"]);
    }
}
