use crate::document::GraphDocument;
use std::collections::{HashMap, HashSet};
use tablekit_common::{TableError, TableResult};

/// Checks, before any node runs: every edge endpoint names a real node,
/// the edge set is acyclic, and each node's inbound-edge count matches
/// its operator's declared arity.
pub fn validate(doc: &GraphDocument) -> TableResult<()> {
    let ids: HashSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &doc.edges {
        if !ids.contains(edge.source.as_str()) {
            return Err(TableError::graph_shape(format!(
                "edge references unknown source node '{}'",
                edge.source
            )));
        }
        if !ids.contains(edge.target.as_str()) {
            return Err(TableError::graph_shape(format!(
                "edge references unknown target node '{}'",
                edge.target
            )));
        }
    }

    check_acyclic(doc)?;

    for node in &doc.nodes {
        let inbound = doc.inbound_edges(&node.id).count();
        let arity = node.kind.arity();
        if !arity.accepts(inbound) {
            return Err(TableError::graph_shape(format!(
                "node '{}' ({}) requires {} input(s), has {}",
                node.id,
                node.kind.as_str(),
                arity,
                inbound
            )));
        }
    }

    Ok(())
}

fn check_acyclic(doc: &GraphDocument) -> TableResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }
    let mut marks: HashMap<&str, Mark> = HashMap::new();

    fn visit<'a>(
        doc: &'a GraphDocument,
        id: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> TableResult<()> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(TableError::graph_shape(format!(
                    "graph contains a cycle through node '{id}'"
                )));
            }
            None => {}
        }
        marks.insert(id, Mark::Visiting);
        for edge in doc.outbound_edges(id) {
            visit(doc, edge.target.as_str(), marks)?;
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }

    for node in &doc.nodes {
        visit(doc, node.id.as_str(), &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Edge, Node};
    use serde_json::json;
    use tablekit_ops::NodeKind;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node {
            id: id.to_string(),
            kind,
            label: None,
            config: json!({}),
        }
    }

    #[test]
    fn detects_cycles() {
        let doc = GraphDocument {
            nodes: vec![node("a", NodeKind::Transform), node("b", NodeKind::Transform)],
            edges: vec![
                Edge { source: "a".into(), target: "b".into() },
                Edge { source: "b".into(), target: "a".into() },
            ],
        };
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.kind, tablekit_common::TableErrorKind::GraphShape);
    }

    #[test]
    fn rejects_arity_mismatch() {
        let doc = GraphDocument {
            nodes: vec![node("a", NodeKind::SourceCsv), node("j", NodeKind::Join)],
            edges: vec![Edge { source: "a".into(), target: "j".into() }],
        };
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.kind, tablekit_common::TableErrorKind::GraphShape);
        assert!(err.message.contains('j'));
    }

    #[test]
    fn accepts_a_well_formed_dag() {
        let doc = GraphDocument {
            nodes: vec![node("a", NodeKind::SourceCsv), node("b", NodeKind::Transform)],
            edges: vec![Edge { source: "a".into(), target: "b".into() }],
        };
        validate(&doc).unwrap();
    }
}
