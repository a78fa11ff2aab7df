use crate::document::GraphDocument;
use std::collections::{HashMap, VecDeque};
use tablekit_common::{TableError, TableResult};

/// A topologically ordered execution plan: one entry per node, each
/// carrying its upstream node ids in the order edges appear in the
/// document (join's left/right, reconcile's detail/summary, vlookup's
/// main/lookup all depend on this order).
pub struct Plan {
    pub order: Vec<String>,
    pub upstream: HashMap<String, Vec<String>>,
}

/// Kahn's algorithm over the document's edges. Ties (multiple nodes with
/// no remaining unresolved dependencies) are broken by document order, so
/// the same document always schedules identically.
pub fn schedule(doc: &GraphDocument) -> TableResult<Plan> {
    let node_order: Vec<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut indegree: HashMap<&str, usize> = node_order.iter().map(|&id| (id, 0)).collect();
    let mut upstream: HashMap<String, Vec<String>> = node_order
        .iter()
        .map(|&id| (id.to_string(), Vec::new()))
        .collect();

    for node_id in &node_order {
        for edge in doc.inbound_edges(node_id) {
            *indegree.get_mut(node_id).unwrap() += 1;
            upstream.get_mut(*node_id).unwrap().push(edge.source.clone());
        }
    }

    let mut ready: VecDeque<&str> = node_order
        .iter()
        .copied()
        .filter(|id| indegree[id] == 0)
        .collect();

    let mut order = Vec::with_capacity(node_order.len());
    while let Some(id) = ready.pop_front() {
        order.push(id.to_string());
        for edge in doc.outbound_edges(id) {
            let target = edge.target.as_str();
            let remaining = indegree.get_mut(target).unwrap();
            *remaining -= 1;
            if *remaining == 0 {
                // Insert preserving document order among simultaneously-ready nodes.
                let pos = node_order
                    .iter()
                    .position(|&n| n == target)
                    .unwrap();
                let insert_at = ready
                    .iter()
                    .position(|&r| node_order.iter().position(|&n| n == r).unwrap() > pos)
                    .unwrap_or(ready.len());
                ready.insert(insert_at, target);
            }
        }
    }

    if order.len() != node_order.len() {
        return Err(TableError::graph_shape(
            "graph contains a cycle: no valid topological order exists",
        ));
    }

    Ok(Plan { order, upstream })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Edge, Node};
    use serde_json::json;
    use tablekit_ops::NodeKind;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node { id: id.to_string(), kind, label: None, config: json!({}) }
    }

    #[test]
    fn schedules_a_diamond_deterministically() {
        let doc = GraphDocument {
            nodes: vec![
                node("a", NodeKind::SourceCsv),
                node("b", NodeKind::Transform),
                node("c", NodeKind::Transform),
                node("d", NodeKind::Concat),
            ],
            edges: vec![
                Edge { source: "a".into(), target: "b".into() },
                Edge { source: "a".into(), target: "c".into() },
                Edge { source: "b".into(), target: "d".into() },
                Edge { source: "c".into(), target: "d".into() },
            ],
        };
        let plan = schedule(&doc).unwrap();
        assert_eq!(plan.order[0], "a");
        assert_eq!(plan.order[3], "d");
        assert!(plan.order[1..3].contains(&"b".to_string()));
        assert!(plan.order[1..3].contains(&"c".to_string()));
    }

    #[test]
    fn preserves_inbound_edge_order_for_upstream_ids() {
        let doc = GraphDocument {
            nodes: vec![
                node("l", NodeKind::SourceCsv),
                node("r", NodeKind::SourceCsv),
                node("j", NodeKind::Join),
            ],
            edges: vec![
                Edge { source: "l".into(), target: "j".into() },
                Edge { source: "r".into(), target: "j".into() },
            ],
        };
        let plan = schedule(&doc).unwrap();
        assert_eq!(plan.upstream["j"], vec!["l".to_string(), "r".to_string()]);
    }
}
