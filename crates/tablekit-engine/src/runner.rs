use crate::document::GraphDocument;
use crate::report::{NodeResult, NodeStatus, RunReport, TablePreview, PREVIEW_ROW_LIMIT};
use crate::scheduler::schedule;
use crate::validator::validate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tablekit_common::Table;
use tablekit_ops::{execute_with_output_filename, NodeKind, OpContext};

/// Runs a validated, scheduled graph document one node at a time,
/// capturing a result (or error) per node. A node error (GraphShape,
/// MissingInput, ConfigError, SchemaError, ComputeError) stops the run;
/// no node after it in topo order executes.
///
/// `cancel` is polled between nodes — a hosting server can set it from
/// another thread to abort a long run without preemption.
pub fn run(doc: &GraphDocument, ctx: &OpContext, cancel: &Arc<AtomicBool>) -> RunReport {
    let mut report = RunReport::empty();

    if let Err(e) = validate(doc) {
        report.success = false;
        report.logs.push(format!("validation failed: {e}"));
        return report;
    }

    let plan = match schedule(doc) {
        Ok(plan) => plan,
        Err(e) => {
            report.success = false;
            report.logs.push(format!("scheduling failed: {e}"));
            return report;
        }
    };

    for node in &doc.nodes {
        report
            .node_status
            .insert(node.id.clone(), NodeStatus::Pending);
    }

    let mut tables: HashMap<String, Table> = HashMap::new();

    for node_id in &plan.order {
        if cancel.load(Ordering::SeqCst) {
            report.success = false;
            report.logs.push(format!(
                "run cancelled before node '{node_id}' started"
            ));
            break;
        }

        let node = doc.node(node_id).expect("scheduler only emits known nodes");
        let _span = tracing::info_span!("run_node", node_id = %node_id, kind = node.kind.as_str())
            .entered();

        let upstream = &plan.upstream[node_id];
        let inputs: Vec<&Table> = upstream
            .iter()
            .map(|id| tables.get(id).expect("upstream node already ran"))
            .collect();

        match execute_with_output_filename(node.kind, &node.config, &inputs, ctx) {
            Ok((table, output_file)) => {
                tracing::info!(node_id = %node_id, rows = table.row_count(), "node succeeded");
                report
                    .node_status
                    .insert(node_id.clone(), NodeStatus::Success);
                report.node_results.insert(
                    node_id.clone(),
                    NodeResult::Ok(TablePreview::of(&table, PREVIEW_ROW_LIMIT)),
                );
                report
                    .logs
                    .push(format!("{node_id} ({}): success", node.kind.as_str()));

                if matches!(node.kind, NodeKind::Output | NodeKind::OutputCsv) {
                    report.output_file = output_file;
                    report.preview = Some(TablePreview::of(&table, PREVIEW_ROW_LIMIT));
                }

                tables.insert(node_id.clone(), table);
            }
            Err(e) => {
                tracing::error!(node_id = %node_id, error = %e, "node failed");
                report
                    .node_status
                    .insert(node_id.clone(), NodeStatus::Error);
                report.node_results.insert(
                    node_id.clone(),
                    NodeResult::Err { error: e.to_string() },
                );
                report
                    .logs
                    .push(format!("{node_id} ({}): {e}", node.kind.as_str()));
                report.success = false;
                break;
            }
        }
    }

    report
}
