//! Facade crate: load a graph document, run it against a file resolver,
//! and get back a run report. See `tablekit-engine` for scheduling and
//! execution, and `tablekit-ops` for the operator catalog.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tablekit_common::TableResult;
pub use tablekit_engine::{
    run, validate, Edge, GraphDocument, Node, NodeResult, NodeStatus, RunReport,
};
pub use tablekit_io::{DirectoryResolver, FileResolver, MapResolver};
pub use tablekit_llm::ChatClient;
pub use tablekit_ops::{CodeExecutionPolicy, NodeKind, OpContext};

/// Parses a graph document from its JSON-equivalent wire shape.
pub fn parse_document(json: &str) -> TableResult<GraphDocument> {
    serde_json::from_str(json).map_err(|e| tablekit_common::TableError::config(e.to_string()))
}

/// Validates and runs `document` against `resolver`, writing any
/// `output`/`output_csv` nodes under `upload_dir`. Equivalent to calling
/// `tablekit_engine::run` directly but bundles construction of the
/// `OpContext` the way a typical embedder does.
pub fn run_graph(
    document: &GraphDocument,
    resolver: &dyn FileResolver,
    upload_dir: impl Into<PathBuf>,
    llm_client: Option<&ChatClient>,
) -> RunReport {
    let ctx = OpContext {
        resolver,
        upload_dir: upload_dir.into(),
        llm_client,
        code_policy: CodeExecutionPolicy::Disabled,
    };
    let cancel = Arc::new(AtomicBool::new(false));
    run(document, &ctx, &cancel)
}
