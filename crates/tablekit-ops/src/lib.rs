mod code;
mod concat;
pub mod config;
mod date_process;
mod deduplicate;
mod diff;
mod fill_na;
mod group_aggregate;
mod join;
mod kind;
mod llm_row;
mod pivot;
mod reconcile;
mod sinks;
mod sources;
mod text_process;
mod transform;
mod type_convert;
mod unpivot;
mod vlookup;

pub use code::CodeExecutionPolicy;
pub use kind::{Arity, NodeKind};

use serde_json::Value;
use std::path::PathBuf;
use tablekit_common::{Table, TableError, TableResult};
use tablekit_io::resolver::FileResolver;
use tablekit_io::OutputFormat;
use tablekit_llm::ChatClient;

/// Everything an operator needs beyond its config and input tables: where
/// to find source files, where to write sinks, and the optional
/// host-provided bridges for `llm_row` and `code`.
pub struct OpContext<'a> {
    pub resolver: &'a dyn FileResolver,
    pub upload_dir: PathBuf,
    pub llm_client: Option<&'a ChatClient>,
    pub code_policy: CodeExecutionPolicy,
}

/// Dispatches a node kind to its operator implementation. `inputs` must
/// already satisfy `kind.arity()` — the engine's validator is responsible
/// for rejecting arity mismatches before this is ever called.
pub fn execute(
    kind: NodeKind,
    config: &Value,
    inputs: &[&Table],
    ctx: &OpContext,
) -> TableResult<Table> {
    if !kind.arity().accepts(inputs.len()) {
        return Err(TableError::graph_shape(format!(
            "{}: expects {} input(s), got {}",
            kind.as_str(),
            kind.arity(),
            inputs.len()
        )));
    }

    use NodeKind::*;
    match kind {
        Source => sources::source(config, ctx.resolver),
        SourceCsv => sources::source_csv(config, ctx.resolver),
        Transform => transform::transform(config, inputs[0]),
        TypeConvert => type_convert::type_convert(config, inputs[0]),
        FillNa => fill_na::fill_na(config, inputs[0]),
        Deduplicate => deduplicate::deduplicate(config, inputs[0]),
        TextProcess => text_process::text_process(config, inputs[0]),
        DateProcess => date_process::date_process(config, inputs[0]),
        GroupAggregate => group_aggregate::group_aggregate(config, inputs[0]),
        Pivot => pivot::pivot(config, inputs[0]),
        Unpivot => unpivot::unpivot(config, inputs[0]),
        Join => join::join(config, inputs[0], inputs[1]),
        Concat => concat::concat(config, inputs),
        Vlookup => vlookup::vlookup(config, inputs[0], inputs[1]),
        Diff => diff::diff(config, inputs[0], inputs[1]),
        Reconcile => reconcile::reconcile(config, inputs[0], inputs[1]),
        Code => code::code(&ctx.code_policy, config, inputs[0]),
        LlmRow => {
            let client = ctx.llm_client.ok_or_else(|| {
                TableError::config("llm_row: no LLM client configured for this run")
            })?;
            llm_row::llm_row(config, inputs[0], client)
        }
        Output => sinks::output(config, inputs[0], &ctx.upload_dir, OutputFormat::Xlsx)
            .map(|(table, _filename)| table),
        OutputCsv => sinks::output(config, inputs[0], &ctx.upload_dir, OutputFormat::Csv)
            .map(|(table, _filename)| table),
    }
}

/// Like [`execute`], but also returns the filename written for terminal
/// (`output`/`output_csv`) nodes, as the run report needs it.
pub fn execute_with_output_filename(
    kind: NodeKind,
    config: &Value,
    inputs: &[&Table],
    ctx: &OpContext,
) -> TableResult<(Table, Option<String>)> {
    match kind {
        NodeKind::Output => {
            if !kind.arity().accepts(inputs.len()) {
                return Err(TableError::graph_shape(format!(
                    "{}: expects {} input(s), got {}",
                    kind.as_str(),
                    kind.arity(),
                    inputs.len()
                )));
            }
            sinks::output(config, inputs[0], &ctx.upload_dir, OutputFormat::Xlsx)
                .map(|(table, filename)| (table, Some(filename)))
        }
        NodeKind::OutputCsv => {
            if !kind.arity().accepts(inputs.len()) {
                return Err(TableError::graph_shape(format!(
                    "{}: expects {} input(s), got {}",
                    kind.as_str(),
                    kind.arity(),
                    inputs.len()
                )));
            }
            sinks::output(config, inputs[0], &ctx.upload_dir, OutputFormat::Csv)
                .map(|(table, filename)| (table, Some(filename)))
        }
        other => execute(other, config, inputs, ctx).map(|table| (table, None)),
    }
}
