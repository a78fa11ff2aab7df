use crate::config::{opt_str, str_or};
use serde_json::Value;
use std::path::Path;
use tablekit_common::{Table, TableError, TableResult};
use tablekit_io::{write_output, OutputFormat};

const OP_XLSX: &str = "output";
const OP_CSV: &str = "output_csv";

/// `output` / `output_csv`: identity on the input table, plus the
/// side-effect of writing it to `<upload_dir>/<filename>` (filename
/// synthesized if unset, auto-suffixed with the format's extension).
/// `encoding` (default `"utf-8"`) controls how `output_csv` encodes its
/// bytes; ignored for xlsx. Returns the table unchanged and the filename
/// actually used.
pub fn output(
    config: &Value,
    input: &Table,
    upload_dir: impl AsRef<Path>,
    format: OutputFormat,
) -> TableResult<(Table, String)> {
    let op = match format {
        OutputFormat::Xlsx => OP_XLSX,
        OutputFormat::Csv => OP_CSV,
    };
    let filename = opt_str(config, &["filename"]);
    let encoding = str_or(config, &["encoding"], "utf-8");
    let written = write_output(input, upload_dir, filename.as_deref(), format, &encoding)
        .map_err(|e| TableError::compute(format!("{op}: {e}")))?;
    Ok((input.clone(), written))
}
