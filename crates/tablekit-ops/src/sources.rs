use crate::config::{opt_u64, str_or};
use serde_json::Value;
use tablekit_common::{TableError, TableResult, Table};
use tablekit_io::{resolver::FileResolver, xlsx, csv};

/// `source`: `{file_id, sheet_name, header_row=1, skip_rows=0}`.
pub fn source(config: &Value, resolver: &dyn FileResolver) -> TableResult<Table> {
    let file_id = require_file_id(config, "source")?;
    let path = resolve_or_fail(resolver, &file_id, "source")?;
    let sheet_name = config.get("sheet_name").and_then(Value::as_str);
    let header_row = opt_u64(config, "header_row", 1) as usize;
    let skip_rows = opt_u64(config, "skip_rows", 0) as usize;

    xlsx::read_xlsx_sheet(&path, sheet_name, header_row, skip_rows)
        .map_err(|e| TableError::compute(format!("source: {e}")).with_operator("source"))
}

/// `source_csv`: `{file_id, delimiter=",", encoding="utf-8"}`.
pub fn source_csv(config: &Value, resolver: &dyn FileResolver) -> TableResult<Table> {
    let file_id = require_file_id(config, "source_csv")?;
    let path = resolve_or_fail(resolver, &file_id, "source_csv")?;
    let delimiter = str_or(config, &["delimiter"], ",");
    let delimiter_byte = delimiter.as_bytes().first().copied().unwrap_or(b',');
    let encoding = str_or(config, &["encoding"], "utf-8");

    csv::read_csv_with_delimiter_and_encoding(&path, delimiter_byte, &encoding)
        .map_err(|e| TableError::compute(format!("source_csv: {e}")).with_operator("source_csv"))
}

fn require_file_id(config: &Value, op: &'static str) -> TableResult<String> {
    config
        .get("file_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TableError::config(format!("{op}: missing required config key 'file_id'")))
}

fn resolve_or_fail(
    resolver: &dyn FileResolver,
    file_id: &str,
    op: &'static str,
) -> TableResult<std::path::PathBuf> {
    resolver.resolve(file_id).ok_or_else(|| {
        TableError::missing_input(format!("{op}: no file found for file_id '{file_id}'"))
            .with_operator(op)
    })
}
