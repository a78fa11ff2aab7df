use serde::Serialize;
use std::collections::HashMap;
use tablekit_common::{Cell, Table};

/// Rows shown per node in `node_results`/`preview` — the report is a
/// preview for UI replay, not a full data dump.
pub const PREVIEW_ROW_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub total_rows: usize,
}

impl TablePreview {
    pub fn of(table: &Table, limit: usize) -> Self {
        Self {
            columns: table.columns.clone(),
            rows: table.rows.iter().take(limit).cloned().collect(),
            total_rows: table.row_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NodeResult {
    Ok(TablePreview),
    Err { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<TablePreview>,
    pub logs: Vec<String>,
    pub node_status: HashMap<String, NodeStatus>,
    pub node_results: HashMap<String, NodeResult>,
}

impl RunReport {
    pub fn empty() -> Self {
        Self {
            success: true,
            output_file: None,
            preview: None,
            logs: Vec::new(),
            node_status: HashMap::new(),
            node_results: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablekit_common::Cell;

    #[test]
    fn preview_truncates_but_keeps_total_row_count() {
        let table = Table::new(
            vec!["a".into()],
            (0..100).map(|i| vec![Cell::Int(i)]).collect(),
        )
        .unwrap();
        let preview = TablePreview::of(&table, 10);
        assert_eq!(preview.rows.len(), 10);
        assert_eq!(preview.total_rows, 100);
    }
}
