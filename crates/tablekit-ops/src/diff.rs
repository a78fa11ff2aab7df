use crate::config::opt_str_list;
use serde_json::Value;
use std::collections::HashSet;
use tablekit_common::{Cell, Table, TableResult};

const OP: &str = "diff";

/// `diff`: binary. `compare_columns` default = intersection of the two
/// inputs' column names, used only to decide whether a row matches across
/// sides. Produces the full rows present in only one side (every column of
/// the original table, not just the compared ones), tagged
/// `_diff_status ∈ {"only in 1", "only in 2"}`.
pub fn diff(config: &Value, left: &Table, right: &Table) -> TableResult<Table> {
    let compare_columns: Vec<String> = opt_str_list(config, &["compare_columns"]).unwrap_or_else(|| {
        left.columns
            .iter()
            .filter(|c| right.has_column(c))
            .cloned()
            .collect()
    });

    let mut left_idx = Vec::with_capacity(compare_columns.len());
    for name in &compare_columns {
        left_idx.push(
            left.col_index(name)
                .ok_or_else(|| left.missing_column_error(OP, name))?,
        );
    }
    let mut right_idx = Vec::with_capacity(compare_columns.len());
    for name in &compare_columns {
        right_idx.push(
            right
                .col_index(name)
                .ok_or_else(|| right.missing_column_error(OP, name))?,
        );
    }

    let row_key = |row: &[Cell], idx: &[usize]| -> String {
        idx.iter()
            .map(|&i| row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}")
    };

    let right_keys: HashSet<String> = right.rows.iter().map(|r| row_key(r, &right_idx)).collect();
    let left_keys: HashSet<String> = left.rows.iter().map(|r| row_key(r, &left_idx)).collect();

    // Full output shape: every left column, then every right column not
    // already present on the left, so a row from either side can be
    // carried across in full with nulls padding the other side's columns.
    let mut out_columns = left.columns.clone();
    let mut right_only: Vec<usize> = Vec::new();
    for (i, name) in right.columns.iter().enumerate() {
        if left.has_column(name) {
            continue;
        }
        right_only.push(i);
        out_columns.push(Table::unique_suffixed_name(&out_columns, name));
    }
    out_columns.push("_diff_status".to_string());

    let mut out_rows = Vec::new();
    for row in &left.rows {
        let key = row_key(row, &left_idx);
        if !right_keys.contains(&key) {
            let mut out_row = row.clone();
            for _ in &right_only {
                out_row.push(Cell::Null);
            }
            out_row.push(Cell::Text("only in 1".to_string()));
            out_rows.push(out_row);
        }
    }
    for row in &right.rows {
        let key = row_key(row, &right_idx);
        if !left_keys.contains(&key) {
            let mut out_row: Vec<Cell> = vec![Cell::Null; left.columns.len()];
            for (i, name) in left.columns.iter().enumerate() {
                if let Some(ri) = right.col_index(name) {
                    out_row[i] = row[ri].clone();
                }
            }
            for &ri in &right_only {
                out_row.push(row[ri].clone());
            }
            out_row.push(Cell::Text("only in 2".to_string()));
            out_rows.push(out_row);
        }
    }

    Table::new(out_columns, out_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_rows_present_on_only_one_side() {
        let left = Table::new(
            vec!["id".into()],
            vec![vec![Cell::Int(1)], vec![Cell::Int(2)]],
        )
        .unwrap();
        let right = Table::new(vec!["id".into()], vec![vec![Cell::Int(2)], vec![Cell::Int(3)]]).unwrap();
        let out = diff(&json!({}), &left, &right).unwrap();
        assert_eq!(out.row_count(), 2);
        let status_idx = out.col_index("_diff_status").unwrap();
        let statuses: Vec<&Cell> = out.rows.iter().map(|r| &r[status_idx]).collect();
        assert!(statuses.contains(&&Cell::Text("only in 1".into())));
        assert!(statuses.contains(&&Cell::Text("only in 2".into())));
    }

    #[test]
    fn only_in_one_side_rows_keep_their_non_compared_columns() {
        let left = Table::new(
            vec!["id".into(), "note".into()],
            vec![vec![Cell::Int(1), Cell::Text("left-only".into())]],
        )
        .unwrap();
        let right = Table::new(
            vec!["id".into(), "tag".into()],
            vec![vec![Cell::Int(2), Cell::Text("right-only".into())]],
        )
        .unwrap();
        let out = diff(&json!({"compare_columns": ["id"]}), &left, &right).unwrap();
        assert_eq!(out.columns, vec!["id", "note", "tag", "_diff_status"]);
        let left_row = out.rows.iter().find(|r| r[0] == Cell::Int(1)).unwrap();
        assert_eq!(left_row[1], Cell::Text("left-only".into()));
        assert_eq!(left_row[2], Cell::Null);
        let right_row = out.rows.iter().find(|r| r[0] == Cell::Int(2)).unwrap();
        assert_eq!(right_row[1], Cell::Null);
        assert_eq!(right_row[2], Cell::Text("right-only".into()));
    }
}
