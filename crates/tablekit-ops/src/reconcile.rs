use crate::config::{opt_f64, require_str, require_str_list, str_or};
use serde_json::Value;
use std::collections::HashMap;
use tablekit_common::{Cell, Table, TableResult};

const OP: &str = "reconcile";

/// `reconcile`: binary; first input is the **detail** table, second the
/// **summary**. `{join_keys[], left_column, right_column, output_mode ∈
/// {diff_only, all}, tolerance ≥ 0}`.
///
/// 1. group detail by `join_keys`, summing `left_column` into "detail total"
/// 2. project summary to `join_keys` + `right_column` renamed "summary total"
/// 3. coerce keys to text on both sides
/// 4. outer-merge on the keys
/// 5. fill missing amounts with 0
/// 6. `difference = detail_total - summary_total`; verdict "match" when
///    `|difference| <= tolerance`, else "mismatch"
/// 7. in `diff_only` mode (the default), keep only mismatches
pub fn reconcile(config: &Value, detail: &Table, summary: &Table) -> TableResult<Table> {
    let join_keys = require_str_list(config, OP, &["join_keys", "detail_key"])?;
    let left_column = require_str(config, OP, &["left_column", "detail_amount"])?;
    let right_column = require_str(config, OP, &["right_column", "summary_amount"])?;
    let output_mode = str_or(config, &["output_mode"], "diff_only");
    let tolerance = opt_f64(config, "tolerance", 0.0).abs();

    let mut detail_key_idx = Vec::with_capacity(join_keys.len());
    for name in &join_keys {
        detail_key_idx.push(
            detail
                .col_index(name)
                .ok_or_else(|| detail.missing_column_error(OP, name))?,
        );
    }
    let mut summary_key_idx = Vec::with_capacity(join_keys.len());
    for name in &join_keys {
        summary_key_idx.push(
            summary
                .col_index(name)
                .ok_or_else(|| summary.missing_column_error(OP, name))?,
        );
    }
    let left_idx = detail
        .col_index(&left_column)
        .ok_or_else(|| detail.missing_column_error(OP, &left_column))?;
    let right_idx = summary
        .col_index(&right_column)
        .ok_or_else(|| summary.missing_column_error(OP, &right_column))?;

    // (1) group detail, summing left_column per key.
    let mut detail_order: Vec<String> = Vec::new();
    let mut detail_keys: HashMap<String, Vec<Cell>> = HashMap::new();
    let mut detail_totals: HashMap<String, f64> = HashMap::new();
    for row in &detail.rows {
        let key = detail_key_idx
            .iter()
            .map(|&i| row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if !detail_keys.contains_key(&key) {
            detail_order.push(key.clone());
            detail_keys.insert(key.clone(), detail_key_idx.iter().map(|&i| row[i].clone()).collect());
        }
        *detail_totals.entry(key).or_insert(0.0) += row[left_idx].as_f64().unwrap_or(0.0);
    }

    // (2) project summary to keys + renamed amount; duplicate keys sum.
    let mut summary_order: Vec<String> = Vec::new();
    let mut summary_keys: HashMap<String, Vec<Cell>> = HashMap::new();
    let mut summary_totals: HashMap<String, f64> = HashMap::new();
    for row in &summary.rows {
        let key = summary_key_idx
            .iter()
            .map(|&i| row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if !summary_keys.contains_key(&key) {
            summary_order.push(key.clone());
            summary_keys.insert(key.clone(), summary_key_idx.iter().map(|&i| row[i].clone()).collect());
        }
        *summary_totals.entry(key).or_insert(0.0) += row[right_idx].as_f64().unwrap_or(0.0);
    }

    // (4) outer-merge on the keys, preserving detail order then
    // summary-only keys in summary order.
    let mut all_keys: Vec<String> = detail_order.clone();
    for key in &summary_order {
        if !detail_keys.contains_key(key) {
            all_keys.push(key.clone());
        }
    }

    let mut out_columns = join_keys.clone();
    out_columns.push("detail_total".to_string());
    out_columns.push("summary_total".to_string());
    out_columns.push("difference".to_string());
    out_columns.push("verdict".to_string());

    let mut out_rows = Vec::with_capacity(all_keys.len());
    for key in &all_keys {
        let key_cells = detail_keys.get(key).or_else(|| summary_keys.get(key)).unwrap();
        // (5) fill missing amounts with 0.
        let detail_total = *detail_totals.get(key).unwrap_or(&0.0);
        let summary_total = *summary_totals.get(key).unwrap_or(&0.0);
        let difference = detail_total - summary_total;
        let verdict = if difference.abs() <= tolerance { "match" } else { "mismatch" };

        if output_mode == "diff_only" && verdict == "match" {
            continue;
        }

        let mut row = key_cells.clone();
        row.push(Cell::Float(detail_total));
        row.push(Cell::Float(summary_total));
        row.push(Cell::Float(difference));
        row.push(Cell::Text(verdict.to_string()));
        out_rows.push(row);
    }

    Table::new(out_columns, out_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail() -> Table {
        Table::new(
            vec!["m".into(), "a".into()],
            vec![
                vec![Cell::Text("A".into()), Cell::Int(10)],
                vec![Cell::Text("A".into()), Cell::Int(20)],
                vec![Cell::Text("B".into()), Cell::Int(5)],
            ],
        )
        .unwrap()
    }

    fn summary() -> Table {
        Table::new(
            vec!["m".into(), "s".into()],
            vec![
                vec![Cell::Text("A".into()), Cell::Float(29.995)],
                vec![Cell::Text("B".into()), Cell::Int(5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn within_tolerance_diff_only_is_empty() {
        let config = json!({
            "join_keys": ["m"], "left_column": "a", "right_column": "s",
            "tolerance": 0.01, "output_mode": "diff_only"
        });
        let out = reconcile(&config, &detail(), &summary()).unwrap();
        assert_eq!(out.row_count(), 0);
    }

    #[test]
    fn all_mode_reports_every_group_with_verdicts() {
        let config = json!({
            "join_keys": ["m"], "left_column": "a", "right_column": "s",
            "tolerance": 0.01, "output_mode": "all"
        });
        let out = reconcile(&config, &detail(), &summary()).unwrap();
        assert_eq!(out.row_count(), 2);
        let verdict_idx = out.col_index("verdict").unwrap();
        assert!(out.rows.iter().all(|r| r[verdict_idx] == Cell::Text("match".into())));
    }

    #[test]
    fn reconcile_identity_when_sums_match_exactly() {
        let detail = Table::new(vec!["m".into(), "a".into()], vec![vec![Cell::Text("A".into()), Cell::Int(30)]]).unwrap();
        let summary = Table::new(vec!["m".into(), "s".into()], vec![vec![Cell::Text("A".into()), Cell::Int(30)]]).unwrap();
        let config = json!({
            "join_keys": ["m"], "left_column": "a", "right_column": "s",
            "output_mode": "diff_only"
        });
        let out = reconcile(&config, &detail, &summary).unwrap();
        assert_eq!(out.row_count(), 0);
    }
}
