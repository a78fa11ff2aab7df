use crate::config::{opt_str_list, str_or};
use serde_json::Value;
use std::collections::HashMap;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "join";

/// `join`: binary. `{how, left_on, right_on}` (`on` is shorthand for
/// both). Key columns are coerced to text before matching. When
/// `left_on[i] ≠ right_on[i]` the surviving right key column is dropped;
/// colliding non-key names on the right receive deterministic suffixes.
/// Preserves the row order of the left input within each match group.
pub fn join(config: &Value, left: &Table, right: &Table) -> TableResult<Table> {
    let how = str_or(config, &["how"], "inner");
    let how = if how == "full_outer" { "outer".to_string() } else { how };
    let on = opt_str_list(config, &["on"]);
    let left_on = opt_str_list(config, &["left_on"])
        .or_else(|| on.clone())
        .ok_or_else(|| TableError::config(format!("{OP}: missing required config key 'left_on'")))?;
    let right_on = opt_str_list(config, &["right_on"])
        .or(on)
        .unwrap_or_else(|| left_on.clone());
    if left_on.len() != right_on.len() {
        return Err(TableError::config(format!(
            "{OP}: left_on and right_on must have the same length"
        )));
    }

    let mut left_idx = Vec::with_capacity(left_on.len());
    for name in &left_on {
        left_idx.push(
            left.col_index(name)
                .ok_or_else(|| left.missing_column_error(OP, name))?,
        );
    }
    let mut right_idx = Vec::with_capacity(right_on.len());
    for name in &right_on {
        right_idx.push(
            right
                .col_index(name)
                .ok_or_else(|| right.missing_column_error(OP, name))?,
        );
    }

    // Right-side columns carried into the result, excluding keys that are
    // represented by the left-side name (i.e. where left_on[i] == right_on[i]).
    let drop_right: Vec<usize> = right_idx
        .iter()
        .zip(&left_on)
        .zip(&right_on)
        .filter(|((_, l), r)| l == r)
        .map(|((idx, _), _)| *idx)
        .collect();

    let mut out_columns = left.columns.clone();
    let mut right_carry: Vec<usize> = Vec::new();
    let mut right_names: Vec<String> = Vec::new();
    for (i, name) in right.columns.iter().enumerate() {
        if drop_right.contains(&i) {
            continue;
        }
        right_carry.push(i);
        right_names.push(Table::unique_suffixed_name(&out_columns, name));
        out_columns.push(right_names.last().unwrap().clone());
    }

    let mut right_by_key: HashMap<String, Vec<usize>> = HashMap::new();
    for (r, row) in right.rows.iter().enumerate() {
        let key = right_idx
            .iter()
            .map(|&i| row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        right_by_key.entry(key).or_default().push(r);
    }

    let mut matched_right: std::collections::HashSet<usize> = std::collections::HashSet::new();
    let mut out_rows: Vec<Vec<Cell>> = Vec::new();

    for left_row in &left.rows {
        let key = left_idx
            .iter()
            .map(|&i| left_row[i].as_key_text())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        let matches = right_by_key.get(&key);
        match matches {
            Some(rs) if !rs.is_empty() => {
                for &r in rs {
                    matched_right.insert(r);
                    let right_row = &right.rows[r];
                    let mut row = left_row.clone();
                    for &i in &right_carry {
                        row.push(right_row[i].clone());
                    }
                    out_rows.push(row);
                }
            }
            _ => {
                if how == "left" || how == "outer" {
                    let mut row = left_row.clone();
                    for _ in &right_carry {
                        row.push(Cell::Null);
                    }
                    out_rows.push(row);
                }
            }
        }
    }

    if how == "right" || how == "outer" {
        for (r, right_row) in right.rows.iter().enumerate() {
            if matched_right.contains(&r) {
                continue;
            }
            let mut row: Vec<Cell> = vec![Cell::Null; left.columns.len()];
            for (&li, &ri) in left_idx.iter().zip(&right_idx) {
                row[li] = right_row[ri].clone();
            }
            for &i in &right_carry {
                row.push(right_row[i].clone());
            }
            out_rows.push(row);
        }
    }

    Table::new(out_columns, out_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn left_table() -> Table {
        Table::new(
            vec!["sku".into(), "qty".into()],
            vec![
                vec![Cell::Int(1), Cell::Int(5)],
                vec![Cell::Int(2), Cell::Int(7)],
            ],
        )
        .unwrap()
    }

    fn right_table() -> Table {
        Table::new(
            vec!["sku".into(), "name".into()],
            vec![vec![Cell::Int(1), Cell::Text("widget".into())]],
        )
        .unwrap()
    }

    #[test]
    fn inner_join_drops_unmatched_and_right_key() {
        let config = json!({"how": "inner", "on": "sku"});
        let out = join(&config, &left_table(), &right_table()).unwrap();
        assert_eq!(out.columns, vec!["sku", "qty", "name"]);
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn left_join_preserves_left_row_count() {
        let config = json!({"how": "left", "on": "sku"});
        let out = join(&config, &left_table(), &right_table()).unwrap();
        assert_eq!(out.row_count(), 2);
        let unmatched = out.rows.iter().find(|r| r[0] == Cell::Int(2)).unwrap();
        assert_eq!(unmatched[2], Cell::Null);
    }

    #[test]
    fn inner_join_row_count_never_exceeds_product() {
        let out = join(&json!({"how": "inner", "on": "sku"}), &left_table(), &right_table()).unwrap();
        assert!(out.row_count() <= left_table().row_count() * right_table().row_count());
    }
}
