use crate::config::{first_present, opt_str_list, target_expr_pairs};
use serde_json::Value;
use std::cmp::Ordering;
use tablekit_common::{Cell, Table, TableError, TableResult};
use tablekit_expr::Evaluator;

const OP: &str = "transform";

/// The composite cleaner, applied in a fixed order: filter, drop
/// columns, compute calculations, rename, select, sort.
pub fn transform(config: &Value, input: &Table) -> TableResult<Table> {
    let mut columns = input.columns.clone();
    let mut rows = input.rows.clone();

    filter_rows(config, &columns, &mut rows)?;
    drop_columns(config, &mut columns, &mut rows);
    apply_calculations(config, &mut columns, &mut rows);
    rename(config, &mut columns);
    select(config, &mut columns, &mut rows);
    sort(config, &columns, &mut rows)?;

    Table::new(columns, rows)
}

fn filter_rows(config: &Value, columns: &[String], rows: &mut Vec<Vec<Cell>>) -> TableResult<()> {
    let Some(src) = first_present(config, &["filter", "filter_code"]).and_then(Value::as_str)
    else {
        return Ok(());
    };
    let expr = tablekit_expr::parse(src)
        .map_err(|e| TableError::config(format!("{OP}: invalid filter expression: {e}")))?;
    let evaluator = Evaluator::new(columns);
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        if evaluator.eval(&expr, &row)?.is_truthy() {
            kept.push(row);
        }
    }
    *rows = kept;
    Ok(())
}

fn drop_columns(config: &Value, columns: &mut Vec<String>, rows: &mut [Vec<Cell>]) {
    let Some(to_drop) = opt_str_list(config, &["drop_columns"]) else {
        return;
    };
    project_out(columns, rows, |name| !to_drop.iter().any(|d| d == name));
}

fn apply_calculations(config: &Value, columns: &mut Vec<String>, rows: &mut [Vec<Cell>]) {
    for (target, formula) in target_expr_pairs(config, "calculations") {
        let Ok(expr) = tablekit_expr::parse(&formula) else {
            continue;
        };
        let evaluator = Evaluator::new(columns);
        let mut computed = Vec::with_capacity(rows.len());
        let mut resolvable = true;
        for row in rows.iter() {
            match evaluator.eval(&expr, row) {
                Ok(v) => computed.push(v),
                Err(_) => {
                    resolvable = false;
                    break;
                }
            }
        }
        if !resolvable {
            continue;
        }
        if let Some(idx) = columns.iter().position(|c| c == &target) {
            for (row, value) in rows.iter_mut().zip(computed) {
                row[idx] = value;
            }
        } else {
            columns.push(target);
            for (row, value) in rows.iter_mut().zip(computed) {
                row.push(value);
            }
        }
    }
}

fn rename(config: &Value, columns: &mut [String]) {
    let Some(Value::Object(map)) = config.get("rename_map") else {
        return;
    };
    for name in columns.iter_mut() {
        if let Some(new_name) = map.get(name.as_str()).and_then(Value::as_str) {
            *name = new_name.to_string();
        }
    }
}

fn select(config: &Value, columns: &mut Vec<String>, rows: &mut [Vec<Cell>]) {
    let Some(wanted) = opt_str_list(config, &["selected_columns"]) else {
        return;
    };
    let present: Vec<String> = wanted
        .into_iter()
        .filter(|name| columns.contains(name))
        .collect();
    reorder_columns(columns, rows, &present);
}

fn sort(config: &Value, columns: &[String], rows: &mut [Vec<Cell>]) -> TableResult<()> {
    let Some(keys) = opt_str_list(config, &["sort_by"]) else {
        return Ok(());
    };
    let ascending = first_present(config, &["sort_order"])
        .and_then(Value::as_str)
        .map(|order| !order.eq_ignore_ascii_case("desc"))
        .unwrap_or(true);
    let mut indices = Vec::with_capacity(keys.len());
    for key in &keys {
        let idx = columns
            .iter()
            .position(|c| c == key)
            .ok_or_else(|| TableError::schema(OP, key.clone(), &columns.to_vec()))?;
        indices.push(idx);
    }

    rows.sort_by(|a, b| {
        for &idx in &indices {
            let ord = compare_cells(&a[idx], &b[idx]);
            if ord != Ordering::Equal {
                return if ascending { ord } else { ord.reverse() };
            }
        }
        Ordering::Equal
    });
    Ok(())
}

fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.as_key_text().cmp(&b.as_key_text()),
    }
}

/// Drops whichever columns fail `keep`, preserving the remaining order.
fn project_out(columns: &mut Vec<String>, rows: &mut [Vec<Cell>], keep: impl Fn(&str) -> bool) {
    let keep_idx: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, name)| keep(name))
        .map(|(i, _)| i)
        .collect();
    reorder_by_index(columns, rows, &keep_idx);
}

fn reorder_columns(columns: &mut Vec<String>, rows: &mut [Vec<Cell>], wanted: &[String]) {
    let idx: Vec<usize> = wanted
        .iter()
        .filter_map(|name| columns.iter().position(|c| c == name))
        .collect();
    reorder_by_index(columns, rows, &idx);
}

fn reorder_by_index(columns: &mut Vec<String>, rows: &mut [Vec<Cell>], idx: &[usize]) {
    let new_columns: Vec<String> = idx.iter().map(|&i| columns[i].clone()).collect();
    for row in rows.iter_mut() {
        let new_row: Vec<Cell> = idx.iter().map(|&i| row[i].clone()).collect();
        *row = new_row;
    }
    *columns = new_columns;
}
