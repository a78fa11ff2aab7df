use chrono::NaiveDateTime;
use serde_json::Value;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "type_convert";

/// `type_convert`: each `{column, dtype}` coerces one column to
/// `{int, float, str, datetime, bool}`; uncoercible cells become null
/// rather than surfacing as an error.
pub fn type_convert(config: &Value, input: &Table) -> TableResult<Table> {
    let mut table = input.clone();
    let specs = config
        .get("conversions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for spec in specs {
        let column = spec
            .get("column")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::config(format!("{OP}: conversion missing 'column'")))?;
        let dtype = spec
            .get("dtype")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::config(format!("{OP}: conversion missing 'dtype'")))?;
        let idx = table
            .col_index(column)
            .ok_or_else(|| table.missing_column_error(OP, column))?;

        for row in table.rows.iter_mut() {
            row[idx] = coerce(&row[idx], dtype);
        }
    }

    Ok(table)
}

fn coerce(cell: &Cell, dtype: &str) -> Cell {
    if cell.is_null() {
        return Cell::Null;
    }
    match dtype {
        "int" => cell
            .as_f64()
            .map(|n| Cell::Int(n as i64))
            .unwrap_or(Cell::Null),
        "float" => cell.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
        "str" => Cell::Text(cell.to_string()),
        "bool" => Cell::Bool(cell.is_truthy()),
        "datetime" => parse_datetime(&cell.to_string())
            .map(Cell::DateTime)
            .unwrap_or(Cell::Null),
        _ => cell.clone(),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_text_to_int_and_nulls_garbage() {
        let table = Table::new(
            vec!["amount".into()],
            vec![
                vec![Cell::Text("42".into())],
                vec![Cell::Text("nope".into())],
            ],
        )
        .unwrap();
        let config = json!({"conversions": [{"column": "amount", "dtype": "int"}]});
        let out = type_convert(&config, &table).unwrap();
        assert_eq!(out.rows[0][0], Cell::Int(42));
        assert_eq!(out.rows[1][0], Cell::Null);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let table = Table::new(vec!["a".into()], vec![]).unwrap();
        let config = json!({"conversions": [{"column": "nope", "dtype": "int"}]});
        let err = type_convert(&config, &table).unwrap_err();
        assert_eq!(err.kind, tablekit_common::TableErrorKind::SchemaError);
    }
}
