use crate::config::opt_str_list;
use chrono::{Datelike, Days, Months, NaiveDateTime};
use serde_json::Value;
use tablekit_common::{Cell, Table, TableError, TableResult};

const OP: &str = "date_process";

/// `date_process`: parses `column` as datetime; emits zero or more of
/// `{year, month, day, weekday, quarter}` as `<col>_<tag>` columns
/// (`parts`, aliased `extract`); optionally shifts the original column by
/// `±Nd`/`±NM`/`±Ny` (`shift`, aliased `offset`).
pub fn date_process(config: &Value, input: &Table) -> TableResult<Table> {
    let column = config
        .get("column")
        .and_then(Value::as_str)
        .ok_or_else(|| TableError::config(format!("{OP}: missing required config key 'column'")))?;
    let idx = input
        .col_index(column)
        .ok_or_else(|| input.missing_column_error(OP, column))?;

    let parts: Vec<String> = opt_str_list(config, &["parts", "extract"]).unwrap_or_default();

    let shift = config
        .get("shift")
        .or_else(|| config.get("offset"))
        .and_then(Value::as_str);

    let mut table = input.clone();
    let parsed: Vec<Option<NaiveDateTime>> = table
        .rows
        .iter()
        .map(|row| parse_datetime(&row[idx]))
        .collect();

    for part in &parts {
        let values: Vec<Cell> = parsed.iter().map(|dt| part_value(dt, part)).collect();
        let col_name = format!("{column}_{part}");
        if let Some(existing) = table.col_index(&col_name) {
            for (row, value) in table.rows.iter_mut().zip(values) {
                row[existing] = value;
            }
        } else {
            table.columns.push(col_name);
            for (row, value) in table.rows.iter_mut().zip(values) {
                row.push(value);
            }
        }
    }

    if let Some(shift_spec) = shift {
        let (amount, unit) = parse_shift(shift_spec)
            .ok_or_else(|| TableError::config(format!("{OP}: invalid shift '{shift_spec}'")))?;
        for (row, dt) in table.rows.iter_mut().zip(&parsed) {
            row[idx] = match dt {
                Some(dt) => apply_shift(*dt, amount, unit)
                    .map(Cell::DateTime)
                    .unwrap_or(Cell::Null),
                None => Cell::Null,
            };
        }
    }

    Ok(table)
}

fn parse_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => {
            let s = s.trim();
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .or_else(|| {
                    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
        _ => None,
    }
}

fn part_value(dt: &Option<NaiveDateTime>, part: &str) -> Cell {
    let Some(dt) = dt else { return Cell::Null };
    match part {
        "year" => Cell::Int(dt.year() as i64),
        "month" => Cell::Int(dt.month() as i64),
        "day" => Cell::Int(dt.day() as i64),
        "weekday" => Cell::Int(dt.weekday().number_from_monday() as i64),
        "quarter" => Cell::Int(((dt.month() - 1) / 3 + 1) as i64),
        _ => Cell::Null,
    }
}

#[derive(Clone, Copy)]
enum ShiftUnit {
    Days,
    Months,
    Years,
}

fn parse_shift(spec: &str) -> Option<(i64, ShiftUnit)> {
    let spec = spec.trim();
    let (sign, rest) = match spec.as_bytes().first()? {
        b'+' => (1i64, &spec[1..]),
        b'-' => (-1i64, &spec[1..]),
        _ => (1i64, spec),
    };
    let unit_char = rest.chars().last()?;
    let digits = &rest[..rest.len() - unit_char.len_utf8()];
    let amount: i64 = digits.parse().ok()?;
    let unit = match unit_char {
        'd' | 'D' => ShiftUnit::Days,
        'M' => ShiftUnit::Months,
        'y' | 'Y' => ShiftUnit::Years,
        _ => return None,
    };
    Some((sign * amount, unit))
}

fn apply_shift(dt: NaiveDateTime, amount: i64, unit: ShiftUnit) -> Option<NaiveDateTime> {
    match unit {
        ShiftUnit::Days => {
            if amount >= 0 {
                dt.checked_add_days(Days::new(amount as u64))
            } else {
                dt.checked_sub_days(Days::new((-amount) as u64))
            }
        }
        ShiftUnit::Months => {
            if amount >= 0 {
                dt.checked_add_months(Months::new(amount as u32))
            } else {
                dt.checked_sub_months(Months::new((-amount) as u32))
            }
        }
        ShiftUnit::Years => {
            let months = amount * 12;
            if months >= 0 {
                dt.checked_add_months(Months::new(months as u32))
            } else {
                dt.checked_sub_months(Months::new((-months) as u32))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emits_requested_parts() {
        let table = Table::new(
            vec!["d".into()],
            vec![vec![Cell::Text("2024-03-15".into())]],
        )
        .unwrap();
        let config = json!({"column": "d", "parts": ["year", "month", "quarter", "weekday"]});
        let out = date_process(&config, &table).unwrap();
        assert_eq!(out.rows[0][out.col_index("d_year").unwrap()], Cell::Int(2024));
        assert_eq!(out.rows[0][out.col_index("d_month").unwrap()], Cell::Int(3));
        assert_eq!(out.rows[0][out.col_index("d_quarter").unwrap()], Cell::Int(1));
        assert_eq!(out.rows[0][out.col_index("d_weekday").unwrap()], Cell::Int(5));
    }

    #[test]
    fn shift_moves_the_original_column() {
        let table = Table::new(
            vec!["d".into()],
            vec![vec![Cell::Text("2024-01-31".into())]],
        )
        .unwrap();
        let config = json!({"column": "d", "shift": "+1M"});
        let out = date_process(&config, &table).unwrap();
        match &out.rows[0][0] {
            Cell::DateTime(dt) => assert_eq!(dt.month(), 2),
            other => panic!("expected datetime, got {other:?}"),
        }
    }
}
