use crate::error::IoError;
use calamine::{Data, Reader};
use std::path::Path;
use tablekit_common::{Cell, Table};

/// Reads the first worksheet of an XLSX workbook into a `Table`, treating
/// row 1 as the header. `source` nodes only ever read the first sheet —
/// multi-sheet workbooks are out of scope (GLOSSARY: a `source` node reads
/// one table from one file).
pub fn read_xlsx(path: impl AsRef<Path>) -> Result<Table, IoError> {
    read_xlsx_sheet(path, None, 1, 0)
}

/// Reads one sheet with a configurable header row position and a number
/// of rows to skip immediately after the header — `source`'s
/// `sheet_name`/`header_row`/`skip_rows` config keys. `header_row` is
/// 1-based, matching how the rest of the config surface addresses rows.
pub fn read_xlsx_sheet(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    header_row: usize,
    skip_rows: usize,
) -> Result<Table, IoError> {
    let mut workbook: calamine::Xlsx<_> = calamine::open_workbook(path.as_ref())
        .map_err(|e| IoError::Xlsx(e.to_string()))?;
    let resolved_name = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IoError::EmptyWorkbook(format!("{:?}", path.as_ref())))?,
    };
    let range = workbook
        .worksheet_range(&resolved_name)
        .map_err(|e| IoError::Xlsx(e.to_string()))?;

    let header_row = header_row.max(1);
    let mut rows_iter = range.rows().skip(header_row - 1);
    let header = rows_iter
        .next()
        .ok_or_else(|| IoError::EmptyWorkbook(resolved_name.clone()))?;
    let columns: Vec<String> = header.iter().map(data_to_header).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for row in rows_iter.skip(skip_rows) {
        let mut cells: Vec<Cell> = row.iter().map(data_to_cell).collect();
        cells.resize(width, Cell::Null);
        rows.push(cells);
    }

    Table::new(columns, rows).map_err(|e| IoError::Xlsx(e.to_string()))
}

fn data_to_header(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(dt.to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
        Data::Empty => Cell::Null,
    }
}

/// Writes a `Table` to an XLSX file via `umya-spreadsheet`, matching the
/// teacher's own write backend.
pub fn write_xlsx(table: &Table, path: impl AsRef<Path>) -> Result<(), IoError> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| IoError::Xlsx("default sheet missing".to_string()))?;

    for (col_idx, name) in table.columns.iter().enumerate() {
        sheet
            .get_cell_mut(((col_idx + 1) as u32, 1))
            .set_value(name.clone());
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = (row_idx + 2) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let sheet_col = (col_idx + 1) as u32;
            let target = sheet.get_cell_mut((sheet_col, sheet_row));
            match cell {
                Cell::Null => {}
                Cell::Int(i) => {
                    target.set_value_number(*i as f64);
                }
                Cell::Float(f) => {
                    target.set_value_number(*f);
                }
                Cell::Bool(b) => {
                    target.set_value_bool(*b);
                }
                Cell::Text(s) => {
                    target.set_value(s.clone());
                }
                Cell::DateTime(dt) => {
                    target.set_value(dt.format("%Y-%m-%d %H:%M:%S").to_string());
                }
            }
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path.as_ref())
        .map_err(|e| IoError::Xlsx(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reads_back_a_table() {
        let table = Table::new(
            vec!["name".into(), "amount".into()],
            vec![
                vec![Cell::Text("alice".into()), Cell::Float(10.5)],
                vec![Cell::Text("bob".into()), Cell::Int(3)],
            ],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_xlsx(&table, &path).unwrap();

        let read_back = read_xlsx(&path).unwrap();
        assert_eq!(read_back.columns, table.columns);
        assert_eq!(read_back.rows.len(), 2);
    }
}
