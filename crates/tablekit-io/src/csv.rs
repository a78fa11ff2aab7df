use crate::error::IoError;
use encoding_rs::Encoding;
use std::io::Write;
use std::path::Path;
use tablekit_common::{Cell, Table, TableResult};

/// Reads a CSV file into a `Table`. The first record is always treated as
/// the header row — `source_csv` nodes have no "headerless" mode in this
/// engine. Fields are type-inferred the same way the original CSV ingest
/// did: unambiguous booleans and numbers are coerced, everything else
/// stays text, leaving finer-grained coercion to `type_convert`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Table, IoError> {
    read_csv_with_delimiter(path, b',')
}

/// Reads with a caller-chosen field delimiter — `source_csv`'s
/// `delimiter` config key, defaulting to `,`. Assumes UTF-8; use
/// [`read_csv_with_delimiter_and_encoding`] for `source_csv`'s `encoding`
/// config key.
pub fn read_csv_with_delimiter(path: impl AsRef<Path>, delimiter: u8) -> Result<Table, IoError> {
    read_csv_with_delimiter_and_encoding(path, delimiter, "utf-8")
}

/// Reads a CSV file decoded from `encoding` (a WHATWG label such as
/// `"utf-8"`, `"gbk"`, `"latin1"`) before the delimiter-split/type-infer
/// pass runs.
pub fn read_csv_with_delimiter_and_encoding(
    path: impl AsRef<Path>,
    delimiter: u8,
    encoding: &str,
) -> Result<Table, IoError> {
    let bytes = std::fs::read(path.as_ref())?;
    let decoded = decode_bytes(&bytes, encoding)?;

    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(decoded.as_bytes());

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let mut row: Vec<Cell> = rec.iter().map(infer_cell).collect();
        row.resize(width, Cell::Null);
        rows.push(row);
    }

    Table::new(columns, rows).map_err(|e| IoError::Xlsx(e.to_string()))
}

fn decode_bytes(bytes: &[u8], encoding: &str) -> Result<String, IoError> {
    let enc = Encoding::for_label(encoding.as_bytes())
        .ok_or_else(|| IoError::UnknownEncoding(encoding.to_string()))?;
    let (decoded, _, _had_errors) = enc.decode(bytes);
    Ok(decoded.into_owned())
}

/// Writes a `Table` to CSV, cells rendered through `Cell::Display` with
/// `Null` emitted as an empty field. Assumes UTF-8 output; use
/// [`write_csv_with_encoding`] for `output_csv`'s `encoding` config key.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<(), IoError> {
    write_csv_with_encoding(table, path, "utf-8")
}

/// Writes a `Table` to CSV, encoding the output with `encoding` (a WHATWG
/// label such as `"utf-8"`, `"gbk"`, `"latin1"`).
pub fn write_csv_with_encoding(
    table: &Table,
    path: impl AsRef<Path>,
    encoding: &str,
) -> Result<(), IoError> {
    let enc = Encoding::for_label(encoding.as_bytes())
        .ok_or_else(|| IoError::UnknownEncoding(encoding.to_string()))?;

    let mut buf = Vec::new();
    write_csv_to(table, &mut buf)?;
    let utf8 = String::from_utf8(buf).expect("csv writer only ever emits UTF-8 text");
    let (encoded, _, _) = enc.encode(&utf8);

    let mut file = std::fs::File::create(path.as_ref())?;
    file.write_all(&encoded)?;
    Ok(())
}

pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<(), IoError> {
    let mut wtr = ::csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(cell_to_field).collect();
        wtr.write_record(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn infer_cell(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Null;
    }
    if field.eq_ignore_ascii_case("true") {
        return Cell::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Cell::Bool(false);
    }
    if let Some(i) = parse_unambiguous_i64(field) {
        return Cell::Int(i);
    }
    if let Some(n) = parse_unambiguous_f64(field) {
        return Cell::Float(n);
    }
    Cell::Text(field.to_string())
}

fn parse_unambiguous_i64(s: &str) -> Option<i64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let (sign, digits) = match bytes[0] {
        b'+' => (1i64, &s[1..]),
        b'-' => (-1i64, &s[1..]),
        _ => (1i64, s),
    };
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    if !digits.as_bytes().iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().map(|v| sign * v)
}

fn parse_unambiguous_f64(s: &str) -> Option<f64> {
    if !(s.contains('.') || s.contains('e') || s.contains('E')) {
        return None;
    }
    let n: f64 = s.parse().ok()?;
    n.is_finite().then_some(n)
}

fn cell_to_field(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}

pub fn table_to_result(table: Table) -> TableResult<Table> {
    table.check_invariants()?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_typed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "name,amount,active").unwrap();
        writeln!(f, "alice,10.5,true").unwrap();
        writeln!(f, "bob,,false").unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.columns, vec!["name", "amount", "active"]);
        assert_eq!(table.rows[0][1], Cell::Float(10.5));
        assert_eq!(table.rows[1][1], Cell::Null);
        assert_eq!(table.rows[1][2], Cell::Bool(false));
    }

    #[test]
    fn round_trips_write_then_read() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Int(1), Cell::Text("x".into())]],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&table, &path).unwrap();
        let read_back = read_csv(&path).unwrap();
        assert_eq!(read_back.columns, table.columns);
        assert_eq!(read_back.rows[0][0], Cell::Int(1));
    }
}
