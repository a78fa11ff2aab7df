use crate::csv::read_csv;
use crate::error::IoError;
use crate::xlsx::read_xlsx;
use std::path::Path;
use tablekit_common::Table;

/// Loads a `source`/`source_csv` node's resolved input file, dispatching
/// on extension rather than trusting the node's declared kind — a
/// `.csv` upload routed through a `source` node still reads as CSV.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table, IoError> {
    let path = path.as_ref();
    match crate::resolver::extension_of(path).as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => read_csv(path),
        Some("xlsx") | Some("xls") | Some("xlsm") => read_xlsx(path),
        Some(other) => Err(IoError::UnsupportedExtension(other.to_string())),
        None => Err(IoError::UnsupportedExtension(String::new())),
    }
}
