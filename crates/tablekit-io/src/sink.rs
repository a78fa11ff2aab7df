use crate::csv::write_csv_with_encoding;
use crate::error::IoError;
use crate::xlsx::write_xlsx;
use std::path::{Path, PathBuf};
use tablekit_common::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Resolves the final on-disk filename for an `output`/`output_csv` node:
/// an unset `filename` config is synthesized as `output_<8 hex chars>`
/// (matching `_save_output`'s `f"output_{uuid.uuid4().hex[:8]}"`); a
/// filename missing the expected extension gets it appended.
pub fn resolve_filename(requested: Option<&str>, format: OutputFormat) -> String {
    let base = match requested {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => {
            let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
            format!("output_{suffix}")
        }
    };
    let ext = format.extension();
    if base.to_ascii_lowercase().ends_with(&format!(".{ext}")) {
        base
    } else {
        format!("{base}.{ext}")
    }
}

/// Writes the node's result table to `<upload_dir>/<filename>` and
/// returns the final filename actually used. `encoding` is the
/// `output_csv`'s `encoding` config key (default `"utf-8"`); ignored for
/// `Xlsx`, which has no text encoding of its own.
pub fn write_output(
    table: &Table,
    upload_dir: impl AsRef<Path>,
    requested_filename: Option<&str>,
    format: OutputFormat,
    encoding: &str,
) -> Result<String, IoError> {
    let filename = resolve_filename(requested_filename, format);
    let path: PathBuf = upload_dir.as_ref().join(&filename);
    match format {
        OutputFormat::Xlsx => write_xlsx(table, &path)?,
        OutputFormat::Csv => write_csv_with_encoding(table, &path, encoding)?,
    }
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_missing_extension() {
        let name = resolve_filename(Some("report"), OutputFormat::Csv);
        assert_eq!(name, "report.csv");
    }

    #[test]
    fn keeps_existing_extension() {
        let name = resolve_filename(Some("report.xlsx"), OutputFormat::Xlsx);
        assert_eq!(name, "report.xlsx");
    }

    #[test]
    fn synthesizes_name_when_unset() {
        let name = resolve_filename(None, OutputFormat::Xlsx);
        assert!(name.starts_with("output_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(name.len(), "output_".len() + 8 + ".xlsx".len());
    }
}
