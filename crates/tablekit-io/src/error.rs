use thiserror::Error;

/// I/O-boundary errors: anything that can go wrong reading or writing a
/// file, before the result becomes a `tablekit_common::TableError`.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx read error: {0}")]
    CalamineRead(#[from] calamine::Error),

    #[error("xlsx write error: {0}")]
    Xlsx(String),

    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("no sheet data in workbook {0}")]
    EmptyWorkbook(String),

    #[error("unrecognized encoding label: {0}")]
    UnknownEncoding(String),
}

impl From<IoError> for tablekit_common::TableError {
    fn from(e: IoError) -> Self {
        tablekit_common::TableError::compute(e.to_string())
    }
}
