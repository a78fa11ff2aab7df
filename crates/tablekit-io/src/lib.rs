//! File resolution and the CSV/XLSX read/write backends used by
//! `source`/`source_csv` and `output`/`output_csv` nodes.

pub mod csv;
mod error;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod xlsx;

pub use error::IoError;
pub use resolver::{DirectoryResolver, FileResolver, MapResolver};
pub use sink::{resolve_filename, write_output, OutputFormat};
pub use source::load_table;
