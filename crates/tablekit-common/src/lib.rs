//! Core value types shared by every other `tablekit-*` crate: the `Cell`
//! scalar, the row-major `Table`, and the `TableError` taxonomy.

mod cell;
mod error;
mod table;

pub use cell::Cell;
pub use error::{ErrorContext, TableError, TableErrorKind, TableResult};
pub use table::Table;
