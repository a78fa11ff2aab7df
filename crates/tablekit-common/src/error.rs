//! Error taxonomy for the engine.
//!
//! - **`TableErrorKind`**: the seven-kind taxonomy — five hard (fail the
//!   node, stop the run) and two soft (absorbed at the call site and never
//!   constructed as a `TableError` at all; listed here only for reference).
//! - **`ErrorContext`**: node/column location info attached for authoring
//!   feedback.
//! - **`TableError`**: kind + message + context, the single type that
//!   crosses operator/engine boundaries.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableErrorKind {
    /// Unknown node id in an edge, a cycle, an arity mismatch.
    GraphShape,
    /// A source node's `file_id` did not resolve to a file.
    MissingInput,
    /// A required config key was absent or malformed.
    ConfigError,
    /// A config-referenced column is not present in the incoming table.
    SchemaError,
    /// An operator-internal failure with no more specific kind.
    ComputeError,
}

impl fmt::Display for TableErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GraphShape => "GraphShape",
            Self::MissingInput => "MissingInput",
            Self::ConfigError => "ConfigError",
            Self::SchemaError => "SchemaError",
            Self::ComputeError => "ComputeError",
        })
    }
}

/// Location info attached to an error to aid graph authoring: the error
/// message names the operator, the node id, and the offending column
/// where relevant, plus the available column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub node_id: Option<String>,
    pub operator: Option<&'static str>,
    pub column: Option<String>,
    pub available_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableError {
    pub kind: TableErrorKind,
    pub message: String,
    pub context: ErrorContext,
}

impl TableError {
    pub fn new(kind: TableErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn graph_shape(message: impl Into<String>) -> Self {
        Self::new(TableErrorKind::GraphShape, message)
    }

    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::new(TableErrorKind::MissingInput, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(TableErrorKind::ConfigError, message)
    }

    pub fn compute(message: impl Into<String>) -> Self {
        Self::new(TableErrorKind::ComputeError, message)
    }

    /// A column referenced by an operator's config is missing from its
    /// input table. Lists the available columns so the author can fix the
    /// graph without re-running it.
    pub fn schema(operator: &'static str, column: impl Into<String>, available: &[String]) -> Self {
        let column = column.into();
        Self {
            kind: TableErrorKind::SchemaError,
            message: format!(
                "{operator}: column '{column}' not found; available columns: [{}]",
                available.join(", ")
            ),
            context: ErrorContext {
                node_id: None,
                operator: Some(operator),
                column: Some(column),
                available_columns: available.to_vec(),
            },
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.context.node_id = Some(node_id.into());
        self
    }

    pub fn with_operator(mut self, operator: &'static str) -> Self {
        self.context.operator = Some(operator);
        self
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(op) = self.context.operator {
            write!(f, " {op}")?;
        }
        if let Some(ref node) = self.context.node_id {
            write!(f, " (node {node})")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for TableError {}

pub type TableResult<T> = Result<T, TableError>;
