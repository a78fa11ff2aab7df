use chrono::NaiveDateTime;
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single tabular value.
///
/// Distinct from the possible *declared* column types: a `float64`
/// column still stores `Cell::Null` for missing cells, and a
/// best-effort CSV read may park a numeric-looking string as `Cell::Text`
/// until `type_convert` coerces it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
    Null,
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::DateTime(dt) => write!(f, "{dt}"),
            Cell::Null => write!(f, ""),
        }
    }
}

impl Cell {
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Bool(b) => *b,
            Cell::Int(i) => *i != 0,
            Cell::Float(n) => *n != 0.0,
            Cell::Text(s) => !s.is_empty(),
            Cell::DateTime(_) => true,
            Cell::Null => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Best-effort numeric coercion, used by arithmetic in the expression
    /// language and by numeric aggregations. Returns `None` rather than an
    /// error — callers decide whether a non-numeric cell is a hard failure.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(n) => Some(*n),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::DateTime(_) | Cell::Null => None,
        }
    }

    /// Text coercion used by join/vlookup/reconcile key matching — keys
    /// are coerced to text on both sides before comparing.
    pub fn as_key_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Int(_) => "int64",
            Cell::Float(_) => "float64",
            Cell::Bool(_) => "bool",
            Cell::Text(_) => "text",
            Cell::DateTime(_) => "datetime",
            Cell::Null => "null",
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}
impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}
impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}
impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}
impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_matches_spec_coercions() {
        assert!(!Cell::Null.is_truthy());
        assert!(!Cell::Int(0).is_truthy());
        assert!(Cell::Text("x".into()).is_truthy());
        assert!(!Cell::Text(String::new()).is_truthy());
    }

    #[test]
    fn key_text_coerces_numbers_and_nulls() {
        assert_eq!(Cell::Int(7).as_key_text(), "7");
        assert_eq!(Cell::Null.as_key_text(), "");
    }
}
