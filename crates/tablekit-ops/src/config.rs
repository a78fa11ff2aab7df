use serde_json::Value;
use tablekit_common::{TableError, TableResult};

/// Reads `key`, falling back to the first legacy alias that is present.
/// This is how every operator absorbs the legacy config shape (`on` for
/// `left_on`/`right_on`, `detail_key` for `join_keys`, …) at the point of
/// use rather than in a separate normalization pass — config stays a
/// plain `serde_json::Value` all the way to the operator.
pub fn first_present<'a>(config: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| config.get(k))
}

pub fn require(config: &Value, op: &'static str, keys: &[&str]) -> TableResult<Value> {
    first_present(config, keys).cloned().ok_or_else(|| {
        TableError::config(format!(
            "{op}: missing required config key '{}'",
            keys[0]
        ))
    })
}

pub fn opt_str(config: &Value, keys: &[&str]) -> Option<String> {
    first_present(config, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub fn str_or(config: &Value, keys: &[&str], default: &str) -> String {
    opt_str(config, keys).unwrap_or_else(|| default.to_string())
}

pub fn require_str(config: &Value, op: &'static str, keys: &[&str]) -> TableResult<String> {
    opt_str(config, keys)
        .ok_or_else(|| TableError::config(format!("{op}: missing required config key '{}'", keys[0])))
}

/// Accepts either a single string or an array of strings — the spec's
/// "either may be a single name or a list" shorthand used throughout the
/// multi-table operators.
pub fn opt_str_list(config: &Value, keys: &[&str]) -> Option<Vec<String>> {
    let value = first_present(config, keys)?;
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

pub fn require_str_list(config: &Value, op: &'static str, keys: &[&str]) -> TableResult<Vec<String>> {
    opt_str_list(config, keys)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TableError::config(format!("{op}: missing required config key '{}'", keys[0])))
}

pub fn opt_bool(config: &Value, key: &str, default: bool) -> bool {
    config.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub fn opt_f64(config: &Value, key: &str, default: f64) -> f64 {
    config.get(key).and_then(Value::as_f64).unwrap_or(default)
}

pub fn opt_u64(config: &Value, key: &str, default: u64) -> u64 {
    config.get(key).and_then(Value::as_u64).unwrap_or(default)
}

pub fn opt_array<'a>(config: &'a Value, key: &str) -> Vec<&'a Value> {
    config
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

/// `calculations`/similar "target := expression" lists, which the
/// original source accepts either as `[{target, formula}, ...]` or as a
/// bare `{target: formula}` map; both land as the same ordered pairs.
pub fn target_expr_pairs(config: &Value, key: &str) -> Vec<(String, String)> {
    match config.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let target = item.get("target").and_then(Value::as_str)?;
                let formula = item
                    .get("formula")
                    .or_else(|| item.get("expr"))
                    .and_then(Value::as_str)?;
                Some((target.to_string(), formula.to_string()))
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(target, formula)| {
                Some((target.clone(), formula.as_str()?.to_string()))
            })
            .collect(),
        _ => Vec::new(),
    }
}
