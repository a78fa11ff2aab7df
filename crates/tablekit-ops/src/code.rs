use serde_json::Value;
use tablekit_common::{Table, TableError, TableResult};

const OP: &str = "code";

/// Host-supplied sandboxed evaluator for `code` nodes. Disabled by
/// default: TableKit ships no scripting VM, so running a `code` node
/// without a host-provided evaluator is a hard error rather than a
/// silent no-op.
#[derive(Clone)]
pub enum CodeExecutionPolicy {
    Disabled,
    Enabled(std::sync::Arc<dyn Fn(&Value, &Table) -> TableResult<Table> + Send + Sync>),
}

impl Default for CodeExecutionPolicy {
    fn default() -> Self {
        Self::Disabled
    }
}

pub fn code(policy: &CodeExecutionPolicy, config: &Value, input: &Table) -> TableResult<Table> {
    match policy {
        CodeExecutionPolicy::Disabled => Err(TableError::compute(format!(
            "{OP}: code execution is disabled; configure a CodeExecutionPolicy::Enabled evaluator to run this node"
        ))),
        CodeExecutionPolicy::Enabled(eval) => eval(config, input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tablekit_common::Cell;

    #[test]
    fn disabled_policy_is_a_compute_error() {
        let table = Table::new(vec!["a".into()], vec![vec![Cell::Int(1)]]).unwrap();
        let err = code(&CodeExecutionPolicy::Disabled, &json!({}), &table).unwrap_err();
        assert_eq!(err.kind, tablekit_common::TableErrorKind::ComputeError);
    }

    #[test]
    fn enabled_policy_runs_the_supplied_evaluator() {
        let table = Table::new(vec!["a".into()], vec![vec![Cell::Int(1)]]).unwrap();
        let policy = CodeExecutionPolicy::Enabled(std::sync::Arc::new(|_config, input: &Table| {
            Ok(input.clone())
        }));
        let out = code(&policy, &json!({}), &table).unwrap();
        assert_eq!(out, table);
    }
}
