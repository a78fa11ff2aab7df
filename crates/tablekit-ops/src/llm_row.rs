use crate::config::{opt_u64, require_str};
use serde_json::Value;
use tablekit_common::{Cell, Table, TableResult};
use tablekit_llm::ChatClient;

const OP: &str = "llm_row";

/// `llm_row`: unary. `{prompt, target_column, row_limit (default 20)}`.
/// For each of the first `row_limit` rows, substitutes `{{colname}}`
/// tokens in `prompt`; if none were substituted, appends a rendered
/// key/value block of the row instead. Requests are sequential. A
/// per-row failure is captured as an `"Error: <message>"` cell and never
/// aborts the node.
pub fn llm_row(config: &Value, input: &Table, client: &ChatClient) -> TableResult<Table> {
    let prompt_template = require_str(config, OP, &["prompt"])?;
    let target_column = require_str(config, OP, &["target_column"])?;
    let row_limit = opt_u64(config, "row_limit", 20) as usize;

    let mut table = input.clone();
    let target_idx = match table.col_index(&target_column) {
        Some(idx) => idx,
        None => {
            table.columns.push(target_column.clone());
            for row in table.rows.iter_mut() {
                row.push(Cell::Null);
            }
            table.columns.len() - 1
        }
    };

    let limit = row_limit.min(table.rows.len());
    for row in table.rows.iter_mut().take(limit) {
        let prompt = render_prompt(&prompt_template, &input.columns, row);
        row[target_idx] = match client.chat(&prompt) {
            Ok(reply) => Cell::Text(reply),
            Err(err) => Cell::Text(format!("Error: {err}")),
        };
    }

    Ok(table)
}

fn render_prompt(template: &str, columns: &[String], row: &[Cell]) -> String {
    let mut rendered = template.to_string();
    let mut substituted = false;
    for (name, cell) in columns.iter().zip(row) {
        let token = format!("{{{{{name}}}}}");
        if rendered.contains(&token) {
            rendered = rendered.replace(&token, &cell.to_string());
            substituted = true;
        }
    }
    if substituted {
        return rendered;
    }

    let mut block = String::new();
    for (name, cell) in columns.iter().zip(row) {
        block.push_str(&format!("{name}: {cell}\n"));
    }
    format!("{rendered}\n\n{block}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_column_tokens() {
        let columns = vec!["name".to_string()];
        let row = vec![Cell::Text("Ada".into())];
        let rendered = render_prompt("Greet {{name}}.", &columns, &row);
        assert_eq!(rendered, "Greet Ada.");
    }

    #[test]
    fn falls_back_to_key_value_block_when_no_tokens_match() {
        let columns = vec!["name".to_string()];
        let row = vec![Cell::Text("Ada".into())];
        let rendered = render_prompt("Summarize this row.", &columns, &row);
        assert!(rendered.contains("Summarize this row."));
        assert!(rendered.contains("name: Ada"));
    }
}
