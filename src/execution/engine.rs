//! Query engine abstraction between the agent and the database

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tabular query result: ordered column names plus JSON-valued rows.
/// Ownership transfers to the caller on return; nothing is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of the named column in the first row.
    pub fn top_value(&self, column: &str) -> Option<&serde_json::Value> {
        let index = self.column_index(column)?;
        self.rows.first().and_then(|row| row.get(index))
    }

    /// Distinct non-null string values of the named column, in row order.
    pub fn distinct_strings(&self, column: &str) -> Vec<String> {
        let index = match self.column_index(column) {
            Some(index) => index,
            None => return Vec::new(),
        };
        let mut seen = Vec::new();
        for row in &self.rows {
            if let Some(serde_json::Value::String(value)) = row.get(index) {
                if !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
        }
        seen
    }

    /// Plain-text preview of the first `max_rows` rows, used for prompts.
    pub fn preview(&self, max_rows: usize) -> String {
        let mut lines = vec![self.columns.join(" | ")];
        for row in self.rows.iter().take(max_rows) {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            lines.push(cells.join(" | "));
        }
        lines.join("\n")
    }
}

/// Render a single cell without JSON quoting around strings.
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Seam between the orchestrator and a concrete database backend.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &'static str;

    /// Execute a single validated SELECT and return its rows.
    async fn execute(&self, sql: &str) -> Result<Table>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::new(
            vec!["category".to_string(), "revenue".to_string()],
            vec![
                vec![json!("cama_mesa_banho"), json!(1250.5)],
                vec![json!("beleza_saude"), json!(980.0)],
                vec![json!("cama_mesa_banho"), json!(410.0)],
                vec![json!(null), json!(1.0)],
            ],
        )
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let table = sample();
        assert_eq!(table.column_index("Revenue"), Some(1));
        assert!(table.has_column("CATEGORY"));
        assert!(!table.has_column("units"));
    }

    #[test]
    fn test_top_value_reads_first_row() {
        let table = sample();
        assert_eq!(table.top_value("category"), Some(&json!("cama_mesa_banho")));
        assert!(Table::new(vec!["a".to_string()], vec![]).top_value("a").is_none());
    }

    #[test]
    fn test_distinct_strings_preserve_row_order_and_skip_nulls() {
        let table = sample();
        assert_eq!(
            table.distinct_strings("category"),
            vec!["cama_mesa_banho".to_string(), "beleza_saude".to_string()]
        );
        assert!(table.distinct_strings("missing").is_empty());
    }

    #[test]
    fn test_preview_renders_unquoted_cells() {
        let table = sample();
        let preview = table.preview(2);
        assert!(preview.starts_with("category | revenue"));
        assert!(preview.contains("cama_mesa_banho | 1250.5"));
        assert!(!preview.contains('"'));
        assert_eq!(preview.lines().count(), 3);
    }
}
