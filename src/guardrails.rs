//! Last-line SQL safety validation before execution

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AgentError, Result};

lazy_static! {
    static ref FORBIDDEN_RE: Regex =
        Regex::new(r"\b(drop|delete|update|insert|alter|truncate|create|exec|execute)\b").unwrap();
}

/// Accept only a single read-only SELECT statement.
///
/// Runs on every compiled query with no bypass, because the filter compiler
/// concatenates user-influenced values into otherwise trusted templates.
pub fn validate_sql(sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Err(AgentError::Validation(
            "SQL query must be a non-empty string".to_string(),
        ));
    }

    let cleaned = sql.trim().to_lowercase();

    if !cleaned.starts_with("select") {
        return Err(AgentError::Validation("Only SELECT queries allowed".to_string()));
    }

    if cleaned.contains(';') {
        return Err(AgentError::Validation(
            "Multiple SQL statements not allowed".to_string(),
        ));
    }

    if FORBIDDEN_RE.is_match(&cleaned) {
        return Err(AgentError::Validation("Unsafe SQL detected".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(sql: &str) -> String {
        match validate_sql(sql) {
            Err(AgentError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_plain_select() {
        assert!(validate_sql("SELECT category, revenue FROM v_category_revenue").is_ok());
        assert!(validate_sql("  select 1  ").is_ok());
    }

    #[test]
    fn test_rejects_empty_sql() {
        assert_eq!(violation(""), "SQL query must be a non-empty string");
        assert_eq!(violation("   "), "SQL query must be a non-empty string");
    }

    #[test]
    fn test_rejects_non_select() {
        assert_eq!(
            violation("UPDATE orders SET price = 0"),
            "Only SELECT queries allowed"
        );
        assert_eq!(violation("WITH x AS (SELECT 1) SELECT * FROM x"), "Only SELECT queries allowed");
    }

    #[test]
    fn test_rejects_statement_separators() {
        assert_eq!(
            violation("SELECT 1; DROP TABLE orders"),
            "Multiple SQL statements not allowed"
        );
        assert_eq!(violation("SELECT 1;"), "Multiple SQL statements not allowed");
    }

    #[test]
    fn test_rejects_forbidden_keywords_case_insensitively() {
        assert_eq!(
            violation("SELECT * FROM orders WHERE id IN (SELECT id FROM x) AND Drop = 1"),
            "Unsafe SQL detected"
        );
        assert_eq!(
            violation("select * from t where exec > 0"),
            "Unsafe SQL detected"
        );
    }

    #[test]
    fn test_keyword_matching_is_whole_word() {
        // "created_at" contains "create" only as a fragment; allowed.
        assert!(validate_sql("SELECT created_at FROM v_order_facts").is_ok());
    }
}
