//! SQL shape validation for the query pipeline.
//!
//! The pipeline only ever issues a single flat `SELECT` over the one
//! allowed table. Anything shaped like a CTE, subquery, or join is rejected
//! before execution, with the specific violated rule reported back.

use thiserror::Error;

use crate::schema::LEAD_TABLE;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SqlRuleViolation {
    #[error("CTEs (WITH clauses) are not allowed. Use a simple SELECT.")]
    CteNotAllowed,
    #[error("Subqueries are not allowed. Use a simple SELECT.")]
    NestedSelect,
    #[error("JOINs are not allowed. Only the {LEAD_TABLE} table is available.")]
    JoinNotAllowed,
    #[error("Invalid table. Only the '{LEAD_TABLE}' table exists.")]
    UnknownTable,
}

/// Validate query text against the allow-list rules. Rule order is part of
/// the contract: the first violated rule is the one reported.
pub fn validate_select(sql: &str) -> Result<(), SqlRuleViolation> {
    let upper = sql.to_uppercase();

    if upper.contains("WITH ") && upper.contains(" AS ") {
        return Err(SqlRuleViolation::CteNotAllowed);
    }

    if upper.matches("SELECT").count() > 1 {
        return Err(SqlRuleViolation::NestedSelect);
    }

    if upper.contains("JOIN") {
        return Err(SqlRuleViolation::JoinNotAllowed);
    }

    if !sql.to_lowercase().contains(LEAD_TABLE) {
        return Err(SqlRuleViolation::UnknownTable);
    }

    Ok(())
}

/// Pull the literal SQL statement out of a model response: strips code
/// fences and takes the first `SELECT` through its terminating semicolon
/// (or the rest of the text when unterminated).
pub fn extract_select_statement(response: &str) -> String {
    let cleaned = response.replace("```sql", "").replace("```", "");
    let cleaned = cleaned.trim();

    let Some(start) = find_ascii_case_insensitive(cleaned, "select") else {
        return cleaned.to_string();
    };

    let tail = &cleaned[start..];
    match tail.find(';') {
        Some(end) => tail[..=end].trim().to_string(),
        None => tail.trim().to_string(),
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::{extract_select_statement, validate_select, SqlRuleViolation};

    #[test]
    fn rejects_cte() {
        let sql = "WITH x AS (SELECT customer_id FROM leadscored) SELECT * FROM x";
        assert_eq!(validate_select(sql), Err(SqlRuleViolation::CteNotAllowed));
    }

    #[test]
    fn rejects_nested_select() {
        let sql = "SELECT * FROM a WHERE id IN (SELECT id FROM a)";
        assert_eq!(validate_select(sql), Err(SqlRuleViolation::NestedSelect));
    }

    #[test]
    fn rejects_join() {
        let sql = "SELECT * FROM leadscored JOIN other ON other.id = leadscored.customer_id";
        assert_eq!(validate_select(sql), Err(SqlRuleViolation::JoinNotAllowed));
    }

    #[test]
    fn rejects_unknown_table() {
        let sql = "SELECT * FROM customers";
        assert_eq!(validate_select(sql), Err(SqlRuleViolation::UnknownTable));
    }

    #[test]
    fn accepts_flat_grouped_select() {
        let sql =
            "SELECT Segment, COUNT(*) FROM leadscored GROUP BY Segment ORDER BY COUNT(*) DESC";
        assert_eq!(validate_select(sql), Ok(()));
    }

    #[test]
    fn extracts_fenced_statement() {
        let response = "Here is the query:\n```sql\nSELECT Segment FROM leadscored;\n```";
        assert_eq!(extract_select_statement(response), "SELECT Segment FROM leadscored;");
    }

    #[test]
    fn extracts_first_terminated_statement() {
        let response = "select * from leadscored limit 5; -- preview";
        assert_eq!(extract_select_statement(response), "select * from leadscored limit 5;");
    }

    #[test]
    fn unterminated_select_is_taken_whole() {
        let response = "SELECT COUNT(*) FROM leadscored";
        assert_eq!(extract_select_statement(response), "SELECT COUNT(*) FROM leadscored");
    }

    #[test]
    fn non_select_text_passes_through_for_validation_to_reject() {
        let response = "I cannot produce a query";
        assert_eq!(extract_select_statement(response), "I cannot produce a query");
        assert!(validate_select(response).is_err());
    }
}
