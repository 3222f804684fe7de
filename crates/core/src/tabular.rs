//! Deterministic helpers over tabular query results.
//!
//! Frequency breakdowns, summary statistics, and the bounded markdown
//! preview all live here so the analytics responder stays a thin shell
//! around one model call.

use crate::session::Row;

/// Number of rows shown in the readable preview table.
pub const PREVIEW_ROWS: usize = 15;

/// Categorical columns preferred for summarization, in priority order.
const CHART_COLUMN_PRIORITY: &[&str] = &["Segment", "Lead_Source", "Country", "Occupation"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyBreakdown {
    pub column: String,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl FrequencyBreakdown {
    pub fn total(&self) -> i64 {
        self.values.iter().sum()
    }
}

/// Pick a categorical column and compute its frequency distribution.
///
/// A query that already aggregated (a `count` column is present) is used
/// as-is, with the first non-count column as labels. Otherwise the counts
/// are computed here over the priority columns, falling back to the first
/// text-typed column.
pub fn frequency_breakdown(rows: &[Row]) -> Option<FrequencyBreakdown> {
    let first = rows.first()?;

    if let Some(count_key) = first.keys().find(|key| key.eq_ignore_ascii_case("count")) {
        let count_key = count_key.clone();
        let label_key = first
            .keys()
            .find(|key| **key != count_key)
            .unwrap_or(&count_key)
            .clone();

        let mut labels = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            labels.push(display_value(row.get(&label_key)));
            values.push(value_as_i64(row.get(&count_key)).unwrap_or(0));
        }
        return Some(FrequencyBreakdown { column: label_key, labels, values });
    }

    let column = pick_categorical_column(first)?;
    let mut counts: Vec<(String, i64)> = Vec::new();
    for row in rows {
        let label = display_value(row.get(&column));
        match counts.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let (labels, values) = counts.into_iter().unzip();
    Some(FrequencyBreakdown { column, labels, values })
}

fn pick_categorical_column(row: &Row) -> Option<String> {
    for preferred in CHART_COLUMN_PRIORITY {
        if let Some(key) = row.keys().find(|key| key.as_str() == *preferred) {
            return Some(key.clone());
        }
    }
    row.iter()
        .find(|(_, value)| value.is_string())
        .map(|(key, _)| key.clone())
}

/// Mean of a numeric column, when present and parseable.
pub fn mean_of(rows: &[Row], column: &str) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        if let Some(value) = value_as_f64(row.get(column)) {
            sum += value;
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

/// Distinct values of a column in first-seen order.
pub fn distinct_values(rows: &[Row], column: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for row in rows {
        if let Some(value) = row.get(column) {
            let rendered = display_value(Some(value));
            if !seen.contains(&rendered) {
                seen.push(rendered);
            }
        }
    }
    seen
}

/// Render the first `limit` rows as a markdown table.
pub fn markdown_preview(rows: &[Row], limit: usize) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut table = String::new();
    table.push('|');
    for header in &headers {
        table.push_str(&format!(" {header} |"));
    }
    table.push_str("\n|");
    for _ in &headers {
        table.push_str(" --- |");
    }
    for row in rows.iter().take(limit) {
        table.push_str("\n|");
        for header in &headers {
            table.push_str(&format!(" {} |", display_value(row.get(header.as_str()))));
        }
    }
    table
}

fn display_value(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn value_as_f64(value: Option<&serde_json::Value>) -> Option<f64> {
    match value? {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        serde_json::Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn value_as_i64(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::Number(number) => {
            number.as_i64().or_else(|| number.as_f64().map(|float| float.round() as i64))
        }
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{distinct_values, frequency_breakdown, markdown_preview, mean_of};
    use crate::session::Row;

    fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
        let mut map = Row::new();
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        map
    }

    #[test]
    fn pre_aggregated_rows_are_used_as_is() {
        let rows = vec![
            row(&[("Lead_Source", json!("Google")), ("count", json!(42))]),
            row(&[("Lead_Source", json!("Referral")), ("count", json!(17))]),
        ];
        let breakdown = frequency_breakdown(&rows).expect("breakdown");
        assert_eq!(breakdown.column, "Lead_Source");
        assert_eq!(breakdown.labels, vec!["Google", "Referral"]);
        assert_eq!(breakdown.values, vec![42, 17]);
        assert_eq!(breakdown.total(), 59);
    }

    #[test]
    fn raw_rows_are_counted_by_priority_column() {
        let rows = vec![
            row(&[("customer_id", json!(1)), ("Segment", json!("Champions"))]),
            row(&[("customer_id", json!(2)), ("Segment", json!("At Risk"))]),
            row(&[("customer_id", json!(3)), ("Segment", json!("Champions"))]),
        ];
        let breakdown = frequency_breakdown(&rows).expect("breakdown");
        assert_eq!(breakdown.column, "Segment");
        assert_eq!(breakdown.labels, vec!["Champions", "At Risk"]);
        assert_eq!(breakdown.values, vec![2, 1]);
    }

    #[test]
    fn falls_back_to_first_string_column() {
        let rows = vec![
            row(&[("customer_id", json!(1)), ("City", json!("Pune"))]),
            row(&[("customer_id", json!(2)), ("City", json!("Pune"))]),
        ];
        let breakdown = frequency_breakdown(&rows).expect("breakdown");
        assert_eq!(breakdown.column, "City");
        assert_eq!(breakdown.values, vec![2]);
    }

    #[test]
    fn empty_rows_have_no_breakdown() {
        assert!(frequency_breakdown(&[]).is_none());
    }

    #[test]
    fn means_tolerate_mixed_representations() {
        let rows = vec![
            row(&[("engagement_score", json!(0.4)), ("Converted", json!(1))]),
            row(&[("engagement_score", json!("0.2")), ("Converted", json!(0))]),
        ];
        let mean = mean_of(&rows, "engagement_score").expect("mean");
        assert!((mean - 0.3).abs() < 1e-9);
        let conversion = mean_of(&rows, "Converted").expect("conversion");
        assert!((conversion - 0.5).abs() < 1e-9);
        assert!(mean_of(&rows, "missing").is_none());
    }

    #[test]
    fn distinct_preserves_first_seen_order() {
        let rows = vec![
            row(&[("Segment", json!("At Risk"))]),
            row(&[("Segment", json!("Champions"))]),
            row(&[("Segment", json!("At Risk"))]),
        ];
        assert_eq!(distinct_values(&rows, "Segment"), vec!["At Risk", "Champions"]);
    }

    #[test]
    fn preview_is_bounded_and_tabular() {
        let rows: Vec<Row> = (0..20)
            .map(|index| row(&[("customer_id", json!(index)), ("Segment", json!("Champions"))]))
            .collect();
        let preview = markdown_preview(&rows, 15);
        // Header + separator + 15 data rows.
        assert_eq!(preview.lines().count(), 17);
        assert!(preview.starts_with("| customer_id | Segment |"));
    }
}
