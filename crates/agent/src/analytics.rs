//! The analytics responder.
//!
//! Deterministically summarizes the turn's tabular result (frequency
//! breakdown, record counts, engagement and conversion means) and embeds a
//! chart intent when one was asked for. The model is only consulted for a
//! closing insights section, and its failure degrades to a placeholder
//! line rather than aborting the turn.

use tracing::warn;

use leadwise_core::tabular::{distinct_values, frequency_breakdown, markdown_preview, mean_of};
use leadwise_core::{ChartIntent, ChartKind, ResponderId, SessionState};

use crate::llm::LlmClient;
use crate::prompts;

pub async fn run(state: &mut SessionState, llm: &dyn LlmClient) {
    let label = ResponderId::Analytics.label();

    let rows = match state.tabular_result.as_ref() {
        Some(rows) if !rows.is_empty() => rows.clone(),
        _ => {
            state.push_responder_message(label, "No data available. Please query data first.");
            state.complete();
            return;
        }
    };

    let request = state.active_request.to_lowercase();
    let wants_pie = request.contains("pie");
    let wants_bar = request.contains("bar");
    let wants_chart = wants_pie
        || wants_bar
        || ["chart", "graph", "plot", "distribution", "breakdown", "visualiz"]
            .iter()
            .any(|keyword| request.contains(keyword));

    let breakdown = frequency_breakdown(&rows);
    let mut parts: Vec<String> = Vec::new();
    let mut chart = None;

    if wants_chart {
        if let Some(breakdown) = &breakdown {
            parts.push(format!("{} distribution:", breakdown.column));
            let total = breakdown.total();
            for (label, count) in breakdown.labels.iter().zip(&breakdown.values) {
                let pct = if total > 0 { *count as f64 / total as f64 * 100.0 } else { 0.0 };
                parts.push(format!("- {label}: {count} ({pct:.1}%)"));
            }

            chart = Some(ChartIntent {
                kind: if wants_pie { ChartKind::Pie } else { ChartKind::Bar },
                labels: breakdown.labels.clone(),
                values: breakdown.values.clone(),
                title: format!("Distribution by {}", breakdown.column),
            });
        }
    }

    parts.push("\nData summary:".to_string());
    parts.push(format!("- Total records: {}", rows.len()));
    if let Some(mean) = mean_of(&rows, "engagement_score") {
        parts.push(format!("- Avg engagement: {mean:.3}"));
    }
    if let Some(mean) = mean_of(&rows, "Converted") {
        parts.push(format!("- Conversion rate: {:.1}%", mean * 100.0));
    }
    let segments = distinct_values(&rows, "Segment");
    if !segments.is_empty() {
        let shown: Vec<&str> = segments.iter().take(5).map(String::as_str).collect();
        parts.push(format!("- Segments: {} ({})", segments.len(), shown.join(", ")));
    }

    let columns: Vec<String> =
        rows.first().map(|row| row.keys().cloned().collect()).unwrap_or_default();
    let data_summary = format!(
        "Records: {}\nColumns: {}\nSample:\n{}",
        rows.len(),
        columns.join(", "),
        markdown_preview(&rows, 3),
    );
    match llm
        .complete(&prompts::analytics_prompt(&columns, &data_summary, &state.active_request))
        .await
    {
        Ok(insights) => parts.push(format!("\nInsights:\n{insights}")),
        Err(error) => {
            warn!(%error, "analytics insights unavailable");
            parts.push("\nInsights: analysis unavailable.".to_string());
        }
    }

    let mut text = parts.join("\n");
    if let Some(chart) = chart {
        text.push_str("\n\n");
        text.push_str(&chart.embed());
    }

    state.push_responder_message(label, text);
    state.complete();
}
