//! Chart-intent payloads for the rendering boundary.
//!
//! Analytics output may carry a machine-readable chart description embedded
//! in its prose behind a sentinel marker, so a presentation layer can
//! extract it without re-parsing the narrative text.

use serde::{Deserialize, Serialize};

const SENTINEL_OPEN: &str = "<!--CHART:";
const SENTINEL_CLOSE: &str = "-->";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Bar,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartIntent {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
    pub title: String,
}

impl ChartIntent {
    /// Render the sentinel-delimited form for embedding in responder text.
    pub fn embed(&self) -> String {
        let payload = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("{SENTINEL_OPEN}{payload}{SENTINEL_CLOSE}")
    }
}

/// Split a responder message into its chart intent (if any) and the
/// remaining display text.
pub fn extract_chart_intent(text: &str) -> (Option<ChartIntent>, String) {
    let Some(start) = text.find(SENTINEL_OPEN) else {
        return (None, text.to_string());
    };
    let Some(end_rel) = text[start..].find(SENTINEL_CLOSE) else {
        return (None, text.to_string());
    };
    let end = start + end_rel + SENTINEL_CLOSE.len();

    let payload = &text[start + SENTINEL_OPEN.len()..start + end_rel];
    let intent = serde_json::from_str::<ChartIntent>(payload).ok();

    let mut remainder = String::with_capacity(text.len());
    remainder.push_str(&text[..start]);
    remainder.push_str(&text[end..]);
    (intent, remainder.trim_end().to_string())
}
