//! The segment strategist responder.
//!
//! Produces marketing narrative over the five-segment model. Per-segment
//! statistics come from an optional JSON file; the built-in figures from
//! the offline clustering run are used when the file is absent or
//! unreadable. Order matters: segments are listed by engagement rank.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use leadwise_core::{ResponderId, SessionState};

use crate::llm::LlmClient;
use crate::prompts;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub avg_engagement: f64,
    pub conversion_rate: f64,
}

pub type SegmentStatsList = Vec<(String, SegmentStats)>;

pub fn builtin_segment_stats() -> SegmentStatsList {
    vec![
        ("Champions".to_string(), SegmentStats { avg_engagement: 0.35, conversion_rate: 0.65 }),
        (
            "Highly Engaged".to_string(),
            SegmentStats { avg_engagement: 0.25, conversion_rate: 0.50 },
        ),
        (
            "Potential Loyalists".to_string(),
            SegmentStats { avg_engagement: 0.15, conversion_rate: 0.35 },
        ),
        ("At Risk".to_string(), SegmentStats { avg_engagement: 0.08, conversion_rate: 0.25 }),
        ("Low Value".to_string(), SegmentStats { avg_engagement: 0.03, conversion_rate: 0.15 }),
    ]
}

/// Load per-segment statistics from a JSON object keyed by segment name.
/// Any read or parse problem falls back to the built-in figures.
pub fn load_segment_stats(path: Option<&Path>) -> SegmentStatsList {
    let Some(path) = path else {
        return builtin_segment_stats();
    };

    match read_stats_file(path) {
        Ok(stats) if !stats.is_empty() => stats,
        Ok(_) => {
            warn!(path = %path.display(), "segment stats file is empty, using built-in figures");
            builtin_segment_stats()
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "could not load segment stats, using built-in figures");
            builtin_segment_stats()
        }
    }
}

fn read_stats_file(path: &Path) -> Result<SegmentStatsList, String> {
    let raw = fs::read_to_string(path).map_err(|error| error.to_string())?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&raw).map_err(|error| error.to_string())?;

    let mut stats = Vec::with_capacity(object.len());
    for (segment, value) in object {
        let parsed: SegmentStats =
            serde_json::from_value(value).map_err(|error| error.to_string())?;
        stats.push((segment, parsed));
    }
    Ok(stats)
}

fn render_stats(stats: &[(String, SegmentStats)]) -> String {
    let mut object = serde_json::Map::new();
    for (segment, figures) in stats {
        if let Ok(value) = serde_json::to_value(figures) {
            object.insert(segment.clone(), value);
        }
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(object))
        .unwrap_or_else(|_| "{}".to_string())
}

pub async fn run(state: &mut SessionState, llm: &dyn LlmClient, stats: &[(String, SegmentStats)]) {
    let label = ResponderId::Segment.label();
    let prompt = prompts::strategist_prompt(&render_stats(stats), &state.active_request);

    let narrative = match llm.complete(&prompt).await {
        Ok(text) => text,
        Err(error) => {
            warn!(%error, "segment strategy generation unavailable");
            "Segment analysis is unavailable right now. \
             The five segments, ranked by engagement, are: Champions, Highly Engaged, \
             Potential Loyalists, At Risk, Low Value."
                .to_string()
        }
    };

    state.push_responder_message(label, &narrative);
    state.segment_narrative = Some(narrative);
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use leadwise_core::SessionState;

    use super::{builtin_segment_stats, load_segment_stats, render_stats, run};
    use crate::llm::{LlmClient, LlmError, Prompt};

    struct CapturingLlm {
        reply: &'static str,
        captured: std::sync::Mutex<Option<Prompt>>,
    }

    #[async_trait]
    impl LlmClient for CapturingLlm {
        async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
            *self.captured.lock().expect("lock") = Some(prompt.clone());
            Ok(self.reply.to_string())
        }
    }

    #[test]
    fn builtin_stats_cover_all_five_segments_in_rank_order() {
        let stats = builtin_segment_stats();
        let names: Vec<&str> = stats.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Champions", "Highly Engaged", "Potential Loyalists", "At Risk", "Low Value"]
        );
        // Engagement strictly decreases down the ranking.
        for pair in stats.windows(2) {
            assert!(pair[0].1.avg_engagement > pair[1].1.avg_engagement);
        }
    }

    #[test]
    fn missing_stats_file_falls_back_to_builtin() {
        let loaded = load_segment_stats(Some(std::path::Path::new("/nonexistent/stats.json")));
        assert_eq!(loaded, builtin_segment_stats());
        assert_eq!(load_segment_stats(None), builtin_segment_stats());
    }

    #[test]
    fn rendered_stats_are_json_keyed_by_segment() {
        let rendered = render_stats(&builtin_segment_stats());
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert!((parsed["Champions"]["conversion_rate"].as_f64().expect("rate") - 0.65).abs()
            < 1e-9);
    }

    #[tokio::test]
    async fn narrative_is_logged_and_recorded() {
        let llm = CapturingLlm {
            reply: "Prioritize Champions with loyalty offers.",
            captured: std::sync::Mutex::new(None),
        };
        let mut state = SessionState::new_turn("recommend a strategy for At Risk");

        run(&mut state, &llm, &builtin_segment_stats()).await;

        assert_eq!(
            state.segment_narrative.as_deref(),
            Some("Prioritize Champions with loyalty offers.")
        );
        let last = state.message_log.last().expect("message");
        assert!(last.text.starts_with("[Segment Strategist]"));

        let prompt = llm.captured.lock().expect("lock").clone().expect("prompt");
        assert!(prompt.system.contains("\"Champions\""));
        assert!(prompt.user.expect("user").contains("recommend a strategy for At Risk"));
    }
}
