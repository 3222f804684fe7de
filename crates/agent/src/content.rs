//! The content writer responder.
//!
//! Drafts a marketing email from whatever the turn has already gathered:
//! the queried lead list (for audience size and segment) and the catalog
//! sheet (for product facts). Always terminal for the turn.

use tracing::warn;

use leadwise_core::{ResponderId, Row, SessionState};

use crate::llm::LlmClient;
use crate::prompts;

const FALLBACK_PRODUCT_INFO: &str = "Learning Labs Pro - Professional development platform \
for career advancement with hands-on labs, portfolio building, and certifications.";

fn audience_summary(rows: Option<&Vec<Row>>) -> String {
    match rows {
        Some(rows) if !rows.is_empty() => {
            let segment = rows[0]
                .get("Segment")
                .and_then(|value| value.as_str())
                .unwrap_or("Targeted prospects");
            format!("Sending to {} leads in segment: {segment}", rows.len())
        }
        Some(_) => "Targeted lead list".to_string(),
        None => "General prospect list".to_string(),
    }
}

pub async fn run(state: &mut SessionState, llm: &dyn LlmClient) {
    let label = ResponderId::Content.label();

    let leads_info = audience_summary(state.tabular_result.as_ref());
    let product_info =
        state.catalog_text.clone().unwrap_or_else(|| FALLBACK_PRODUCT_INFO.to_string());

    let draft = match llm
        .complete(&prompts::content_prompt(&leads_info, &product_info, &state.original_request))
        .await
    {
        Ok(text) => text,
        Err(error) => {
            warn!(%error, "email draft generation unavailable");
            format!(
                "An email draft could not be generated right now.\n\n\
                 Audience: {leads_info}\nProduct: {}",
                crate::catalog::PRODUCT_NAME
            )
        }
    };

    state.push_responder_message(label, &draft);
    state.content_draft = Some(draft);
    state.complete();
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use leadwise_core::{Row, SessionState};

    use super::{audience_summary, run};
    use crate::llm::{LlmClient, LlmError, Prompt};

    struct CapturingLlm {
        captured: Mutex<Option<Prompt>>,
    }

    #[async_trait]
    impl LlmClient for CapturingLlm {
        async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
            *self.captured.lock().expect("lock") = Some(prompt.clone());
            Ok("Subject: Welcome back!\n\nBody...".to_string())
        }
    }

    fn champion_row(id: i64) -> Row {
        let mut row = Row::new();
        row.insert("customer_id".to_string(), serde_json::json!(id));
        row.insert("Segment".to_string(), serde_json::json!("Champions"));
        row
    }

    #[test]
    fn audience_summary_reflects_rows_and_segment() {
        assert_eq!(audience_summary(None), "General prospect list");
        assert_eq!(audience_summary(Some(&vec![])), "Targeted lead list");
        let rows = vec![champion_row(1), champion_row(2)];
        assert_eq!(audience_summary(Some(&rows)), "Sending to 2 leads in segment: Champions");
    }

    #[tokio::test]
    async fn draft_uses_catalog_sheet_and_completes_the_turn() {
        let llm = CapturingLlm { captured: Mutex::new(None) };
        let mut state = SessionState::new_turn("write an email for the champions");
        state.record_rows(vec![champion_row(1)]);
        state.catalog_text = Some("Product: Learning Labs Pro\nPricing: $149/month".to_string());

        run(&mut state, &llm).await;

        assert!(state.turn_complete);
        assert!(state.content_draft.as_deref().expect("draft").starts_with("Subject:"));
        let last = state.message_log.last().expect("message");
        assert!(last.text.starts_with("[Content Writer]"));

        let prompt = llm.captured.lock().expect("lock").clone().expect("prompt");
        assert!(prompt.system.contains("Sending to 1 leads in segment: Champions"));
        assert!(prompt.system.contains("$149/month"));
        assert!(prompt.user.expect("user").contains("write an email for the champions"));
    }
}
