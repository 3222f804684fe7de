//! The plan-and-execute query pipeline.
//!
//! Five ordered stages: plan, screen, generate (re-screened), validate,
//! execute. Screening and validation failures never error out; they
//! suspend the turn through the clarification protocol so the user can
//! steer. Only a failed model call at the plan/generate stage aborts the
//! responder.

use tracing::{info, warn};

use leadwise_core::sanity::screen_response;
use leadwise_core::tabular::{markdown_preview, PREVIEW_ROWS};
use leadwise_core::validate::{extract_select_statement, validate_select};
use leadwise_core::{Clarification, LeadSchema, LeadStore, ResponderId, SessionState, TurnError};

use crate::llm::LlmClient;
use crate::prompts;

const CANNOT_ANSWER_MARKER: &str = "CANNOT_ANSWER";

pub async fn run(
    state: &mut SessionState,
    llm: &dyn LlmClient,
    store: &dyn LeadStore,
) -> Result<(), TurnError> {
    let label = ResponderId::Query.label();
    let question = state.active_request.clone();

    // Stage 1: plan.
    let plan = llm
        .complete(&prompts::plan_prompt(&question))
        .await
        .map_err(|error| TurnError::Generation(error.to_string()))?;
    let plan = plan.trim().to_string();

    // Stage 2: screen the plan before trusting it.
    if let Some(class) = screen_response(&plan) {
        warn!(class = class.as_str(), "query plan failed screening");
        state.push_responder_message(label, class.notice());
        state.suspend(class.clarification());
        return Ok(());
    }

    if plan.to_uppercase().starts_with(CANNOT_ANSWER_MARKER) {
        info!("planner declared the request unanswerable");
        state.push_responder_message(
            label,
            format!("{plan}\n\nAvailable columns: {}", LeadSchema.columns_csv()),
        );
        state.query_plan = Some(plan);
        state.complete();
        return Ok(());
    }

    // Stage 3: generate, and screen the generation too.
    let generated = llm
        .complete(&prompts::generate_prompt(&plan))
        .await
        .map_err(|error| TurnError::Generation(error.to_string()))?;

    if let Some(class) = screen_response(&generated) {
        warn!(class = class.as_str(), "generated query failed screening");
        state.push_responder_message(
            label,
            "Clarification needed\n\n\
             A valid SQL query could not be generated for this request.\n\n\
             Please try asking about:\n\
             - segment counts or distributions\n\
             - top customers by engagement\n\
             - lead source breakdown\n\
             - country/city statistics",
        );
        state.suspend(Clarification::new(
            "What would you like to query?",
            vec![
                "Show segment counts".to_string(),
                "Show top 20 Champions".to_string(),
                "Show lead sources".to_string(),
            ],
        ));
        return Ok(());
    }

    let sql = extract_select_statement(&generated);

    // Stage 4: validate the statement shape.
    if let Err(violation) = validate_select(&sql) {
        warn!(%violation, "generated query rejected by validation");
        state.push_responder_message(
            label,
            format!(
                "SQL validation failed: {violation}\n\n\
                 Attempted SQL:\n```sql\n{sql}\n```\n\n\
                 Would you like to try a simpler query?"
            ),
        );
        state.query_plan = Some(plan);
        state.query_text = Some(sql);
        state.query_validation_error = Some(violation.to_string());
        state.suspend(Clarification::new(
            "Try a simpler query?",
            vec![
                "Show all segments".to_string(),
                "Show top 10 customers".to_string(),
                "Cancel".to_string(),
            ],
        ));
        return Ok(());
    }

    // Stage 5: execute. Storage failures are recoverable; the user gets
    // retry options instead of an aborted turn.
    match store.select(&sql).await {
        Ok(rows) if rows.is_empty() => {
            info!(sql = %sql, "query returned no rows");
            state.push_responder_message(
                label,
                format!("Plan: {plan}\n\nSQL:\n```sql\n{sql}\n```\n\nResult: no data found."),
            );
            state.query_plan = Some(plan);
            state.query_text = Some(sql);
        }
        Ok(rows) => {
            info!(sql = %sql, rows = rows.len(), "query executed");
            state.push_responder_message(
                label,
                format!(
                    "Plan: {plan}\n\nSQL:\n```sql\n{sql}\n```\n\n\
                     Data retrieved: {count} rows\n\n{preview}",
                    count = rows.len(),
                    preview = markdown_preview(&rows, PREVIEW_ROWS),
                ),
            );
            state.query_plan = Some(plan);
            state.query_text = Some(sql);
            state.record_rows(rows);
        }
        Err(error) => {
            warn!(sql = %sql, %error, "query execution failed");
            state.push_responder_message(
                label,
                format!(
                    "Plan: {plan}\n\nSQL:\n```sql\n{sql}\n```\n\n\
                     Execution error: {error}\n\nWould you like to try a different query?"
                ),
            );
            state.query_plan = Some(plan);
            state.query_text = Some(sql);
            state.suspend(Clarification::new(
                "Query failed. Try another?",
                vec![
                    "Show segment counts".to_string(),
                    "Show top customers".to_string(),
                    "Cancel".to_string(),
                ],
            ));
        }
    }

    Ok(())
}
