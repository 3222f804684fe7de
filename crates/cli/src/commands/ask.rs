use std::sync::Arc;

use serde::Serialize;

use leadwise_agent::{load_segment_stats, HttpLlmClient, TurnFailure, TurnOutcome, TurnRuntime};
use leadwise_core::config::{AppConfig, LoadOptions, LogFormat};
use leadwise_core::ChartIntent;
use leadwise_db::{connect, migrations, SqlLeadStore};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct AskClarification {
    question: String,
    options: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AskOutput {
    status: &'static str,
    reply: String,
    clarification: Option<AskClarification>,
    plan: Option<String>,
    sql: Option<String>,
    chart: Option<ChartIntent>,
}

pub fn run(request: &str, clarify: Option<&str>, json: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let llm = HttpLlmClient::new(config.llm.clone())
            .map_err(|error| ("llm_init", error.to_string(), 6u8))?;
        let store = SqlLeadStore::new(pool.clone());
        let stats = load_segment_stats(config.data.segment_stats_path.as_deref());
        let turns = TurnRuntime::new(Arc::new(llm), Arc::new(store), stats);

        let mut outcome = turns
            .run_request(request)
            .await
            .map_err(|failure| ("turn_execution", describe_failure(failure), 7u8))?;

        if outcome.is_suspended() {
            if let Some(answer) = clarify {
                outcome = turns
                    .resume(outcome.into_state(), answer)
                    .await
                    .map_err(|failure| ("turn_execution", describe_failure(failure), 7u8))?;
            }
        }

        pool.close().await;
        Ok::<TurnOutcome, (&'static str, String, u8)>(outcome)
    });

    match result {
        Ok(outcome) => {
            let output = if json { render_json(&outcome) } else { render_human(&outcome) };
            CommandResult { exit_code: 0, output }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}

fn describe_failure(failure: TurnFailure) -> String {
    let partial = TurnOutcome { state: failure.state }.rendered_reply();
    if partial.is_empty() {
        failure.error.to_string()
    } else {
        format!("{}; partial transcript:\n{partial}", failure.error)
    }
}

fn init_logging(config: &AppConfig) {
    let level =
        config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(level);
    // A prior init (e.g. in tests) is not an error for a one-shot command.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

fn render_human(outcome: &TurnOutcome) -> String {
    let mut output = outcome.rendered_reply();

    if let Some(clarification) = outcome.clarification() {
        output.push_str(&format!("\n\nClarification needed: {}", clarification.question));
        for option in &clarification.options {
            output.push_str(&format!("\n  - {option}"));
        }
        output.push_str("\n(re-run with --clarify \"<answer>\" to continue)");
    }

    output
}

fn render_json(outcome: &TurnOutcome) -> String {
    let clarification = outcome.clarification().map(|clarification| AskClarification {
        question: clarification.question.clone(),
        options: clarification.options.clone(),
    });

    let payload = AskOutput {
        status: if outcome.is_suspended() { "needs_clarification" } else { "complete" },
        reply: outcome.rendered_reply(),
        clarification,
        plan: outcome.state.query_plan.clone(),
        sql: outcome.state.query_text.clone(),
        chart: outcome.chart(),
    };

    serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"status\":\"error\",\"reply\":\"serialization failed: {}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use leadwise_agent::TurnOutcome;
    use leadwise_core::{Clarification, SessionState};

    use super::{render_human, render_json};

    fn suspended_outcome() -> TurnOutcome {
        let mut state = SessionState::new_turn("show me the champions");
        state.push_responder_message("Query Pipeline", "Clarification needed");
        state.suspend(Clarification::new(
            "Which 'Champions' did you mean?",
            vec!["Champions customer segment".to_string()],
        ));
        TurnOutcome { state }
    }

    #[test]
    fn human_output_lists_clarification_options() {
        let output = render_human(&suspended_outcome());
        assert!(output.contains("Which 'Champions' did you mean?"));
        assert!(output.contains("- Champions customer segment"));
        assert!(output.contains("--clarify"));
    }

    #[test]
    fn json_output_reports_suspension_status() {
        let output = render_json(&suspended_outcome());
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(parsed["status"], "needs_clarification");
        assert_eq!(parsed["clarification"]["question"], "Which 'Champions' did you mean?");
        assert!(parsed["chart"].is_null());
    }
}
