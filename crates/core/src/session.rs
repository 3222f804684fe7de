//! Shared per-turn session state.
//!
//! One `SessionState` is created per user turn, threaded through every
//! responder the router dispatches, and discarded once the turn completes.
//! A clarification resume starts a fresh turn that carries forward only the
//! accumulated message log and the annotated request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::clarify::Clarification;
use crate::router::{ResponderId, Route};

/// One result row, as a uniform-keyed JSON record.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Responder,
}

/// A role-tagged entry in the append-only message log. Insertion order is
/// meaningful and rendered verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub role: Role,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub message_log: Vec<LogEntry>,
    /// The user's request exactly as supplied at the start of the turn.
    pub original_request: String,
    /// The working request: equal to `original_request` for a fresh turn,
    /// or the clarification-annotated form after a resume. Set once per
    /// turn, read-only thereafter.
    pub active_request: String,
    pub next_responder: Option<Route>,
    pub completed_responders: BTreeSet<ResponderId>,
    pub step_count: u32,
    pub tabular_result: Option<Vec<Row>>,
    pub catalog_text: Option<String>,
    pub segment_narrative: Option<String>,
    pub content_draft: Option<String>,
    pub query_plan: Option<String>,
    pub query_text: Option<String>,
    pub query_validation_error: Option<String>,
    pub wants_visualization: bool,
    pub pending_clarification: Option<Clarification>,
    pub turn_complete: bool,
}

impl SessionState {
    /// Start a fresh turn for a new user request.
    pub fn new_turn(request: impl Into<String>) -> Self {
        let request = request.into();
        let mut state = Self {
            original_request: request.clone(),
            active_request: request.clone(),
            ..Self::default()
        };
        state.message_log.push(LogEntry { role: Role::User, text: request });
        state
    }

    /// Resume a suspended turn with the user's chosen clarification. The
    /// prior message log is preserved; the working request becomes the
    /// original request annotated with the answer, and the pipeline will
    /// re-enter from its first stage.
    pub fn resume(suspended: SessionState, answer: &str) -> Self {
        let mut state = Self {
            message_log: suspended.message_log,
            original_request: suspended.original_request.clone(),
            active_request: format!(
                "{} (User clarified: {answer})",
                suspended.original_request
            ),
            ..Self::default()
        };
        state.message_log.push(LogEntry { role: Role::User, text: answer.to_string() });
        state
    }

    pub fn push_responder_message(&mut self, label: &str, text: impl AsRef<str>) {
        self.message_log
            .push(LogEntry { role: Role::Responder, text: format!("[{label}]\n{}", text.as_ref()) });
    }

    /// Record the query pipeline's rows. The tabular result is written at
    /// most once per turn; later responders only read it.
    pub fn record_rows(&mut self, rows: Vec<Row>) {
        if self.tabular_result.is_none() {
            self.tabular_result = Some(rows);
        }
    }

    /// Suspend the turn pending a clarification answer.
    pub fn suspend(&mut self, clarification: Clarification) {
        self.pending_clarification = Some(clarification);
        self.turn_complete = false;
    }

    pub fn complete(&mut self) {
        self.turn_complete = true;
        self.pending_clarification = None;
    }

    pub fn is_suspended(&self) -> bool {
        self.pending_clarification.is_some()
    }

    pub fn has_completed(&self, responder: ResponderId) -> bool {
        self.completed_responders.contains(&responder)
    }
}
