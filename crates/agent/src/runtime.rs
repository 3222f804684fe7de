//! The turn runtime.
//!
//! Owns the router loop: decide, dispatch, repeat until the turn completes
//! or suspends on a clarification. The runtime holds the process-wide
//! collaborators (model client, lead store, segment statistics) and hands
//! each dispatched responder a mutable view of the session state.

use std::sync::Arc;

use tracing::{info, warn};

use leadwise_core::{
    extract_chart_intent, ChartIntent, Clarification, LeadStore, LogEntry, ResponderId, Role,
    Route, Router, SessionState, TurnError,
};

use crate::llm::LlmClient;
use crate::segment::SegmentStatsList;
use crate::{analytics, catalog, content, query, segment};

pub struct TurnRuntime {
    router: Router,
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn LeadStore>,
    segment_stats: SegmentStatsList,
}

impl TurnRuntime {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn LeadStore>,
        segment_stats: SegmentStatsList,
    ) -> Self {
        Self { router: Router, llm, store, segment_stats }
    }

    /// Run a fresh turn for a user request.
    pub async fn run_request(&self, request: &str) -> Result<TurnOutcome, TurnFailure> {
        self.drive(SessionState::new_turn(request)).await
    }

    /// Resume a suspended turn with the user's clarification answer. The
    /// pipeline re-enters from its first stage with the annotated request.
    pub async fn resume(
        &self,
        suspended: SessionState,
        answer: &str,
    ) -> Result<TurnOutcome, TurnFailure> {
        self.drive(SessionState::resume(suspended, answer)).await
    }

    async fn drive(&self, mut state: SessionState) -> Result<TurnOutcome, TurnFailure> {
        while !state.turn_complete && !state.is_suspended() {
            match self.router.decide(&mut state) {
                Route::Complete => break,
                Route::Dispatch(responder) => {
                    info!(
                        responder = responder.as_str(),
                        step = state.step_count,
                        "dispatching responder"
                    );
                    if let Err(error) = self.dispatch(responder, &mut state).await {
                        warn!(responder = responder.as_str(), %error, "turn aborted");
                        return Err(TurnFailure { error, state });
                    }
                }
            }
        }

        info!(
            steps = state.step_count,
            suspended = state.is_suspended(),
            "turn finished"
        );
        Ok(TurnOutcome { state })
    }

    async fn dispatch(
        &self,
        responder: ResponderId,
        state: &mut SessionState,
    ) -> Result<(), TurnError> {
        match responder {
            ResponderId::Query => {
                query::run(state, self.llm.as_ref(), self.store.as_ref()).await?
            }
            ResponderId::Analytics => analytics::run(state, self.llm.as_ref()).await,
            ResponderId::Segment => {
                segment::run(state, self.llm.as_ref(), &self.segment_stats).await
            }
            ResponderId::Catalog => catalog::run(state, self.llm.as_ref()).await,
            ResponderId::Content => content::run(state, self.llm.as_ref()).await,
        }
        Ok(())
    }
}

/// A turn aborted by a fatal responder error. Carries the state as of the
/// failure so the caller can still render the partial message log.
#[derive(Clone, Debug)]
pub struct TurnFailure {
    pub error: TurnError,
    pub state: SessionState,
}

/// A finished or suspended turn, as handed to a presentation layer.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub state: SessionState,
}

impl TurnOutcome {
    pub fn is_suspended(&self) -> bool {
        self.state.is_suspended()
    }

    pub fn clarification(&self) -> Option<&Clarification> {
        self.state.pending_clarification.as_ref()
    }

    /// Responder entries produced during this drive, i.e. everything after
    /// the most recent user entry.
    pub fn responder_messages(&self) -> Vec<&LogEntry> {
        let start = self
            .state
            .message_log
            .iter()
            .rposition(|entry| entry.role == Role::User)
            .map(|index| index + 1)
            .unwrap_or(0);
        self.state.message_log[start..]
            .iter()
            .filter(|entry| entry.role == Role::Responder)
            .collect()
    }

    /// All responder text for this drive joined into one reply.
    pub fn rendered_reply(&self) -> String {
        self.responder_messages()
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The chart intent embedded in this drive's responder output, if any.
    pub fn chart(&self) -> Option<ChartIntent> {
        self.responder_messages()
            .iter()
            .rev()
            .find_map(|entry| extract_chart_intent(&entry.text).0)
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }
}
