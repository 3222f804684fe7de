use thiserror::Error;

use crate::store::StoreError;

/// Failures that abort a responder outright, surfaced at the turn boundary.
///
/// Everything else in the core degrades or escalates through the
/// clarification protocol instead of erroring: precondition failures are
/// reported inline, classification and validation failures suspend the
/// turn, and best-effort generation failures downgrade to placeholder
/// text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    /// A plan/generate-stage language-model call failed at the transport
    /// level. Non-critical responders never raise this; they degrade.
    #[error("language model call failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::TurnError;
    use crate::store::StoreError;

    #[test]
    fn store_errors_lift_into_turn_errors() {
        let error = TurnError::from(StoreError::Execution("no such column: Revenue".to_string()));
        assert_eq!(
            error.to_string(),
            "query execution failed: no such column: Revenue"
        );
    }
}
