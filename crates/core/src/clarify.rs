//! Clarification records for the human-in-the-loop suspend/resume protocol.

use serde::{Deserialize, Serialize};

/// A question the pipeline needs answered before it can continue, together
/// with a finite set of suggested answers. While one of these is pending the
/// turn is suspended, not terminated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clarification {
    pub question: String,
    pub options: Vec<String>,
}

impl Clarification {
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        Self { question: question.into(), options }
    }
}
