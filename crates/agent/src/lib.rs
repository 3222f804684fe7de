//! Responder runtime - the orchestration loop over the shared session state.
//!
//! This crate drives one user turn end to end:
//! - **Routing** - the rule-based router picks the next responder
//! - **Query pipeline** (`query`) - plan, screen, generate, validate, execute
//! - **Specialist responders** - analytics, segment strategy, catalog, content
//! - **Language model access** (`llm`) - pluggable trait for OpenAI/Anthropic/Ollama
//!
//! # Key Types
//!
//! - `TurnRuntime` - main orchestrator (see `runtime` module)
//! - `LlmClient` - the model boundary, swapped for scripted fakes in tests
//! - `TurnOutcome` - the finished or suspended state handed to a front end
//!
//! # Safety Principle
//!
//! The language model drafts text and SQL; it never decides control flow.
//! Routing, validation, and the clarification protocol are deterministic,
//! and every model response is screened before it is trusted.

pub mod analytics;
pub mod catalog;
pub mod content;
pub mod llm;
pub mod prompts;
pub mod query;
pub mod runtime;
pub mod segment;

pub use llm::{HttpLlmClient, LlmClient, LlmError, Prompt};
pub use runtime::{TurnFailure, TurnOutcome, TurnRuntime};
pub use segment::{builtin_segment_stats, load_segment_stats, SegmentStats, SegmentStatsList};
