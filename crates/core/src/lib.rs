pub mod chart;
pub mod clarify;
pub mod config;
pub mod errors;
pub mod router;
pub mod sanity;
pub mod schema;
pub mod session;
pub mod store;
pub mod tabular;
pub mod validate;

pub use chart::{extract_chart_intent, ChartIntent, ChartKind};
pub use clarify::Clarification;
pub use errors::TurnError;
pub use router::{Route, ResponderId, Router, MAX_STEPS};
pub use sanity::{screen_response, FailureClass};
pub use schema::LeadSchema;
pub use session::{LogEntry, Role, Row, SessionState};
pub use store::{LeadStore, StoreError};
pub use validate::{extract_select_statement, validate_select, SqlRuleViolation};
