//! The data-store boundary.
//!
//! The pipeline only ever issues validated read-only `SELECT` statements;
//! implementations decode whatever projection the query produced into
//! uniform JSON rows.

use async_trait::async_trait;
use thiserror::Error;

use crate::session::Row;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The statement was rejected or failed at the storage layer. Reported
    /// to the user as a recoverable failure with the option to retry.
    #[error("query execution failed: {0}")]
    Execution(String),
    #[error("could not decode result row: {0}")]
    Decode(String),
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Execute a validated read-only statement. An empty result set is a
    /// normal outcome, not an error.
    async fn select(&self, sql: &str) -> Result<Vec<Row>, StoreError>;
}
