pub mod connection;
pub mod fixtures;
pub mod leads;
pub mod migrations;

pub use connection::{connect, DbPool};
pub use fixtures::seed_demo_leads;
pub use leads::SqlLeadStore;
