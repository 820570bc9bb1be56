//! Persistence layer modules.

pub mod db;
pub mod offer_repo;
pub mod report_repo;
pub mod schema;
pub mod state_store;
pub mod task_repo;
pub mod task_type_repo;
pub mod user_repo;
pub mod worker_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
