//! SurrealDB integration for the workforce status engine.
//!
//! This crate provides database connectivity, repositories for staff and
//! bookings, and [`TransitionStore`], which applies employment-status changes
//! atomically and implements the storage interfaces from `workforce_core`.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
pub mod repositories;
mod schema;
mod transition_store;

pub use connection::{Database, DbConfig, DbError, get_db, init_db};
pub use repositories::{BookingRepository, StaffRepository};
pub use schema::init_schema;
pub use transition_store::TransitionStore;

/// Initialize the database with the given configuration.
///
/// This should be called once at application startup.
pub async fn init(config: DbConfig) -> Result<(), DbError> {
    init_db(config).await?;
    init_schema().await?;
    Ok(())
}
