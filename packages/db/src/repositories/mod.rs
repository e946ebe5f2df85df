//! Repository implementations for database operations.

mod booking_repo;
mod staff_repo;

pub use booking_repo::{BookingFilter, BookingRepository};
pub use staff_repo::{StaffRepository, StatusHistoryEntry};

use surrealdb::sql::Thing;

use crate::DbError;

/// Raw key of a SurrealDB record id, e.g. the ULID in `staff:01J...`.
fn record_key(id: Option<&Thing>) -> Result<String, DbError> {
    id.map(|t| t.id.to_raw())
        .ok_or_else(|| DbError::Serialization("Record is missing its id".into()))
}
