//! Database schema definitions using SurrealQL.

use crate::{DbError, get_db};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes.
pub async fn init_schema() -> Result<(), DbError> {
    let db = get_db()?;

    tracing::info!("Initializing database schema...");

    db.query(STAFF_SCHEMA).await?.check()?;
    db.query(BOOKING_SCHEMA).await?.check()?;
    db.query(STATUS_HISTORY_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Staff table schema.
const STAFF_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS staff SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS name ON staff TYPE string;
DEFINE FIELD IF NOT EXISTS role ON staff TYPE string;
DEFINE FIELD IF NOT EXISTS email ON staff TYPE string;
DEFINE FIELD IF NOT EXISTS phone ON staff TYPE option<string>;
DEFINE FIELD IF NOT EXISTS employment_status ON staff TYPE string DEFAULT "active";
DEFINE FIELD IF NOT EXISTS leave_start ON staff TYPE option<string>;
DEFINE FIELD IF NOT EXISTS leave_end ON staff TYPE option<string>;
DEFINE FIELD IF NOT EXISTS profile ON staff FLEXIBLE TYPE option<object>;
DEFINE FIELD IF NOT EXISTS created_at ON staff TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON staff TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS staff_email ON staff FIELDS email UNIQUE;
DEFINE INDEX IF NOT EXISTS staff_status ON staff FIELDS employment_status;
"#;

/// Booking table schema.
///
/// Dates and times are ISO strings so they order lexically.
const BOOKING_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS booking SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS reference ON booking TYPE string;
DEFINE FIELD IF NOT EXISTS service ON booking TYPE string DEFAULT "";
DEFINE FIELD IF NOT EXISTS status ON booking TYPE string DEFAULT "scheduled";
DEFINE FIELD IF NOT EXISTS scheduled_date ON booking TYPE string;
DEFINE FIELD IF NOT EXISTS start_time ON booking TYPE option<string>;
DEFINE FIELD IF NOT EXISTS assigned_staff_id ON booking TYPE option<string>;
DEFINE FIELD IF NOT EXISTS updated_at ON booking TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS booking_reference ON booking FIELDS reference UNIQUE;
DEFINE INDEX IF NOT EXISTS booking_staff ON booking FIELDS assigned_staff_id;
DEFINE INDEX IF NOT EXISTS booking_status ON booking FIELDS status;
DEFINE INDEX IF NOT EXISTS booking_date ON booking FIELDS scheduled_date;
"#;

/// Audit trail of committed employment-status changes.
const STATUS_HISTORY_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS staff_status_history SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS staff_id ON staff_status_history TYPE string;
DEFINE FIELD IF NOT EXISTS from_status ON staff_status_history TYPE string;
DEFINE FIELD IF NOT EXISTS to_status ON staff_status_history TYPE string;
DEFINE FIELD IF NOT EXISTS leave_start ON staff_status_history TYPE option<string>;
DEFINE FIELD IF NOT EXISTS leave_end ON staff_status_history TYPE option<string>;
DEFINE FIELD IF NOT EXISTS bookings ON staff_status_history TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS requested_at ON staff_status_history TYPE string;
DEFINE FIELD IF NOT EXISTS committed_at ON staff_status_history TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS history_staff ON staff_status_history FIELDS staff_id;
DEFINE INDEX IF NOT EXISTS history_committed ON staff_status_history FIELDS committed_at;
"#;
