//! Booking repository for CRUD and assignment operations.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::sql::Thing;
use workforce_core::{Booking, BookingId, BookingStatus, StaffId};

use super::record_key;
use crate::{DbError, StaffRepository, get_db};

/// Repository for booking persistence operations.
pub struct BookingRepository;

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct BookingRecord {
    #[serde(default)]
    id: Option<Thing>,
    reference: String,
    #[serde(default)]
    service: String,
    status: BookingStatus,
    scheduled_date: NaiveDate,
    #[serde(default)]
    start_time: Option<NaiveTime>,
    #[serde(default)]
    assigned_staff_id: Option<StaffId>,
}

impl BookingRecord {
    fn into_booking(self, booking_id: BookingId) -> Booking {
        Booking {
            id: booking_id,
            reference: self.reference,
            service: self.service,
            status: self.status,
            scheduled_date: self.scheduled_date,
            time: self.start_time,
            assigned_staff_id: self.assigned_staff_id,
        }
    }

    fn into_booking_with_key(self) -> Result<Booking, DbError> {
        let key = record_key(self.id.as_ref())?;
        let booking_id = BookingId::parse(&key)
            .map_err(|e| DbError::Serialization(format!("Bad booking id {}: {}", key, e)))?;
        Ok(self.into_booking(booking_id))
    }
}

/// Struct for creating bookings.
#[derive(Debug, Clone, Serialize)]
struct BookingCreate {
    reference: String,
    service: String,
    status: BookingStatus,
    scheduled_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_staff_id: Option<StaffId>,
}

/// Filter options for listing bookings.
#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub staff_id: Option<StaffId>,
    pub status: Option<BookingStatus>,
    /// Only bookings on or after this date.
    pub from: Option<NaiveDate>,
    /// Only bookings on or before this date.
    pub until: Option<NaiveDate>,
    /// Only bookings with no staff member.
    pub unassigned_only: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl BookingRepository {
    /// Create a new booking in the database.
    pub async fn create(booking: &Booking) -> Result<Booking, DbError> {
        let db = get_db()?;

        let create_data = BookingCreate {
            reference: booking.reference.clone(),
            service: booking.service.clone(),
            status: booking.status,
            scheduled_date: booking.scheduled_date,
            start_time: booking.time,
            assigned_staff_id: booking.assigned_staff_id,
        };

        let record: Option<BookingRecord> = db
            .create(("booking", booking.id.to_string()))
            .content(create_data)
            .await?;

        record
            .map(|r| r.into_booking(booking.id))
            .ok_or_else(|| DbError::Query("Failed to create booking".into()))
    }

    /// Get a booking by ID.
    pub async fn get(id: BookingId) -> Result<Booking, DbError> {
        let db = get_db()?;

        let record: Option<BookingRecord> = db.select(("booking", id.to_string())).await?;

        record
            .map(|r| r.into_booking(id))
            .ok_or_else(|| DbError::NotFound(format!("Booking not found: {}", id)))
    }

    /// List bookings with optional filtering, earliest first.
    pub async fn list(filter: BookingFilter) -> Result<Vec<Booking>, DbError> {
        let db = get_db()?;

        let mut conditions = Vec::new();
        let mut bindings: Vec<(&str, serde_json::Value)> = Vec::new();

        if let Some(staff_id) = &filter.staff_id {
            conditions.push("assigned_staff_id = $staff_id");
            bindings.push(("staff_id", serde_json::json!(staff_id.to_string())));
        }

        if let Some(status) = &filter.status {
            conditions.push("status = $status");
            bindings.push(("status", serde_json::json!(status.as_str())));
        }

        if let Some(from) = &filter.from {
            conditions.push("scheduled_date >= $from");
            bindings.push(("from", serde_json::json!(from.to_string())));
        }

        if let Some(until) = &filter.until {
            conditions.push("scheduled_date <= $until");
            bindings.push(("until", serde_json::json!(until.to_string())));
        }

        if filter.unassigned_only {
            conditions.push("assigned_staff_id IS NONE");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit_clause = filter
            .limit
            .map(|l| format!("LIMIT {}", l))
            .unwrap_or_default();

        let offset_clause = filter
            .offset
            .map(|o| format!("START {}", o))
            .unwrap_or_default();

        let query = format!(
            "SELECT * FROM booking {} ORDER BY scheduled_date ASC, start_time ASC {} {}",
            where_clause, limit_clause, offset_clause
        );

        let mut result = db.query(&query);

        for (name, value) in bindings {
            result = result.bind((name, value));
        }

        let mut response = result.await?;
        let records: Vec<BookingRecord> = response.take(0)?;

        records
            .into_iter()
            .map(BookingRecord::into_booking_with_key)
            .collect()
    }

    /// Current and future bookings assigned to a staff member.
    ///
    /// In-progress bookings are included whatever their date.
    pub async fn for_staff(staff_id: StaffId, from: NaiveDate) -> Result<Vec<Booking>, DbError> {
        let db = get_db()?;

        let mut result = db
            .query(
                r#"
                SELECT * FROM booking
                WHERE assigned_staff_id = $staff_id
                    AND (status = "in_progress" OR scheduled_date >= $from)
                ORDER BY scheduled_date ASC, start_time ASC
                "#,
            )
            .bind(("staff_id", staff_id.to_string()))
            .bind(("from", from.to_string()))
            .await?;

        let records: Vec<BookingRecord> = result.take(0)?;

        records
            .into_iter()
            .map(BookingRecord::into_booking_with_key)
            .collect()
    }

    /// Assign a booking to an active staff member.
    ///
    /// The status check and the write are one statement, so a staff member
    /// leaving active concurrently cannot end up with a new booking.
    pub async fn assign(id: BookingId, staff_id: StaffId) -> Result<Booking, DbError> {
        let db = get_db()?;

        if !StaffRepository::exists(staff_id).await? {
            return Err(DbError::NotFound(format!("Staff not found: {}", staff_id)));
        }

        let mut result = db
            .query(
                r#"
                UPDATE type::thing('booking', $id)
                SET assigned_staff_id = $staff_id, updated_at = time::now()
                WHERE $staff.employment_status = "active"
                RETURN AFTER
                "#,
            )
            .bind(("id", id.to_string()))
            .bind(("staff_id", staff_id.to_string()))
            .bind((
                "staff",
                RecordId::from_table_key("staff", staff_id.to_string()),
            ))
            .await?;

        let records: Vec<BookingRecord> = result.take(0)?;
        if let Some(record) = records.into_iter().next() {
            return Ok(record.into_booking(id));
        }

        // Nothing written: either the booking is missing or the staff member
        // is not active.
        Self::get(id).await?;
        let staff = StaffRepository::get(staff_id).await?;
        Err(DbError::Query(format!(
            "Staff {} is {} and cannot take bookings",
            staff_id, staff.employment_status
        )))
    }

    /// Clear a booking's staff assignment.
    pub async fn unassign(id: BookingId) -> Result<Booking, DbError> {
        Self::set_assignment(id, None).await
    }

    async fn set_assignment(id: BookingId, staff_id: Option<StaffId>) -> Result<Booking, DbError> {
        let db = get_db()?;

        let mut result = db
            .query(
                "UPDATE type::thing('booking', $id) \
                 SET assigned_staff_id = $staff_id, updated_at = time::now() RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("staff_id", staff_id.map(|s| s.to_string())))
            .await?;

        let records: Vec<BookingRecord> = result.take(0)?;

        records
            .into_iter()
            .next()
            .map(|r| r.into_booking(id))
            .ok_or_else(|| DbError::NotFound(format!("Booking not found: {}", id)))
    }

    /// Update a booking's status.
    pub async fn update_status(id: BookingId, status: BookingStatus) -> Result<Booking, DbError> {
        let db = get_db()?;

        let mut result = db
            .query(
                "UPDATE type::thing('booking', $id) \
                 SET status = $status, updated_at = time::now() RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("status", status))
            .await?;

        let records: Vec<BookingRecord> = result.take(0)?;

        records
            .into_iter()
            .next()
            .map(|r| r.into_booking(id))
            .ok_or_else(|| DbError::NotFound(format!("Booking not found: {}", id)))
    }

    /// Delete a booking.
    pub async fn delete(id: BookingId) -> Result<(), DbError> {
        let db = get_db()?;

        let _: Option<BookingRecord> = db.delete(("booking", id.to_string())).await?;

        Ok(())
    }
}
