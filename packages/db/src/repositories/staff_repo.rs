//! Staff repository for CRUD operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use workforce_core::{EmploymentStatus, LeavePeriod, StaffId, StaffMember};

use super::record_key;
use crate::{DbError, get_db};

/// Repository for staff persistence operations.
///
/// Employment status is only written at creation and by
/// [`TransitionStore`](crate::TransitionStore); profile updates leave it alone.
pub struct StaffRepository;

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct StaffRecord {
    #[serde(default)]
    id: Option<Thing>,
    name: String,
    role: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    employment_status: EmploymentStatus,
    #[serde(default)]
    leave_start: Option<NaiveDate>,
    #[serde(default)]
    leave_end: Option<NaiveDate>,
    #[serde(default)]
    profile: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StaffRecord {
    fn into_staff(self, staff_id: StaffId) -> StaffMember {
        StaffMember {
            id: staff_id,
            name: self.name,
            role: self.role,
            email: self.email,
            phone: self.phone,
            employment_status: self.employment_status,
            leave: self.leave_start.map(|start| LeavePeriod {
                start,
                end: self.leave_end,
            }),
            profile: self.profile,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn into_staff_with_key(self) -> Result<StaffMember, DbError> {
        let key = record_key(self.id.as_ref())?;
        let staff_id = StaffId::parse(&key)
            .map_err(|e| DbError::Serialization(format!("Bad staff id {}: {}", key, e)))?;
        Ok(self.into_staff(staff_id))
    }
}

/// Struct for creating staff - omits datetime fields to use SurrealDB defaults.
#[derive(Debug, Clone, Serialize)]
struct StaffCreate {
    name: String,
    role: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    employment_status: EmploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    leave_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    leave_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<serde_json::Value>,
}

/// One committed employment-status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub staff_id: String,
    pub from_status: EmploymentStatus,
    pub to_status: EmploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_end: Option<NaiveDate>,
    /// Bookings the change unassigned.
    #[serde(default)]
    pub bookings: Vec<String>,
    pub requested_at: String,
    #[serde(default, skip_serializing)]
    pub committed_at: Option<DateTime<Utc>>,
}

impl StaffRepository {
    /// Create a new staff member in the database.
    pub async fn create(staff: &StaffMember) -> Result<StaffMember, DbError> {
        let db = get_db()?;

        let create_data = StaffCreate {
            name: staff.name.clone(),
            role: staff.role.clone(),
            email: staff.email.clone(),
            phone: staff.phone.clone(),
            employment_status: staff.employment_status,
            leave_start: staff.leave.map(|l| l.start),
            leave_end: staff.leave.and_then(|l| l.end),
            profile: staff.profile.clone(),
        };

        let record: Option<StaffRecord> = db
            .create(("staff", staff.id.to_string()))
            .content(create_data)
            .await?;

        record
            .map(|r| r.into_staff(staff.id))
            .ok_or_else(|| DbError::Query("Failed to create staff member".into()))
    }

    /// Get a staff member by ID.
    pub async fn get(id: StaffId) -> Result<StaffMember, DbError> {
        let db = get_db()?;

        let record: Option<StaffRecord> = db.select(("staff", id.to_string())).await?;

        record
            .map(|r| r.into_staff(id))
            .ok_or_else(|| DbError::NotFound(format!("Staff not found: {}", id)))
    }

    /// List all staff members ordered by name.
    pub async fn list() -> Result<Vec<StaffMember>, DbError> {
        let db = get_db()?;

        let mut result = db.query("SELECT * FROM staff ORDER BY name ASC").await?;
        let records: Vec<StaffRecord> = result.take(0)?;

        records
            .into_iter()
            .map(StaffRecord::into_staff_with_key)
            .collect()
    }

    /// List staff members with the given employment status.
    pub async fn list_by_status(status: EmploymentStatus) -> Result<Vec<StaffMember>, DbError> {
        let db = get_db()?;

        let mut result = db
            .query("SELECT * FROM staff WHERE employment_status = $status ORDER BY name ASC")
            .bind(("status", status))
            .await?;

        let records: Vec<StaffRecord> = result.take(0)?;

        records
            .into_iter()
            .map(StaffRecord::into_staff_with_key)
            .collect()
    }

    /// Update contact and profile details.
    pub async fn update_profile(staff: &StaffMember) -> Result<StaffMember, DbError> {
        let db = get_db()?;

        let mut result = db
            .query(
                "UPDATE type::thing('staff', $id) \
                 SET name = $name, role = $role, email = $email, phone = $phone, \
                 profile = $profile, updated_at = time::now() RETURN AFTER",
            )
            .bind(("id", staff.id.to_string()))
            .bind(("name", staff.name.clone()))
            .bind(("role", staff.role.clone()))
            .bind(("email", staff.email.clone()))
            .bind(("phone", staff.phone.clone()))
            .bind(("profile", staff.profile.clone()))
            .await?;

        let records: Vec<StaffRecord> = result.take(0)?;

        records
            .into_iter()
            .next()
            .map(|r| r.into_staff(staff.id))
            .ok_or_else(|| DbError::NotFound(format!("Staff not found: {}", staff.id)))
    }

    /// Delete a staff member.
    pub async fn delete(id: StaffId) -> Result<(), DbError> {
        let db = get_db()?;

        let _: Option<StaffRecord> = db.delete(("staff", id.to_string())).await?;

        Ok(())
    }

    /// Check if a staff member exists.
    pub async fn exists(id: StaffId) -> Result<bool, DbError> {
        let db = get_db()?;

        let record: Option<StaffRecord> = db.select(("staff", id.to_string())).await?;

        Ok(record.is_some())
    }

    /// Committed status changes for a staff member, oldest first.
    pub async fn history(id: StaffId) -> Result<Vec<StatusHistoryEntry>, DbError> {
        let db = get_db()?;

        let mut result = db
            .query(
                "SELECT * FROM staff_status_history \
                 WHERE staff_id = $staff_id ORDER BY committed_at ASC",
            )
            .bind(("staff_id", id.to_string()))
            .await?;

        Ok(result.take(0)?)
    }
}
