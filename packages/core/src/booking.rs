//! Booking types as seen by the workforce engine.
//!
//! Bookings are owned by the booking subsystem. The engine only reads them
//! and asks for assignments to be cleared.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::StaffId;

/// Unique identifier for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub Ulid);

impl BookingId {
    /// Create a new unique booking ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a booking ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Completed and cancelled bookings are history.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Get a simple status string for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer booking that a staff member may be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier for this booking.
    pub id: BookingId,
    /// Human-facing booking number, e.g. `BK-1042`.
    pub reference: String,
    /// Service being delivered.
    #[serde(default)]
    pub service: String,
    /// Current status.
    pub status: BookingStatus,
    /// Day the work is scheduled for.
    pub scheduled_date: NaiveDate,
    /// Start time, when one was agreed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Assigned staff member, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff_id: Option<StaffId>,
}

impl Booking {
    /// Create a scheduled, unassigned booking.
    pub fn new(reference: impl Into<String>, scheduled_date: NaiveDate) -> Self {
        Self {
            id: BookingId::new(),
            reference: reference.into(),
            service: String::new(),
            status: BookingStatus::Scheduled,
            scheduled_date,
            time: None,
            assigned_staff_id: None,
        }
    }

    /// Set the service description.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the start time.
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Assign the booking to a staff member.
    pub fn assigned_to(mut self, staff_id: StaffId) -> Self {
        self.assigned_staff_id = Some(staff_id);
        self
    }

    /// Whether the booking is assigned to `staff_id`.
    pub fn is_assigned_to(&self, staff_id: StaffId) -> bool {
        self.assigned_staff_id == Some(staff_id)
    }

    /// Start time formatted for operator messages.
    pub fn time_label(&self) -> String {
        self.time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "no set time".to_string())
    }
}
