//! Staff domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub Ulid);

impl StaffId {
    /// Create a new unique staff ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a staff ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Administrative eligibility of a staff member for work.
///
/// `Unknown` absorbs values this build does not recognise. It is never a
/// valid transition target and always counts as not active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    #[default]
    Active,
    OnLeave,
    Suspended,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl EmploymentStatus {
    /// Every status an operator may choose as a transition target.
    pub const SELECTABLE: [EmploymentStatus; 4] = [
        EmploymentStatus::Active,
        EmploymentStatus::OnLeave,
        EmploymentStatus::Suspended,
        EmploymentStatus::Inactive,
    ];

    /// Whether the staff member is eligible for work.
    pub fn is_active(&self) -> bool {
        matches!(self, EmploymentStatus::Active)
    }

    /// Whether this is a real status an operator can select.
    pub fn is_selectable(&self) -> bool {
        !matches!(self, EmploymentStatus::Unknown)
    }

    /// Lenient parse used for values coming from forms and query strings.
    ///
    /// Anything unrecognised maps to [`EmploymentStatus::Unknown`].
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "active" => EmploymentStatus::Active,
            "on_leave" | "onleave" => EmploymentStatus::OnLeave,
            "suspended" => EmploymentStatus::Suspended,
            "inactive" => EmploymentStatus::Inactive,
            _ => EmploymentStatus::Unknown,
        }
    }

    /// Get a simple status string for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::OnLeave => "on_leave",
            EmploymentStatus::Suspended => "suspended",
            EmploymentStatus::Inactive => "inactive",
            EmploymentStatus::Unknown => "unknown",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "Active",
            EmploymentStatus::OnLeave => "On Leave",
            EmploymentStatus::Suspended => "Suspended",
            EmploymentStatus::Inactive => "Inactive",
            EmploymentStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leave period captured when a staff member is put on leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePeriod {
    /// First day of leave.
    pub start: NaiveDate,
    /// Last day of leave, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl LeavePeriod {
    /// Open-ended leave starting on `start`.
    pub fn starting(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Leave covering `start..=end`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Whether the end date precedes the start date.
    pub fn is_inverted(&self) -> bool {
        self.end.is_some_and(|end| end < self.start)
    }
}

impl std::fmt::Display for LeavePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} to {}", self.start, end),
            None => write!(f, "from {}", self.start),
        }
    }
}

/// A member of the field workforce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Unique identifier for this staff member.
    pub id: StaffId,
    /// Display name.
    pub name: String,
    /// Job role, e.g. "Technician" or "Cleaner".
    pub role: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Current employment status.
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    /// Leave metadata from the most recent move to `OnLeave`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<LeavePeriod>,
    /// Remaining profile attributes, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
    /// When the staff member was onboarded.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StaffMember {
    /// Onboard a new, active staff member.
    pub fn new(name: impl Into<String>, role: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: StaffId::new(),
            name: name.into(),
            role: role.into(),
            email: email.into(),
            phone: None,
            employment_status: EmploymentStatus::Active,
            leave: None,
            profile: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the employment status.
    pub fn with_status(mut self, status: EmploymentStatus) -> Self {
        self.employment_status = status;
        self
    }

    /// Attach opaque profile attributes.
    pub fn with_profile(mut self, profile: serde_json::Value) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Whether the staff member may be given work.
    pub fn is_active(&self) -> bool {
        self.employment_status.is_active()
    }
}
