//! Work-status derivation.
//!
//! Work status is never stored. It is recomputed from the employment status
//! and the booking snapshot every time it is read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Booking, BookingId, BookingStatus, EmploymentStatus};

/// Real-time availability of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// Active with nothing in progress or coming up.
    Available,
    /// Active with an upcoming scheduled booking.
    Assigned,
    /// Active and currently working a booking.
    OnJob,
    /// Not eligible for work.
    Offline,
}

impl WorkStatus {
    /// Get a simple status string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Available => "available",
            WorkStatus::Assigned => "assigned",
            WorkStatus::OnJob => "on_job",
            WorkStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived work status plus the context shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkStatusReport {
    pub status: WorkStatus,
    pub context: String,
    /// Booking that decided the status, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingId>,
}

impl WorkStatusReport {
    fn offline() -> Self {
        Self {
            status: WorkStatus::Offline,
            context: "Staff is not active".to_string(),
            booking: None,
        }
    }

    fn available() -> Self {
        Self {
            status: WorkStatus::Available,
            context: "Ready for assignment".to_string(),
            booking: None,
        }
    }
}

struct Snapshot<'a> {
    employment_status: EmploymentStatus,
    bookings: &'a [Booking],
    today: NaiveDate,
}

type Rule = fn(&Snapshot<'_>) -> Option<WorkStatusReport>;

/// Evaluated top to bottom; the first rule that matches decides.
const RULES: [(&str, Rule); 3] = [
    ("not_active", not_active),
    ("in_progress", in_progress),
    ("upcoming", upcoming),
];

fn not_active(snapshot: &Snapshot<'_>) -> Option<WorkStatusReport> {
    (!snapshot.employment_status.is_active()).then(WorkStatusReport::offline)
}

fn in_progress(snapshot: &Snapshot<'_>) -> Option<WorkStatusReport> {
    snapshot
        .bookings
        .iter()
        .find(|b| b.status == BookingStatus::InProgress)
        .map(|b| WorkStatusReport {
            status: WorkStatus::OnJob,
            context: format!("On job {} ({})", b.reference, b.time_label()),
            booking: Some(b.id),
        })
}

fn upcoming(snapshot: &Snapshot<'_>) -> Option<WorkStatusReport> {
    snapshot
        .bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Scheduled && b.scheduled_date >= snapshot.today)
        // Untimed bookings sort after timed ones on the same day.
        .min_by_key(|b| (b.scheduled_date, b.time.is_none(), b.time))
        .map(|b| {
            let when = match b.time {
                Some(t) => format!("{} at {}", b.scheduled_date, t.format("%H:%M")),
                None => b.scheduled_date.to_string(),
            };
            WorkStatusReport {
                status: WorkStatus::Assigned,
                context: format!("Next booking {} on {}", b.reference, when),
                booking: Some(b.id),
            }
        })
}

/// Derive a staff member's work status.
///
/// `bookings` is the staff member's booking snapshot and `today` the date
/// used for the upcoming-assignment check. Only the date is compared, so a
/// booking scheduled for earlier today still counts as upcoming.
pub fn derive_work_status(
    employment_status: EmploymentStatus,
    bookings: &[Booking],
    today: NaiveDate,
) -> WorkStatusReport {
    let snapshot = Snapshot {
        employment_status,
        bookings,
        today,
    };

    RULES
        .iter()
        .find_map(|(_, rule)| rule(&snapshot))
        .unwrap_or_else(WorkStatusReport::available)
}

/// Name of the rule that decides the status for these inputs.
///
/// Returns `"ready"` when no rule matched and the fallback applied.
pub fn deciding_rule(
    employment_status: EmploymentStatus,
    bookings: &[Booking],
    today: NaiveDate,
) -> &'static str {
    let snapshot = Snapshot {
        employment_status,
        bookings,
        today,
    };

    RULES
        .iter()
        .find(|(_, rule)| rule(&snapshot).is_some())
        .map(|(name, _)| *name)
        .unwrap_or("ready")
}

/// Work-status counts across a roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkforceStats {
    pub available: u64,
    pub assigned: u64,
    pub on_job: u64,
    pub offline: u64,
}

impl WorkforceStats {
    /// Tally a set of reports.
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a WorkStatusReport>) -> Self {
        let mut stats = Self::default();
        for report in reports {
            stats.record(report.status);
        }
        stats
    }

    /// Count one staff member.
    pub fn record(&mut self, status: WorkStatus) {
        match status {
            WorkStatus::Available => self.available += 1,
            WorkStatus::Assigned => self.assigned += 1,
            WorkStatus::OnJob => self.on_job += 1,
            WorkStatus::Offline => self.offline += 1,
        }
    }

    /// Total staff counted.
    pub fn total(&self) -> u64 {
        self.available + self.assigned + self.on_job + self.offline
    }

    /// Staff eligible for work.
    pub fn on_duty(&self) -> u64 {
        self.available + self.assigned + self.on_job
    }

    /// Share of on-duty staff that have work, as a percentage.
    pub fn utilization(&self) -> Option<f64> {
        let on_duty = self.on_duty();
        if on_duty == 0 {
            None
        } else {
            Some(((self.assigned + self.on_job) as f64 / on_duty as f64) * 100.0)
        }
    }
}
