//! Event types for real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BookingId, EmploymentStatus, StaffId, TransitionOutcome};

/// Events emitted while staff status changes are reviewed and applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StaffEvent {
    /// An operator asked for a status change that needs review.
    TransitionRequested {
        staff_id: StaffId,
        target: EmploymentStatus,
        total_impact: usize,
        timestamp: DateTime<Utc>,
    },
    /// The operator dismissed the review.
    TransitionCancelled {
        staff_id: StaffId,
        target: EmploymentStatus,
        timestamp: DateTime<Utc>,
    },
    /// Employment status was committed.
    EmploymentStatusChanged {
        staff_id: StaffId,
        old_status: EmploymentStatus,
        new_status: EmploymentStatus,
        timestamp: DateTime<Utc>,
    },
    /// A booking lost its assignment as part of a commit.
    BookingUnassigned {
        booking_id: BookingId,
        staff_id: StaffId,
        timestamp: DateTime<Utc>,
    },
    /// Status committed but some bookings still list the staff member.
    CommitPartiallyFailed {
        staff_id: StaffId,
        still_assigned: Vec<BookingId>,
        timestamp: DateTime<Utc>,
    },
    /// The store could not apply the change; nothing was committed.
    CommitAborted {
        staff_id: StaffId,
        target: EmploymentStatus,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl StaffEvent {
    /// Events describing a committed transition, in the order they happened.
    pub fn for_outcome(outcome: &TransitionOutcome) -> Vec<StaffEvent> {
        let change = outcome.change();
        let timestamp = Utc::now();

        let unassigned: &[BookingId] = match outcome {
            TransitionOutcome::Applied { unassigned, .. } => unassigned,
            TransitionOutcome::PartialFailure { unassigned, .. } => unassigned,
        };

        let mut events = vec![StaffEvent::EmploymentStatusChanged {
            staff_id: change.staff_id,
            old_status: change.from,
            new_status: change.to,
            timestamp,
        }];
        events.extend(unassigned.iter().map(|booking_id| StaffEvent::BookingUnassigned {
            booking_id: *booking_id,
            staff_id: change.staff_id,
            timestamp,
        }));
        if let TransitionOutcome::PartialFailure { still_assigned, .. } = outcome {
            events.push(StaffEvent::CommitPartiallyFailed {
                staff_id: change.staff_id,
                still_assigned: still_assigned.clone(),
                timestamp,
            });
        }
        events
    }

    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StaffEvent::TransitionRequested { timestamp, .. } => *timestamp,
            StaffEvent::TransitionCancelled { timestamp, .. } => *timestamp,
            StaffEvent::EmploymentStatusChanged { timestamp, .. } => *timestamp,
            StaffEvent::BookingUnassigned { timestamp, .. } => *timestamp,
            StaffEvent::CommitPartiallyFailed { timestamp, .. } => *timestamp,
            StaffEvent::CommitAborted { timestamp, .. } => *timestamp,
        }
    }

    /// Get the staff ID associated with this event.
    pub fn staff_id(&self) -> StaffId {
        match self {
            StaffEvent::TransitionRequested { staff_id, .. } => *staff_id,
            StaffEvent::TransitionCancelled { staff_id, .. } => *staff_id,
            StaffEvent::EmploymentStatusChanged { staff_id, .. } => *staff_id,
            StaffEvent::BookingUnassigned { staff_id, .. } => *staff_id,
            StaffEvent::CommitPartiallyFailed { staff_id, .. } => *staff_id,
            StaffEvent::CommitAborted { staff_id, .. } => *staff_id,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            StaffEvent::TransitionRequested {
                staff_id,
                target,
                total_impact,
                ..
            } => format!(
                "Staff {} -> {} requested ({} booking(s) affected)",
                staff_id, target, total_impact
            ),
            StaffEvent::TransitionCancelled {
                staff_id, target, ..
            } => format!("Staff {} -> {} cancelled", staff_id, target),
            StaffEvent::EmploymentStatusChanged {
                staff_id,
                old_status,
                new_status,
                ..
            } => format!("Staff {} {} -> {}", staff_id, old_status, new_status),
            StaffEvent::BookingUnassigned {
                booking_id,
                staff_id,
                ..
            } => format!("Booking {} unassigned from {}", booking_id, staff_id),
            StaffEvent::CommitPartiallyFailed {
                staff_id,
                still_assigned,
                ..
            } => format!(
                "Staff {} still assigned to {} booking(s)",
                staff_id,
                still_assigned.len()
            ),
            StaffEvent::CommitAborted {
                staff_id, error, ..
            } => format!("Staff {} commit aborted: {}", staff_id, error),
        }
    }
}
