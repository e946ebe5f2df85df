//! Employment-status transition controller.
//!
//! ```text
//!   Idle ──(to Active)──────────────────────► Committing ──► Committed
//!     │                                          ▲   │
//!     └──(to other)──► ImpactReview ──confirm────┘   └─abort─► back to review / Idle
//!                          │
//!                          └──cancel──► Idle
//! ```
//!
//! The controller never touches storage. It hands out a [`StatusChange`]
//! command for the store to apply atomically and turns the store's
//! [`CommitReport`] into an operator-facing [`TransitionOutcome`].

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Booking, BookingId, EmploymentStatus, LeavePeriod, StaffId, TransitionImpact, TransitionPolicy,
    analyze_transition_impact,
};

/// Errors raised by the transition controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot {action} while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: &'static str,
    },
    #[error("{0} is not a valid target status")]
    InvalidTarget(EmploymentStatus),
    #[error("A leave period only applies to on_leave, not {0}")]
    LeaveNotApplicable(EmploymentStatus),
    #[error("A leave period is required")]
    LeavePeriodRequired,
    #[error("Invalid leave period {period}: {reason}")]
    InvalidLeavePeriod {
        period: LeavePeriod,
        reason: &'static str,
    },
    #[error("Commit failed: {0}")]
    CommitFailed(String),
    #[error("Commit report lists booking {0} as both unassigned and still assigned")]
    ReportMismatch(BookingId),
}

/// A confirmed employment-status change, applied by the store as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub staff_id: StaffId,
    pub from: EmploymentStatus,
    pub to: EmploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<LeavePeriod>,
    /// Bookings seen during review whose assignment must be cleared.
    ///
    /// When leaving active the store also clears live bookings assigned
    /// after the review, so this is a lower bound.
    #[serde(default)]
    pub unassign: Vec<BookingId>,
    /// Day the impact was assessed for. Scheduled bookings from this day
    /// on count as live.
    pub as_of: NaiveDate,
    pub requested_at: DateTime<Utc>,
}

impl StatusChange {
    /// Whether this change brings a staff member back to work.
    pub fn is_reactivation(&self) -> bool {
        self.to.is_active()
    }
}

/// What the store reports after applying a [`StatusChange`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Bookings whose assignment was cleared, including any assigned after
    /// the review.
    pub unassigned: Vec<BookingId>,
    /// Bookings that still reference the staff member.
    pub still_assigned: Vec<BookingId>,
}

impl CommitReport {
    /// Report for a commit where every booking was unassigned.
    pub fn clean(unassigned: Vec<BookingId>) -> Self {
        Self {
            unassigned,
            still_assigned: Vec::new(),
        }
    }

    /// Whether every requested unassignment took effect.
    pub fn is_clean(&self) -> bool {
        self.still_assigned.is_empty()
    }
}

/// Result of asking for a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionStep {
    /// Target equals the current status; nothing to do.
    NoChange,
    /// The operator must review the impact and confirm or cancel.
    Review { impact: TransitionImpact },
    /// No review needed; apply this change.
    ReadyToCommit(StatusChange),
    /// The review was dismissed.
    Cancelled,
}

/// Final result of a committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Status changed and every affected booking was unassigned.
    Applied {
        change: StatusChange,
        unassigned: Vec<BookingId>,
        notice: String,
    },
    /// Status changed but some bookings still list the staff member.
    PartialFailure {
        change: StatusChange,
        unassigned: Vec<BookingId>,
        still_assigned: Vec<BookingId>,
        notice: String,
    },
}

impl TransitionOutcome {
    pub fn change(&self) -> &StatusChange {
        match self {
            TransitionOutcome::Applied { change, .. } => change,
            TransitionOutcome::PartialFailure { change, .. } => change,
        }
    }

    pub fn notice(&self) -> &str {
        match self {
            TransitionOutcome::Applied { notice, .. } => notice,
            TransitionOutcome::PartialFailure { notice, .. } => notice,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, TransitionOutcome::PartialFailure { .. })
    }
}

/// Where the controller currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionPhase {
    #[default]
    Idle,
    ImpactReview {
        change: StatusChange,
        impact: TransitionImpact,
    },
    Committing {
        change: StatusChange,
        impact: Option<TransitionImpact>,
    },
    Committed {
        outcome: TransitionOutcome,
    },
}

impl TransitionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionPhase::Idle => "idle",
            TransitionPhase::ImpactReview { .. } => "reviewing impact",
            TransitionPhase::Committing { .. } => "committing",
            TransitionPhase::Committed { .. } => "committed",
        }
    }
}

/// Status transition state machine for one staff member.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    staff_id: StaffId,
    current: EmploymentStatus,
    policy: TransitionPolicy,
    phase: TransitionPhase,
}

impl StatusTransition {
    pub fn new(staff_id: StaffId, current: EmploymentStatus, policy: TransitionPolicy) -> Self {
        Self {
            staff_id,
            current,
            policy,
            phase: TransitionPhase::Idle,
        }
    }

    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    /// Employment status as of the last commit.
    pub fn current(&self) -> EmploymentStatus {
        self.current
    }

    pub fn phase(&self) -> &TransitionPhase {
        &self.phase
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    fn invalid_phase(&self, action: &'static str) -> TransitionError {
        TransitionError::InvalidPhase {
            action,
            phase: self.phase.name(),
        }
    }

    /// Ask to move the staff member to `target`.
    ///
    /// `bookings` is the staff member's current booking snapshot and `today`
    /// the date used for leave checks.
    pub fn request(
        &mut self,
        target: EmploymentStatus,
        leave: Option<LeavePeriod>,
        bookings: &[Booking],
        today: NaiveDate,
    ) -> Result<TransitionStep, TransitionError> {
        if !matches!(
            self.phase,
            TransitionPhase::Idle | TransitionPhase::Committed { .. }
        ) {
            return Err(self.invalid_phase("request a new status"));
        }
        if !target.is_selectable() {
            return Err(TransitionError::InvalidTarget(target));
        }
        if target == self.current {
            self.phase = TransitionPhase::Idle;
            return Ok(TransitionStep::NoChange);
        }
        if target == EmploymentStatus::OnLeave {
            self.policy.check_leave(leave.as_ref(), today)?;
        } else if leave.is_some() {
            return Err(TransitionError::LeaveNotApplicable(target));
        }

        let impact = analyze_transition_impact(target, bookings);
        let change = StatusChange {
            staff_id: self.staff_id,
            from: self.current,
            to: target,
            leave,
            unassign: impact.booking_ids(),
            as_of: today,
            requested_at: Utc::now(),
        };

        if target.is_active() {
            self.phase = TransitionPhase::Committing {
                change: change.clone(),
                impact: None,
            };
            return Ok(TransitionStep::ReadyToCommit(change));
        }

        self.phase = TransitionPhase::ImpactReview {
            change,
            impact: impact.clone(),
        };
        Ok(TransitionStep::Review { impact })
    }

    /// The impact under review, if any.
    pub fn pending_impact(&self) -> Option<&TransitionImpact> {
        match &self.phase {
            TransitionPhase::ImpactReview { impact, .. } => Some(impact),
            _ => None,
        }
    }

    /// Accept the reviewed impact and hand out the change to apply.
    pub fn confirm(&mut self) -> Result<StatusChange, TransitionError> {
        match std::mem::take(&mut self.phase) {
            TransitionPhase::ImpactReview { change, impact } => {
                self.phase = TransitionPhase::Committing {
                    change: change.clone(),
                    impact: Some(impact),
                };
                Ok(change)
            }
            other => {
                self.phase = other;
                Err(self.invalid_phase("confirm"))
            }
        }
    }

    /// Dismiss the reviewed impact without changing anything.
    pub fn cancel(&mut self) -> Result<TransitionStep, TransitionError> {
        match self.phase {
            TransitionPhase::ImpactReview { .. } => {
                self.phase = TransitionPhase::Idle;
                Ok(TransitionStep::Cancelled)
            }
            _ => Err(self.invalid_phase("cancel")),
        }
    }

    /// Record what the store did with the change handed out by
    /// [`confirm`](Self::confirm) or [`request`](Self::request).
    ///
    /// The report may name bookings outside [`StatusChange::unassign`]:
    /// those were assigned after the review and cleared by the same commit.
    pub fn complete(
        &mut self,
        report: CommitReport,
    ) -> Result<TransitionOutcome, TransitionError> {
        let TransitionPhase::Committing { change, impact } = &self.phase else {
            return Err(self.invalid_phase("complete a commit"));
        };

        let cleared: HashSet<BookingId> = report.unassigned.iter().copied().collect();
        if let Some(both) = report.still_assigned.iter().find(|id| cleared.contains(*id)) {
            return Err(TransitionError::ReportMismatch(*both));
        }

        let reviewed: HashSet<BookingId> = change.unassign.iter().copied().collect();
        let late = report
            .unassigned
            .iter()
            .chain(&report.still_assigned)
            .filter(|id| !reviewed.contains(*id))
            .count();

        let change = change.clone();
        let outcome = if report.is_clean() {
            let notice = applied_notice(&change, report.unassigned.len(), late);
            TransitionOutcome::Applied {
                change,
                unassigned: report.unassigned,
                notice,
            }
        } else {
            let references = references_for(impact.as_ref(), &report.still_assigned);
            let notice = format!(
                "Status changed to {}, but {} booking(s) still list this staff member: {}",
                change.to.label(),
                report.still_assigned.len(),
                references.join(", ")
            );
            TransitionOutcome::PartialFailure {
                change,
                unassigned: report.unassigned,
                still_assigned: report.still_assigned,
                notice,
            }
        };

        self.current = outcome.change().to;
        self.phase = TransitionPhase::Committed {
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    /// The store could not apply the change at all.
    ///
    /// The status stays as it was. A reviewed change goes back to review so
    /// the operator can retry or cancel; a reactivation goes back to idle.
    /// Returns the error to hand to the caller.
    pub fn abort(&mut self, reason: impl Into<String>) -> TransitionError {
        match std::mem::take(&mut self.phase) {
            TransitionPhase::Committing {
                change,
                impact: Some(impact),
            } => {
                self.phase = TransitionPhase::ImpactReview { change, impact };
                TransitionError::CommitFailed(reason.into())
            }
            TransitionPhase::Committing { impact: None, .. } => {
                TransitionError::CommitFailed(reason.into())
            }
            other => {
                self.phase = other;
                self.invalid_phase("abort a commit")
            }
        }
    }
}

fn applied_notice(change: &StatusChange, unassigned: usize, late: usize) -> String {
    if change.is_reactivation() {
        return "Staff reactivated. Bookings unassigned earlier remain unassigned".to_string();
    }
    let label = change.to.label();
    match (unassigned, late) {
        (0, _) => format!("Status changed to {}", label),
        (n, 0) => format!("Status changed to {}. {} booking(s) unassigned", label, n),
        (n, late) => format!(
            "Status changed to {}. {} booking(s) unassigned, {} of them assigned after review",
            label, n, late
        ),
    }
}

fn references_for(impact: Option<&TransitionImpact>, ids: &[BookingId]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            impact
                .and_then(|impact| {
                    impact
                        .in_progress
                        .iter()
                        .chain(&impact.scheduled)
                        .find(|b| b.id == *id)
                })
                .map(|b| b.reference.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .collect()
}
