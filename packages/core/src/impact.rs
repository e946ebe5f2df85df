//! Transition impact analysis.

use serde::{Deserialize, Serialize};

use crate::{Booking, BookingId, BookingStatus, EmploymentStatus};

/// Bookings that would lose their assignment if a status change is confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionImpact {
    pub in_progress: Vec<Booking>,
    pub scheduled: Vec<Booking>,
    pub total_impact: usize,
}

impl TransitionImpact {
    /// Whether the change would leave every booking untouched.
    pub fn is_empty(&self) -> bool {
        self.total_impact == 0
    }

    /// IDs of every affected booking, in-progress first.
    pub fn booking_ids(&self) -> Vec<BookingId> {
        self.in_progress
            .iter()
            .chain(&self.scheduled)
            .map(|b| b.id)
            .collect()
    }

    /// One-line description for the confirmation prompt.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No bookings will be affected".to_string();
        }
        format!(
            "{} booking(s) will be unassigned: {} in progress, {} scheduled",
            self.total_impact,
            self.in_progress.len(),
            self.scheduled.len()
        )
    }
}

/// Work out which of a staff member's bookings a move to `target` unassigns.
///
/// Moving to `Active` never unassigns anything. Any other target takes away
/// every in-progress and scheduled booking; completed and cancelled bookings
/// are history and never counted.
pub fn analyze_transition_impact(
    target: EmploymentStatus,
    bookings: &[Booking],
) -> TransitionImpact {
    if target.is_active() {
        return TransitionImpact::default();
    }

    let in_progress: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::InProgress)
        .cloned()
        .collect();
    let scheduled: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Scheduled)
        .cloned()
        .collect();
    let total_impact = in_progress.len() + scheduled.len();

    TransitionImpact {
        in_progress,
        scheduled,
        total_impact,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn bookings(statuses: &[BookingStatus]) -> Vec<Booking> {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Booking::new(format!("B{}", i + 1), date).with_status(*status))
            .collect()
    }

    #[test]
    fn reactivation_has_no_impact() {
        let all = bookings(&[
            BookingStatus::InProgress,
            BookingStatus::Scheduled,
            BookingStatus::Completed,
        ]);

        let impact = analyze_transition_impact(EmploymentStatus::Active, &all);
        assert_eq!(impact.total_impact, 0);
        assert!(impact.in_progress.is_empty());
        assert!(impact.scheduled.is_empty());
        assert_eq!(impact.summary(), "No bookings will be affected");
    }

    #[test]
    fn suspension_partitions_live_bookings() {
        let all = bookings(&[
            BookingStatus::InProgress,
            BookingStatus::InProgress,
            BookingStatus::Scheduled,
            BookingStatus::Completed,
        ]);

        let impact = analyze_transition_impact(EmploymentStatus::Suspended, &all);
        assert_eq!(impact.in_progress.len(), 2);
        assert_eq!(impact.scheduled.len(), 1);
        assert_eq!(impact.total_impact, 3);
        assert_eq!(
            impact.booking_ids(),
            vec![all[0].id, all[1].id, all[2].id]
        );
    }

    #[test]
    fn cancelled_bookings_are_excluded() {
        let all = bookings(&[BookingStatus::Cancelled, BookingStatus::Scheduled]);

        let impact = analyze_transition_impact(EmploymentStatus::Inactive, &all);
        assert_eq!(impact.total_impact, 1);
        assert_eq!(impact.scheduled[0].reference, "B2");
    }

    #[test]
    fn unknown_target_counts_as_deactivation() {
        let all = bookings(&[BookingStatus::Scheduled]);

        let impact = analyze_transition_impact(EmploymentStatus::Unknown, &all);
        assert_eq!(impact.total_impact, 1);
    }

    #[test]
    fn analysis_leaves_input_untouched() {
        let all = bookings(&[BookingStatus::InProgress, BookingStatus::Scheduled]);
        let before = all.clone();

        let _ = analyze_transition_impact(EmploymentStatus::OnLeave, &all);
        assert_eq!(all, before);
    }

    #[test]
    fn summary_counts_each_kind() {
        let all = bookings(&[BookingStatus::InProgress, BookingStatus::Scheduled]);

        let impact = analyze_transition_impact(EmploymentStatus::OnLeave, &all);
        assert_eq!(
            impact.summary(),
            "2 booking(s) will be unassigned: 1 in progress, 1 scheduled"
        );
    }
}
