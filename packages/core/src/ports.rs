//! Interfaces to the collaborators that own staff and booking records.

use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;

use crate::{Booking, CommitReport, StaffId, StaffMember, StatusChange};

/// Failures reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Read access to staff records.
pub trait StaffDirectory: Send + Sync + 'static {
    /// Look up one staff member.
    fn staff_member(
        &self,
        id: StaffId,
    ) -> impl Future<Output = Result<Option<StaffMember>, PortError>> + Send;

    /// Every staff member on record.
    fn roster(&self) -> impl Future<Output = Result<Vec<StaffMember>, PortError>> + Send;
}

/// Read access to bookings.
pub trait BookingDirectory: Send + Sync + 'static {
    /// Current and future bookings assigned to `staff_id`.
    ///
    /// In-progress bookings are returned whatever their date; everything else
    /// only when scheduled on or after `from`.
    fn bookings_for_staff(
        &self,
        staff_id: StaffId,
        from: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Booking>, PortError>> + Send;
}

/// Applies confirmed status changes.
pub trait StatusCommitter: Send + Sync + 'static {
    /// Set the new employment status and clear the staff member's
    /// assignments as a single unit.
    ///
    /// Every listed booking is cleared. When the target is not `Active`, so
    /// is every other in-progress booking and every booking scheduled on or
    /// after [`StatusChange::as_of`] still assigned to the staff member,
    /// which covers assignments made after the review. The report names all
    /// of them.
    ///
    /// An `Err` means nothing was applied. An `Ok` report with bookings in
    /// `still_assigned` means the status changed but those bookings still
    /// point at the staff member.
    fn commit(
        &self,
        change: &StatusChange,
    ) -> impl Future<Output = Result<CommitReport, PortError>> + Send;
}

/// Everything the actor layer needs from storage.
pub trait WorkforceStore: StaffDirectory + BookingDirectory + StatusCommitter {}

impl<T> WorkforceStore for T where T: StaffDirectory + BookingDirectory + StatusCommitter {}
