//! Core domain types for the workforce status engine.
//!
//! This crate contains the pure parts shared by every package:
//! - StaffMember and EmploymentStatus for the workforce
//! - Booking as seen from the staff side
//! - Work-status derivation and transition impact analysis
//! - The status transition state machine and its storage interfaces
//! - Events for real-time updates
//!
//! Nothing here performs I/O.

mod booking;
mod events;
mod impact;
mod policy;
mod ports;
mod staff;
mod transition;
mod work_status;

pub use booking::{Booking, BookingId, BookingStatus};
pub use events::StaffEvent;
pub use impact::{TransitionImpact, analyze_transition_impact};
pub use policy::{LeaveValidation, TransitionPolicy};
pub use ports::{BookingDirectory, PortError, StaffDirectory, StatusCommitter, WorkforceStore};
pub use staff::{EmploymentStatus, LeavePeriod, StaffId, StaffMember};
pub use transition::{
    CommitReport, StatusChange, StatusTransition, TransitionError, TransitionOutcome,
    TransitionPhase, TransitionStep,
};
pub use work_status::{
    WorkStatus, WorkStatusReport, WorkforceStats, deciding_rule, derive_work_status,
};
