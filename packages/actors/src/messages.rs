//! Message types for actor communication.

use chrono::NaiveDate;
use ractor::RpcReplyPort;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use workforce_core::{
    EmploymentStatus, LeavePeriod, PortError, StaffEvent, StaffId, StaffMember, TransitionImpact,
    TransitionOutcome, WorkStatusReport, WorkforceStats,
};

/// What a staff actor did with a transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransitionReply {
    /// The staff member already holds the requested status.
    NoChange,
    /// The impact must be confirmed or cancelled.
    Review { impact: TransitionImpact },
    /// The change needed no review and has been committed.
    Committed { outcome: TransitionOutcome },
}

/// Messages for the StaffActor.
#[derive(Debug)]
pub enum StaffMessage {
    /// Get the cached staff record.
    GetStaff { reply: RpcReplyPort<StaffMember> },

    /// Derive the current work status from fresh bookings.
    GetWorkStatus {
        today: NaiveDate,
        reply: RpcReplyPort<Result<WorkStatusReport, String>>,
    },

    /// Ask for a new employment status.
    RequestTransition {
        target: EmploymentStatus,
        leave: Option<LeavePeriod>,
        today: NaiveDate,
        reply: RpcReplyPort<Result<TransitionReply, String>>,
    },

    /// The impact under review, if any.
    GetPendingImpact {
        reply: RpcReplyPort<Option<TransitionImpact>>,
    },

    /// Accept the reviewed impact and commit.
    ConfirmTransition {
        reply: RpcReplyPort<Result<TransitionOutcome, String>>,
    },

    /// Dismiss the reviewed impact.
    CancelTransition { reply: RpcReplyPort<Result<(), String>> },

    /// Reload the staff record from the store, restarting the transition
    /// if the stored status moved on.
    Refresh {
        reply: RpcReplyPort<Result<StaffMember, String>>,
    },

    /// Stop the actor.
    Shutdown,
}

/// Messages for the Roster.
#[derive(Debug)]
pub enum RosterMessage {
    /// Start an actor for a staff member added after startup.
    RegisterStaff {
        staff: StaffMember,
        reply: RpcReplyPort<Result<StaffMember, String>>,
    },

    /// Get a staff record by ID.
    GetStaff {
        staff_id: StaffId,
        reply: RpcReplyPort<Option<StaffMember>>,
    },

    /// List every staff record, ordered by name.
    ListStaff { reply: RpcReplyPort<Vec<StaffMember>> },

    /// Derive one staff member's work status.
    GetWorkStatus {
        staff_id: StaffId,
        today: NaiveDate,
        reply: RpcReplyPort<Result<WorkStatusReport, String>>,
    },

    /// Work-status counts across the roster.
    GetStats {
        today: NaiveDate,
        reply: RpcReplyPort<WorkforceStats>,
    },

    /// Ask for a new employment status.
    RequestTransition {
        staff_id: StaffId,
        target: EmploymentStatus,
        leave: Option<LeavePeriod>,
        today: NaiveDate,
        reply: RpcReplyPort<Result<TransitionReply, String>>,
    },

    /// The impact awaiting confirmation, if any.
    GetPendingImpact {
        staff_id: StaffId,
        reply: RpcReplyPort<Result<Option<TransitionImpact>, String>>,
    },

    /// Accept the reviewed impact and commit.
    ConfirmTransition {
        staff_id: StaffId,
        reply: RpcReplyPort<Result<TransitionOutcome, String>>,
    },

    /// Dismiss the reviewed impact.
    CancelTransition {
        staff_id: StaffId,
        reply: RpcReplyPort<Result<(), String>>,
    },

    /// Reload a staff record changed outside the roster.
    RefreshStaff {
        staff_id: StaffId,
        reply: RpcReplyPort<Result<StaffMember, String>>,
    },

    /// Subscribe to events.
    Subscribe {
        sender: broadcast::Sender<StaffEvent>,
    },

    /// Stop every staff actor and the roster.
    Shutdown,
}

/// Error type for actor operations.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("Staff not found: {0}")]
    StaffNotFound(StaffId),

    #[error("Staff already registered: {0}")]
    AlreadyRegistered(StaffId),

    #[error("Store error: {0}")]
    Store(#[from] PortError),

    #[error("Actor error: {0}")]
    Actor(String),
}
