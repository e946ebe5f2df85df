//! Actor system for staff status transitions.
//!
//! This crate provides the Ractor-based actor system that serialises every
//! read and status change for a staff member through that member's actor.
//!
//! # Architecture
//!
//! - `Roster` - Top-level actor that starts and routes to staff actors
//! - `StaffActor` - Owns one staff member's record and status transition
//!
//! # Usage
//!
//! ```ignore
//! use actors::{RosterConfig, RosterMessage, start_roster};
//!
//! // Start the roster over any store
//! let (roster, handle) = start_roster(Arc::new(store), RosterConfig::default()).await?;
//!
//! // Ask for a status change via message
//! roster.send_message(RosterMessage::RequestTransition { ... })?;
//! ```

mod messages;
pub mod registry;
mod roster;
mod staff_actor;

pub use messages::{ActorError, RosterMessage, StaffMessage, TransitionReply};
pub use registry::{ActorRegistry, global_registry};
#[cfg(feature = "surreal")]
pub use roster::start_surreal_roster;
pub use roster::{Roster, RosterArgs, RosterConfig, start_roster};
pub use staff_actor::{StaffActor, StaffArgs};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
