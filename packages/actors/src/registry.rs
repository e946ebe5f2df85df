//! Actor registry for discovering actors by staff ID.

use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use ractor::{ActorId, ActorRef};
use workforce_core::StaffId;

use crate::messages::{RosterMessage, StaffMessage};

/// Global actor registry for discovering actors.
///
/// This provides a way to look up actors without passing references
/// through the entire call stack.
pub struct ActorRegistry {
    roster: RwLock<Option<ActorRef<RosterMessage>>>,
    staff: RwLock<HashMap<StaffId, ActorRef<StaffMessage>>>,
}

impl ActorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            roster: RwLock::new(None),
            staff: RwLock::new(HashMap::new()),
        }
    }

    /// Register the roster.
    pub fn register_roster(&self, roster: ActorRef<RosterMessage>) {
        *self.roster.write().unwrap_or_else(PoisonError::into_inner) = Some(roster);
    }

    /// Forget the roster if it is the one registered.
    pub fn unregister_roster(&self, id: ActorId) {
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        if roster.as_ref().is_some_and(|r| r.get_id() == id) {
            *roster = None;
        }
    }

    /// Get the roster.
    pub fn get_roster(&self) -> Option<ActorRef<RosterMessage>> {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register a staff actor.
    pub fn register_staff(&self, staff_id: StaffId, actor: ActorRef<StaffMessage>) {
        self.staff
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(staff_id, actor);
    }

    /// Unregister a staff actor.
    pub fn unregister_staff(&self, staff_id: StaffId) {
        self.staff
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&staff_id);
    }

    /// Get a staff actor by staff ID.
    pub fn get_staff(&self, staff_id: StaffId) -> Option<ActorRef<StaffMessage>> {
        self.staff
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&staff_id)
            .cloned()
    }

    /// IDs of every registered staff actor.
    pub fn list_staff(&self) -> Vec<StaffId> {
        self.staff
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry instance.
static REGISTRY: LazyLock<ActorRegistry> = LazyLock::new(ActorRegistry::new);

/// Get the global actor registry.
pub fn global_registry() -> &'static ActorRegistry {
    &REGISTRY
}
