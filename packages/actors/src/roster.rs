//! Roster actor supervising one staff actor per staff member.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use ractor::{Actor, ActorProcessingErr, ActorRef, SupervisionEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use workforce_core::{
    StaffEvent, StaffId, StaffMember, TransitionPolicy, WorkforceStats, WorkforceStore,
};

use crate::messages::{ActorError, RosterMessage, StaffMessage};
use crate::registry::global_registry;
use crate::staff_actor::{StaffActor, StaffArgs};

/// Settings shared by every staff actor the roster starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub policy: TransitionPolicy,
    /// Buffered events per subscriber before the slowest one starts lagging.
    pub event_capacity: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            policy: TransitionPolicy::default(),
            event_capacity: 1024,
        }
    }
}

impl RosterConfig {
    /// Set the transition policy.
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

/// Arguments for starting the roster.
pub struct RosterArgs<S> {
    pub store: Arc<S>,
    pub config: RosterConfig,
}

/// State for the roster actor.
pub struct RosterState<S> {
    store: Arc<S>,
    config: RosterConfig,
    /// Staff actors by staff ID.
    staff: HashMap<StaffId, ActorRef<StaffMessage>>,
    /// Event broadcaster.
    event_tx: broadcast::Sender<StaffEvent>,
}

impl<S: WorkforceStore> RosterState<S> {
    fn new(args: RosterArgs<S>) -> Self {
        let (event_tx, _) = broadcast::channel(args.config.event_capacity.max(1));
        Self {
            store: args.store,
            config: args.config,
            staff: HashMap::new(),
            event_tx,
        }
    }

    fn route(&self, staff_id: StaffId) -> Result<&ActorRef<StaffMessage>, String> {
        self.staff
            .get(&staff_id)
            .ok_or_else(|| ActorError::StaffNotFound(staff_id).to_string())
    }

    /// Remove a stopped staff actor.
    fn forget(&mut self, actor_id: ractor::ActorId) {
        self.staff.retain(|staff_id, actor| {
            if actor.get_id() == actor_id {
                global_registry().unregister_staff(*staff_id);
                false
            } else {
                true
            }
        });
    }
}

async fn spawn_staff_actor<S: WorkforceStore>(
    myself: &ActorRef<RosterMessage>,
    state: &mut RosterState<S>,
    staff: StaffMember,
) -> Result<ActorRef<StaffMessage>, ActorError> {
    let staff_id = staff.id;
    if state.staff.contains_key(&staff_id) {
        return Err(ActorError::AlreadyRegistered(staff_id));
    }

    let args = StaffArgs {
        staff,
        store: state.store.clone(),
        policy: state.config.policy,
        event_tx: Some(state.event_tx.clone()),
    };

    let (actor, _handle) = Actor::spawn_linked(
        Some(format!("staff-{}", staff_id)),
        StaffActor::<S>::new(),
        args,
        myself.get_cell(),
    )
    .await
    .map_err(|e| ActorError::Actor(format!("Failed to spawn staff actor: {}", e)))?;

    global_registry().register_staff(staff_id, actor.clone());
    state.staff.insert(staff_id, actor.clone());

    Ok(actor)
}

async fn fetch_staff(actor: &ActorRef<StaffMessage>) -> Option<StaffMember> {
    let (tx, rx) = ractor::concurrency::oneshot();
    if actor
        .send_message(StaffMessage::GetStaff { reply: tx.into() })
        .is_err()
    {
        return None;
    }
    rx.await.ok()
}

/// Roster actor that owns every staff actor.
pub struct Roster<S> {
    _store: std::marker::PhantomData<fn() -> S>,
}

impl<S> Roster<S> {
    pub fn new() -> Self {
        Self {
            _store: std::marker::PhantomData,
        }
    }
}

impl<S> Default for Roster<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WorkforceStore> Actor for Roster<S> {
    type Msg = RosterMessage;
    type State = RosterState<S>;
    type Arguments = RosterArgs<S>;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting staff roster");

        let members = args.store.roster().await.map_err(ActorError::from)?;
        let mut state = RosterState::new(args);

        for staff in members {
            spawn_staff_actor(&myself, &mut state, staff).await?;
        }

        tracing::info!("Roster started with {} staff actor(s)", state.staff.len());
        Ok(state)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            RosterMessage::RegisterStaff { staff, reply } => {
                let result = spawn_staff_actor(&myself, state, staff.clone())
                    .await
                    .map(|_| staff)
                    .map_err(|e| e.to_string());
                let _ = reply.send(result);
            }

            RosterMessage::GetStaff { staff_id, reply } => {
                let staff = match state.staff.get(&staff_id) {
                    Some(actor) => fetch_staff(actor).await,
                    None => None,
                };
                let _ = reply.send(staff);
            }

            RosterMessage::ListStaff { reply } => {
                let mut staff = Vec::with_capacity(state.staff.len());
                for actor in state.staff.values() {
                    if let Some(member) = fetch_staff(actor).await {
                        staff.push(member);
                    }
                }
                staff.sort_by(|a, b| a.name.cmp(&b.name));
                let _ = reply.send(staff);
            }

            RosterMessage::GetWorkStatus {
                staff_id,
                today,
                reply,
            } => match state.route(staff_id) {
                Ok(actor) => {
                    actor.send_message(StaffMessage::GetWorkStatus { today, reply })?;
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            RosterMessage::GetStats { today, reply } => {
                let _ = reply.send(collect_stats(state, today).await);
            }

            RosterMessage::RequestTransition {
                staff_id,
                target,
                leave,
                today,
                reply,
            } => match state.route(staff_id) {
                Ok(actor) => {
                    actor.send_message(StaffMessage::RequestTransition {
                        target,
                        leave,
                        today,
                        reply,
                    })?;
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            RosterMessage::GetPendingImpact { staff_id, reply } => match state.route(staff_id) {
                Ok(actor) => {
                    let (tx, rx) = ractor::concurrency::oneshot();
                    actor.send_message(StaffMessage::GetPendingImpact { reply: tx.into() })?;
                    let impact = rx
                        .await
                        .map_err(|_| format!("Staff actor {} did not reply", staff_id));
                    let _ = reply.send(impact);
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            RosterMessage::ConfirmTransition { staff_id, reply } => match state.route(staff_id) {
                Ok(actor) => {
                    actor.send_message(StaffMessage::ConfirmTransition { reply })?;
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            RosterMessage::CancelTransition { staff_id, reply } => match state.route(staff_id) {
                Ok(actor) => {
                    actor.send_message(StaffMessage::CancelTransition { reply })?;
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            RosterMessage::RefreshStaff { staff_id, reply } => match state.route(staff_id) {
                Ok(actor) => {
                    actor.send_message(StaffMessage::Refresh { reply })?;
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            RosterMessage::Subscribe { sender } => {
                // Forward from our channel to the subscriber's
                let mut rx = state.event_tx.subscribe();
                tokio::spawn(async move {
                    loop {
                        match rx.recv().await {
                            Ok(event) => {
                                if sender.send(event).is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                tracing::warn!(
                                    "Event subscriber lagged, {} event(s) dropped",
                                    skipped
                                );
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                });
            }

            RosterMessage::Shutdown => {
                tracing::info!("Shutting down roster");
                for actor in state.staff.values() {
                    let _ = actor.send_message(StaffMessage::Shutdown);
                }
                global_registry().unregister_roster(myself.get_id());
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::info!(
                    "Staff actor {} stopped: {:?}",
                    cell.get_name().unwrap_or_default(),
                    reason
                );
                state.forget(cell.get_id());
            }
            SupervisionEvent::ActorFailed(cell, error) => {
                tracing::warn!(
                    "Staff actor {} failed: {}",
                    cell.get_name().unwrap_or_default(),
                    error
                );
                state.forget(cell.get_id());
            }
            _ => {}
        }
        Ok(())
    }
}

/// Work-status counts over every staff actor that answers.
async fn collect_stats<S: WorkforceStore>(
    state: &RosterState<S>,
    today: NaiveDate,
) -> WorkforceStats {
    let mut stats = WorkforceStats::default();

    for (staff_id, actor) in &state.staff {
        let (tx, rx) = ractor::concurrency::oneshot();
        if actor
            .send_message(StaffMessage::GetWorkStatus {
                today,
                reply: tx.into(),
            })
            .is_err()
        {
            continue;
        }

        match rx.await {
            Ok(Ok(report)) => stats.record(report.status),
            Ok(Err(e)) => tracing::warn!("No work status for staff {}: {}", staff_id, e),
            Err(_) => tracing::warn!("Staff actor {} did not reply", staff_id),
        }
    }

    stats
}

/// Start a roster over the given store and register it globally.
pub async fn start_roster<S: WorkforceStore>(
    store: Arc<S>,
    config: RosterConfig,
) -> Result<(ActorRef<RosterMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let (actor, handle) =
        Actor::spawn(None, Roster::<S>::new(), RosterArgs { store, config }).await?;

    global_registry().register_roster(actor.clone());

    Ok((actor, handle))
}

/// Start a roster backed by the SurrealDB transition store.
///
/// The database must already be initialised with [`db::init`].
#[cfg(feature = "surreal")]
pub async fn start_surreal_roster(
    config: RosterConfig,
) -> Result<(ActorRef<RosterMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    start_roster(Arc::new(db::TransitionStore), config).await
}
