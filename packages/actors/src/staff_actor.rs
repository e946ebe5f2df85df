//! Staff actor owning one staff member's status transition.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::sync::broadcast;
use workforce_core::{
    EmploymentStatus, LeavePeriod, StaffEvent, StaffMember, StatusChange, StatusTransition,
    TransitionError, TransitionOutcome, TransitionPhase, TransitionPolicy, TransitionStep,
    WorkStatusReport, WorkforceStore, derive_work_status,
};

use crate::messages::{ActorError, StaffMessage, TransitionReply};

/// Arguments for spawning a staff actor.
pub struct StaffArgs<S> {
    pub staff: StaffMember,
    pub store: Arc<S>,
    pub policy: TransitionPolicy,
    pub event_tx: Option<broadcast::Sender<StaffEvent>>,
}

/// State for the staff actor.
pub struct StaffState<S> {
    /// Staff record as of the last commit or refresh.
    pub staff: StaffMember,
    transition: StatusTransition,
    store: Arc<S>,
    event_tx: Option<broadcast::Sender<StaffEvent>>,
}

impl<S: WorkforceStore> StaffState<S> {
    fn new(args: StaffArgs<S>) -> Self {
        let transition =
            StatusTransition::new(args.staff.id, args.staff.employment_status, args.policy);
        Self {
            staff: args.staff,
            transition,
            store: args.store,
            event_tx: args.event_tx,
        }
    }

    /// Broadcast an event.
    fn broadcast(&self, event: StaffEvent) {
        tracing::debug!("{}", event.description());
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    async fn work_status(&self, today: NaiveDate) -> Result<WorkStatusReport, String> {
        let bookings = self
            .store
            .bookings_for_staff(self.staff.id, today)
            .await
            .map_err(|e| e.to_string())?;

        let report = derive_work_status(self.staff.employment_status, &bookings, today);
        tracing::debug!(
            "Staff {} is {}: {}",
            self.staff.id,
            report.status,
            report.context
        );
        Ok(report)
    }

    async fn request(
        &mut self,
        target: EmploymentStatus,
        leave: Option<LeavePeriod>,
        today: NaiveDate,
    ) -> Result<TransitionReply, String> {
        let bookings = self
            .store
            .bookings_for_staff(self.staff.id, today)
            .await
            .map_err(|e| e.to_string())?;

        match self
            .transition
            .request(target, leave, &bookings, today)
            .map_err(|e| e.to_string())?
        {
            TransitionStep::NoChange | TransitionStep::Cancelled => Ok(TransitionReply::NoChange),
            TransitionStep::Review { impact } => {
                tracing::debug!("Staff {} -> {}: {}", self.staff.id, target, impact.summary());
                self.broadcast(StaffEvent::TransitionRequested {
                    staff_id: self.staff.id,
                    target,
                    total_impact: impact.total_impact,
                    timestamp: Utc::now(),
                });
                Ok(TransitionReply::Review { impact })
            }
            TransitionStep::ReadyToCommit(change) => {
                let outcome = self.commit(change).await?;
                Ok(TransitionReply::Committed { outcome })
            }
        }
    }

    async fn confirm(&mut self) -> Result<TransitionOutcome, String> {
        let change = self.transition.confirm().map_err(|e| e.to_string())?;
        self.commit(change).await
    }

    fn cancel(&mut self) -> Result<(), String> {
        let target = match self.transition.phase() {
            TransitionPhase::ImpactReview { change, .. } => Some(change.to),
            _ => None,
        };
        self.transition.cancel().map_err(|e| e.to_string())?;

        if let Some(target) = target {
            self.broadcast(StaffEvent::TransitionCancelled {
                staff_id: self.staff.id,
                target,
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    /// Hand the change to the store and record what happened.
    async fn commit(&mut self, change: StatusChange) -> Result<TransitionOutcome, String> {
        let report = match self.store.commit(&change).await {
            Ok(report) => report,
            Err(e) => {
                let error = self.transition.abort(e.to_string());
                tracing::warn!("Staff {} commit aborted: {}", self.staff.id, error);
                self.broadcast(StaffEvent::CommitAborted {
                    staff_id: self.staff.id,
                    target: change.to,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(error.to_string());
            }
        };

        match self.transition.complete(report) {
            Ok(outcome) => {
                self.apply(&outcome);
                Ok(outcome)
            }
            Err(error @ TransitionError::ReportMismatch(_)) => {
                // The store applied something, so the cached record can no longer be trusted.
                tracing::warn!("Staff {}: {}", self.staff.id, error);
                if let Err(e) = self.reload().await {
                    tracing::warn!("Staff {} reload failed: {}", self.staff.id, e);
                }
                Err(error.to_string())
            }
            Err(error) => Err(error.to_string()),
        }
    }

    fn apply(&mut self, outcome: &TransitionOutcome) {
        let change = outcome.change();
        self.staff.employment_status = change.to;
        self.staff.leave = change.leave;
        self.staff.updated_at = Utc::now();

        if outcome.is_partial() {
            tracing::warn!("Staff {}: {}", self.staff.id, outcome.notice());
        } else {
            tracing::info!("Staff {}: {}", self.staff.id, outcome.notice());
        }

        for event in StaffEvent::for_outcome(outcome) {
            self.broadcast(event);
        }
    }

    /// Replace the cached record with the stored one.
    ///
    /// A status changed elsewhere restarts the transition and drops any
    /// pending review.
    async fn reload(&mut self) -> Result<StaffMember, String> {
        let staff = self
            .store
            .staff_member(self.staff.id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| ActorError::StaffNotFound(self.staff.id).to_string())?;

        let in_flight = !matches!(
            self.transition.phase(),
            TransitionPhase::Idle | TransitionPhase::Committed { .. }
        );
        if staff.employment_status != self.transition.current() || in_flight {
            tracing::info!(
                "Staff {} reloaded as {} ({} pending)",
                staff.id,
                staff.employment_status,
                self.transition.phase().name()
            );
            self.transition = StatusTransition::new(
                staff.id,
                staff.employment_status,
                *self.transition.policy(),
            );
        }

        self.staff = staff.clone();
        Ok(staff)
    }
}

/// Actor serialising reads and transitions for one staff member.
pub struct StaffActor<S> {
    _store: PhantomData<fn() -> S>,
}

impl<S> StaffActor<S> {
    pub fn new() -> Self {
        Self {
            _store: PhantomData,
        }
    }
}

impl<S> Default for StaffActor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WorkforceStore> Actor for StaffActor<S> {
    type Msg = StaffMessage;
    type State = StaffState<S>;
    type Arguments = StaffArgs<S>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting staff actor: {} ({})",
            args.staff.name,
            args.staff.employment_status
        );
        Ok(StaffState::new(args))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            StaffMessage::GetStaff { reply } => {
                let _ = reply.send(state.staff.clone());
            }

            StaffMessage::GetWorkStatus { today, reply } => {
                let _ = reply.send(state.work_status(today).await);
            }

            StaffMessage::RequestTransition {
                target,
                leave,
                today,
                reply,
            } => {
                let _ = reply.send(state.request(target, leave, today).await);
            }

            StaffMessage::GetPendingImpact { reply } => {
                let _ = reply.send(state.transition.pending_impact().cloned());
            }

            StaffMessage::ConfirmTransition { reply } => {
                let _ = reply.send(state.confirm().await);
            }

            StaffMessage::CancelTransition { reply } => {
                let _ = reply.send(state.cancel());
            }

            StaffMessage::Refresh { reply } => {
                let _ = reply.send(state.reload().await);
            }

            StaffMessage::Shutdown => {
                tracing::info!("Shutting down staff actor: {}", state.staff.name);
                myself.stop(None);
            }
        }

        Ok(())
    }
}
