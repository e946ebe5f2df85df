#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use actors::{ActorRef, RosterMessage, RpcReplyPort};
use chrono::NaiveDate;
use workforce_core::{
    Booking, BookingDirectory, BookingId, BookingStatus, CommitReport, PortError, StaffDirectory,
    StaffId, StaffMember, StatusChange, StatusCommitter,
};

/// In-memory store that can be told to fail.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    staff: HashMap<StaffId, StaffMember>,
    bookings: Vec<Booking>,
    unreachable: bool,
    stuck: HashSet<BookingId>,
    commits: usize,
}

impl MemoryStore {
    pub fn with_staff(self, staff: StaffMember) -> Self {
        self.inner.lock().unwrap().staff.insert(staff.id, staff);
        self
    }

    pub fn with_booking(self, booking: Booking) -> Self {
        self.inner.lock().unwrap().bookings.push(booking);
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unwrap().unreachable = unreachable;
    }

    /// Make unassigning this booking silently fail.
    pub fn stick(&self, booking_id: BookingId) {
        self.inner.lock().unwrap().stuck.insert(booking_id);
    }

    pub fn staff(&self, id: StaffId) -> StaffMember {
        self.inner.lock().unwrap().staff[&id].clone()
    }

    pub fn set_staff(&self, staff: StaffMember) {
        self.inner.lock().unwrap().staff.insert(staff.id, staff);
    }

    /// Assign a booking the way the booking service would, bypassing the roster.
    pub fn assign(&self, booking: Booking, staff_id: StaffId) {
        let mut inner = self.inner.lock().unwrap();
        assert!(inner.staff[&staff_id].is_active(), "staff member is active");
        inner.bookings.retain(|b| b.id != booking.id);
        inner.bookings.push(booking.assigned_to(staff_id));
    }

    pub fn booking(&self, id: BookingId) -> Booking {
        let inner = self.inner.lock().unwrap();
        inner
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .expect("booking exists")
    }

    pub fn commits(&self) -> usize {
        self.inner.lock().unwrap().commits
    }
}

impl StaffDirectory for MemoryStore {
    async fn staff_member(&self, id: StaffId) -> Result<Option<StaffMember>, PortError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(PortError::Unavailable("store offline".into()));
        }
        Ok(inner.staff.get(&id).cloned())
    }

    async fn roster(&self) -> Result<Vec<StaffMember>, PortError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(PortError::Unavailable("store offline".into()));
        }
        Ok(inner.staff.values().cloned().collect())
    }
}

impl BookingDirectory for MemoryStore {
    async fn bookings_for_staff(
        &self,
        staff_id: StaffId,
        from: NaiveDate,
    ) -> Result<Vec<Booking>, PortError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(PortError::Unavailable("store offline".into()));
        }
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.is_assigned_to(staff_id))
            .filter(|b| b.status == BookingStatus::InProgress || b.scheduled_date >= from)
            .cloned()
            .collect())
    }
}

impl StatusCommitter for MemoryStore {
    async fn commit(&self, change: &StatusChange) -> Result<CommitReport, PortError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(PortError::Unavailable("store offline".into()));
        }

        let staff = inner
            .staff
            .get_mut(&change.staff_id)
            .ok_or_else(|| PortError::NotFound(change.staff_id.to_string()))?;
        if staff.employment_status != change.from {
            return Err(PortError::Rejected("staff status changed since review".into()));
        }
        staff.employment_status = change.to;
        staff.leave = change.leave;

        let sweep = !change.to.is_active();
        let mut report = CommitReport::default();
        let stuck = inner.stuck.clone();
        for booking in inner.bookings.iter_mut() {
            let live = booking.status == BookingStatus::InProgress
                || (booking.status == BookingStatus::Scheduled
                    && booking.scheduled_date >= change.as_of);
            let affected = change.unassign.contains(&booking.id)
                || (sweep && live && booking.is_assigned_to(change.staff_id));
            if !affected {
                continue;
            }
            if stuck.contains(&booking.id) {
                report.still_assigned.push(booking.id);
            } else {
                booking.assigned_staff_id = None;
                report.unassigned.push(booking.id);
            }
        }
        inner.commits += 1;

        Ok(report)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(2026, 10, 17)
}

/// Send a message to the roster and wait for the reply.
pub async fn ask<T: Send + 'static>(
    roster: &ActorRef<RosterMessage>,
    build: impl FnOnce(RpcReplyPort<T>) -> RosterMessage,
) -> T {
    let (tx, rx) = actors::concurrency::oneshot();
    roster
        .send_message(build(tx.into()))
        .expect("roster is running");
    rx.await.expect("roster replied")
}
