#![allow(clippy::disallowed_methods)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use actors::{RosterConfig, RosterMessage, TransitionReply, global_registry, start_roster};
use common::{MemoryStore, ask, date, today};
use tokio::sync::broadcast;
use workforce_core::{
    Booking, BookingStatus, EmploymentStatus, LeavePeriod, LeaveValidation, StaffEvent, StaffMember,
    TransitionOutcome, TransitionPolicy, WorkStatus,
};

async fn next_event(rx: &mut broadcast::Receiver<StaffEvent>) -> StaffEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event arrives in time")
        .expect("event channel open")
}

#[tokio::test]
async fn test_suspension_takes_staff_off_the_job() {
    let staff = StaffMember::new("Dana Reyes", "Technician", "dana@example.com");
    let b1 = Booking::new("B1", today())
        .with_status(BookingStatus::InProgress)
        .assigned_to(staff.id);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(b1.clone()),
    );

    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    let (tx, mut rx) = broadcast::channel(16);
    roster
        .send_message(RosterMessage::Subscribe { sender: tx })
        .expect("roster is running");

    let report = ask(&roster, |reply| RosterMessage::GetWorkStatus {
        staff_id: staff.id,
        today: today(),
        reply,
    })
    .await
    .expect("work status");
    assert_eq!(report.status, WorkStatus::OnJob);
    assert_eq!(report.booking, Some(b1.id));

    let reply = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Suspended,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("request accepted");
    let TransitionReply::Review { impact } = reply else {
        panic!("suspension should need review, got {:?}", reply);
    };
    assert_eq!(impact.in_progress, vec![b1.clone()]);
    assert!(impact.scheduled.is_empty());
    assert_eq!(impact.total_impact, 1);

    // Nothing changes until the operator confirms.
    assert_eq!(store.staff(staff.id).employment_status, EmploymentStatus::Active);
    assert_eq!(store.booking(b1.id).assigned_staff_id, Some(staff.id));

    let outcome = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("commit succeeds");
    assert!(matches!(outcome, TransitionOutcome::Applied { .. }));

    assert_eq!(store.staff(staff.id).employment_status, EmploymentStatus::Suspended);
    assert!(store.booking(b1.id).assigned_staff_id.is_none());

    let report = ask(&roster, |reply| RosterMessage::GetWorkStatus {
        staff_id: staff.id,
        today: today(),
        reply,
    })
    .await
    .expect("work status");
    assert_eq!(report.status, WorkStatus::Offline);

    let cached = ask(&roster, |reply| RosterMessage::GetStaff {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("staff is on the roster");
    assert_eq!(cached.employment_status, EmploymentStatus::Suspended);

    assert!(matches!(
        next_event(&mut rx).await,
        StaffEvent::TransitionRequested { total_impact: 1, .. }
    ));
    assert!(matches!(
        next_event(&mut rx).await,
        StaffEvent::EmploymentStatusChanged {
            old_status: EmploymentStatus::Active,
            new_status: EmploymentStatus::Suspended,
            ..
        }
    ));
    match next_event(&mut rx).await {
        StaffEvent::BookingUnassigned { booking_id, .. } => assert_eq!(booking_id, b1.id),
        other => panic!("expected an unassignment, got {:?}", other),
    }

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_cancel_changes_nothing() {
    let staff = StaffMember::new("Ari Cole", "Driver", "ari@example.com");
    let upcoming = Booking::new("BK-10", date(2026, 10, 20)).assigned_to(staff.id);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(upcoming.clone()),
    );
    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    let reply = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Inactive,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("request accepted");
    assert!(matches!(reply, TransitionReply::Review { .. }));

    // A second request while the review is open is refused.
    let again = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Suspended,
        leave: None,
        today: today(),
        reply,
    })
    .await;
    assert!(again.is_err());

    ask(&roster, |reply| RosterMessage::CancelTransition {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("cancel succeeds");

    assert_eq!(store.commits(), 0);
    assert_eq!(store.staff(staff.id).employment_status, EmploymentStatus::Active);
    assert_eq!(store.booking(upcoming.id).assigned_staff_id, Some(staff.id));

    let report = ask(&roster, |reply| RosterMessage::GetWorkStatus {
        staff_id: staff.id,
        today: today(),
        reply,
    })
    .await
    .expect("work status");
    assert_eq!(report.status, WorkStatus::Assigned);

    // Nothing left to confirm.
    let confirm = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await;
    assert!(confirm.is_err());

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_unreachable_store_keeps_review_open() {
    let staff = StaffMember::new("Dana Reyes", "Technician", "dana@example.com");
    let upcoming = Booking::new("BK-20", date(2026, 10, 18)).assigned_to(staff.id);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(upcoming.clone()),
    );
    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Suspended,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("request accepted");

    store.set_unreachable(true);
    let failed = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await;
    let error = failed.expect_err("commit cannot reach the store");
    assert!(error.contains("store offline"));

    assert_eq!(store.staff(staff.id).employment_status, EmploymentStatus::Active);
    assert_eq!(store.booking(upcoming.id).assigned_staff_id, Some(staff.id));

    // The review is still open, so the operator can retry.
    store.set_unreachable(false);
    let outcome = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("retry succeeds");
    assert_eq!(outcome.change().to, EmploymentStatus::Suspended);
    assert!(store.booking(upcoming.id).assigned_staff_id.is_none());

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_partial_unassignment_is_reported() {
    let staff = StaffMember::new("Dana Reyes", "Technician", "dana@example.com");
    let first = Booking::new("BK-30", date(2026, 10, 18)).assigned_to(staff.id);
    let second = Booking::new("BK-31", date(2026, 10, 19)).assigned_to(staff.id);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(first.clone())
            .with_booking(second.clone()),
    );
    store.stick(second.id);

    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Inactive,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("request accepted");

    let outcome = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("status still commits");

    match &outcome {
        TransitionOutcome::PartialFailure {
            unassigned,
            still_assigned,
            notice,
            ..
        } => {
            assert_eq!(unassigned, &vec![first.id]);
            assert_eq!(still_assigned, &vec![second.id]);
            assert!(notice.contains("BK-31"));
        }
        other => panic!("expected a partial failure, got {:?}", other),
    }
    assert_eq!(store.staff(staff.id).employment_status, EmploymentStatus::Inactive);

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_reactivation_commits_without_review() {
    let staff = StaffMember::new("Ari Cole", "Driver", "ari@example.com")
        .with_status(EmploymentStatus::Suspended);
    let released = Booking::new("BK-40", date(2026, 10, 20));
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(released.clone()),
    );
    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    let reply = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Active,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("reactivation accepted");

    let TransitionReply::Committed { outcome } = reply else {
        panic!("reactivation should commit straight away, got {:?}", reply);
    };
    assert!(outcome.notice().contains("remain unassigned"));
    assert_eq!(store.staff(staff.id).employment_status, EmploymentStatus::Active);
    assert!(store.booking(released.id).assigned_staff_id.is_none());

    let same = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Active,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("no-op accepted");
    assert_eq!(same, TransitionReply::NoChange);
    assert_eq!(store.commits(), 1);

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_leave_policy_comes_from_config() {
    let staff = StaffMember::new("Dana Reyes", "Technician", "dana@example.com");
    let store = Arc::new(MemoryStore::default().with_staff(staff.clone()));
    let config = RosterConfig::default().with_policy(
        TransitionPolicy::default().with_leave_validation(LeaveValidation::RejectInvertedRange),
    );
    let (roster, _handle) = start_roster(store.clone(), config)
        .await
        .expect("roster starts");

    let inverted = LeavePeriod::between(date(2026, 11, 10), date(2026, 11, 1));
    let rejected = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::OnLeave,
        leave: Some(inverted),
        today: today(),
        reply,
    })
    .await;
    assert!(rejected.is_err());

    let leave = LeavePeriod::between(date(2026, 11, 1), date(2026, 11, 10));
    let reply = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::OnLeave,
        leave: Some(leave),
        today: today(),
        reply,
    })
    .await
    .expect("valid leave accepted");
    let TransitionReply::Review { impact } = reply else {
        panic!("leave should need review, got {:?}", reply);
    };
    assert!(impact.is_empty());

    ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("commit succeeds");
    assert_eq!(store.staff(staff.id).leave, Some(leave));

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_stats_and_registration() {
    let idle = StaffMember::new("Alex Idle", "Technician", "alex@example.com");
    let busy = StaffMember::new("Blair Busy", "Technician", "blair@example.com");
    let away = StaffMember::new("Casey Away", "Driver", "casey@example.com")
        .with_status(EmploymentStatus::OnLeave);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(idle.clone())
            .with_staff(busy.clone())
            .with_staff(away.clone())
            .with_booking(Booking::new("BK-50", date(2026, 10, 19)).assigned_to(busy.id)),
    );
    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    let stats = ask(&roster, |reply| RosterMessage::GetStats {
        today: today(),
        reply,
    })
    .await;
    assert_eq!(stats.available, 1);
    assert_eq!(stats.assigned, 1);
    assert_eq!(stats.offline, 1);
    assert_eq!(stats.total(), 3);

    let names: Vec<String> = ask(&roster, |reply| RosterMessage::ListStaff { reply })
        .await
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Alex Idle", "Blair Busy", "Casey Away"]);
    assert!(global_registry().get_staff(busy.id).is_some());

    let hired = StaffMember::new("Drew New", "Technician", "drew@example.com");
    store.set_staff(hired.clone());
    ask(&roster, |reply| RosterMessage::RegisterStaff {
        staff: hired.clone(),
        reply,
    })
    .await
    .expect("new staff registered");
    let twice = ask(&roster, |reply| RosterMessage::RegisterStaff {
        staff: hired.clone(),
        reply,
    })
    .await;
    assert!(twice.is_err());

    let stats = ask(&roster, |reply| RosterMessage::GetStats {
        today: today(),
        reply,
    })
    .await;
    assert_eq!(stats.available, 2);

    let unknown = ask(&roster, |reply| RosterMessage::GetWorkStatus {
        staff_id: workforce_core::StaffId::new(),
        today: today(),
        reply,
    })
    .await;
    assert!(unknown.expect_err("unknown staff").contains("not found"));

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_booking_assigned_during_review_is_unassigned() {
    let staff = StaffMember::new("Dana Reyes", "Technician", "dana@example.com");
    let b1 = Booking::new("BK-1", today())
        .with_status(BookingStatus::InProgress)
        .assigned_to(staff.id);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(b1.clone()),
    );
    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    let reply = ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Suspended,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("request accepted");
    assert!(matches!(reply, TransitionReply::Review { ref impact } if impact.total_impact == 1));

    let b2 = Booking::new("BK-2", date(2026, 10, 18));
    store.assign(b2.clone(), staff.id);

    let (tx, mut rx) = broadcast::channel(16);
    roster
        .send_message(RosterMessage::Subscribe { sender: tx })
        .expect("roster is running");

    let outcome = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("commit succeeds");
    let TransitionOutcome::Applied { unassigned, notice, .. } = &outcome else {
        panic!("expected a clean commit, got {:?}", outcome);
    };
    assert_eq!(unassigned.len(), 2);
    assert!(unassigned.contains(&b2.id));
    assert!(notice.contains("assigned after review"));

    assert!(store.booking(b1.id).assigned_staff_id.is_none());
    assert!(store.booking(b2.id).assigned_staff_id.is_none());

    assert!(matches!(
        next_event(&mut rx).await,
        StaffEvent::EmploymentStatusChanged { .. }
    ));
    let mut cleared = Vec::new();
    for _ in 0..2 {
        match next_event(&mut rx).await {
            StaffEvent::BookingUnassigned { booking_id, .. } => cleared.push(booking_id),
            other => panic!("expected an unassignment, got {:?}", other),
        }
    }
    assert!(cleared.contains(&b1.id) && cleared.contains(&b2.id));

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_refresh_picks_up_outside_changes() {
    let staff = StaffMember::new("Ari Cole", "Driver", "ari@example.com");
    let upcoming = Booking::new("BK-60", date(2026, 10, 20)).assigned_to(staff.id);
    let store = Arc::new(
        MemoryStore::default()
            .with_staff(staff.clone())
            .with_booking(upcoming),
    );
    let (roster, _handle) = start_roster(store.clone(), RosterConfig::default())
        .await
        .expect("roster starts");

    ask(&roster, |reply| RosterMessage::RequestTransition {
        staff_id: staff.id,
        target: EmploymentStatus::Inactive,
        leave: None,
        today: today(),
        reply,
    })
    .await
    .expect("request accepted");
    let pending = ask(&roster, |reply| RosterMessage::GetPendingImpact {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("staff actor answers");
    assert_eq!(pending.map(|impact| impact.total_impact), Some(1));

    // Another operator suspends Ari directly in the store.
    store.set_staff(staff.clone().with_status(EmploymentStatus::Suspended));

    let refreshed = ask(&roster, |reply| RosterMessage::RefreshStaff {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("refresh succeeds");
    assert_eq!(refreshed.employment_status, EmploymentStatus::Suspended);

    let cached = ask(&roster, |reply| RosterMessage::GetStaff {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("staff is on the roster");
    assert_eq!(cached.employment_status, EmploymentStatus::Suspended);

    // The stale review was dropped.
    let pending = ask(&roster, |reply| RosterMessage::GetPendingImpact {
        staff_id: staff.id,
        reply,
    })
    .await
    .expect("staff actor answers");
    assert!(pending.is_none());
    let confirm = ask(&roster, |reply| RosterMessage::ConfirmTransition {
        staff_id: staff.id,
        reply,
    })
    .await;
    assert!(confirm.is_err());
    assert_eq!(store.commits(), 0);

    let unknown = ask(&roster, |reply| RosterMessage::RefreshStaff {
        staff_id: workforce_core::StaffId::new(),
        reply,
    })
    .await;
    assert!(unknown.is_err());

    roster.send_message(RosterMessage::Shutdown).ok();
}

#[tokio::test]
async fn test_roster_needs_a_reachable_store() {
    let store = Arc::new(MemoryStore::default());
    store.set_unreachable(true);

    let result = start_roster(store, RosterConfig::default()).await;
    assert!(result.is_err());
}
