//! SurrealDB-backed implementation of the workforce storage interfaces.

use chrono::NaiveDate;
use serde::Deserialize;
use ulid::Ulid;
use workforce_core::{
    Booking, BookingDirectory, BookingId, CommitReport, PortError, StaffDirectory, StaffId,
    StaffMember, StatusChange, StatusCommitter,
};

use crate::repositories::{BookingRepository, StaffRepository, StatusHistoryEntry};
use crate::{DbError, get_db};

/// Message thrown inside the commit transaction when the staff record no
/// longer holds the status the change was reviewed against.
const STALE_STATUS: &str = "staff status changed since review";

/// Status update, unassignment and audit row in one transaction.
///
/// Besides the reviewed bookings, a move away from active (`$sweep`) clears
/// every live booking still assigned to the staff member, so an assignment
/// made between review and confirm cannot survive the change.
const COMMIT_QUERY: &str = r#"
BEGIN TRANSACTION;
LET $updated = (
    UPDATE type::thing('staff', $staff_id)
    SET employment_status = $to_status,
        leave_start = $leave_start,
        leave_end = $leave_end,
        updated_at = time::now()
    WHERE employment_status = $from_status
    RETURN AFTER
);
IF array::len($updated) = 0 {
    THROW "staff status changed since review";
};
LET $cleared = (
    UPDATE booking
    SET assigned_staff_id = NONE, updated_at = time::now()
    WHERE assigned_staff_id = $staff_id
        AND (
            record::id(id) IN $booking_ids
            OR ($sweep AND (
                status = "in_progress"
                OR (status = "scheduled" AND scheduled_date >= $as_of)
            ))
        )
    RETURN BEFORE
);
CREATE type::thing('staff_status_history', $history_id) CONTENT $history;
UPDATE type::thing('staff_status_history', $history_id)
    SET bookings = (SELECT VALUE record::id(id) FROM $cleared);
COMMIT TRANSACTION;
"#;

/// Bookings the commit should have cleared that still name the staff member.
const STILL_ASSIGNED_QUERY: &str = r#"
SELECT record::id(id) AS key FROM booking
WHERE assigned_staff_id = $staff_id
    AND (
        record::id(id) IN $booking_ids
        OR ($sweep AND (
            status = "in_progress"
            OR (status = "scheduled" AND scheduled_date >= $as_of)
        ))
    )
"#;

/// Applies status changes and serves staff and booking lookups from SurrealDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionStore;

impl TransitionStore {
    /// Apply a confirmed change.
    ///
    /// The staff update, the unassignments and the history row commit
    /// together or not at all. The staff status is checked inside the
    /// transaction, so a change reviewed against a status that no longer
    /// holds is rolled back. Afterwards the affected bookings are re-read so
    /// any that still point at the staff member are reported.
    pub async fn apply(change: &StatusChange) -> Result<CommitReport, DbError> {
        let db = get_db()?;

        if !StaffRepository::exists(change.staff_id).await? {
            return Err(DbError::NotFound(format!(
                "Staff not found: {}",
                change.staff_id
            )));
        }

        let sweep = !change.to.is_active();
        let booking_ids: Vec<String> = change.unassign.iter().map(|id| id.to_string()).collect();
        let history_id = Ulid::new().to_string();
        let history = StatusHistoryEntry {
            staff_id: change.staff_id.to_string(),
            from_status: change.from,
            to_status: change.to,
            leave_start: change.leave.map(|l| l.start),
            leave_end: change.leave.and_then(|l| l.end),
            bookings: booking_ids.clone(),
            requested_at: change.requested_at.to_rfc3339(),
            committed_at: None,
        };

        tracing::info!(
            "Committing staff {} {} -> {} ({} reviewed booking(s) to unassign)",
            change.staff_id,
            change.from,
            change.to,
            booking_ids.len()
        );

        let mut response = db
            .query(COMMIT_QUERY)
            .bind(("staff_id", change.staff_id.to_string()))
            .bind(("from_status", change.from))
            .bind(("to_status", change.to))
            .bind(("leave_start", change.leave.map(|l| l.start.to_string())))
            .bind((
                "leave_end",
                change.leave.and_then(|l| l.end).map(|d| d.to_string()),
            ))
            .bind(("booking_ids", booking_ids.clone()))
            .bind(("sweep", sweep))
            .bind(("as_of", change.as_of.to_string()))
            .bind(("history_id", history_id.clone()))
            .bind(("history", history))
            .await?;

        // A cancelled transaction reports an error for every statement.
        let errors = response.take_errors();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.values().map(|e| e.to_string()).collect();
            tracing::warn!(
                "Commit for staff {} rolled back: {}",
                change.staff_id,
                messages.join("; ")
            );
            return Err(if messages.iter().any(|m| m.contains(STALE_STATUS)) {
                DbError::Query(format!(
                    "Staff {} status changed since review",
                    change.staff_id
                ))
            } else {
                DbError::Query(format!("Commit rolled back: {}", messages.join("; ")))
            });
        }

        let entry: Option<StatusHistoryEntry> =
            db.select(("staff_status_history", history_id)).await?;
        let cleared = entry
            .ok_or_else(|| DbError::Query("Committed change left no history row".into()))?
            .bookings;

        let still_assigned = Self::still_assigned(change, booking_ids, sweep).await?;
        let unassigned: Vec<BookingId> = parse_booking_ids(cleared)?
            .into_iter()
            .filter(|id| !still_assigned.contains(id))
            .collect();

        let late = unassigned
            .iter()
            .filter(|id| !change.unassign.contains(*id))
            .count();
        if late > 0 {
            tracing::info!(
                "Staff {}: cleared {} booking(s) assigned after review",
                change.staff_id,
                late
            );
        }
        if !still_assigned.is_empty() {
            tracing::warn!(
                "Staff {} still assigned to {} booking(s) after commit",
                change.staff_id,
                still_assigned.len()
            );
        }

        Ok(CommitReport {
            unassigned,
            still_assigned,
        })
    }

    async fn still_assigned(
        change: &StatusChange,
        booking_ids: Vec<String>,
        sweep: bool,
    ) -> Result<Vec<BookingId>, DbError> {
        if booking_ids.is_empty() && !sweep {
            return Ok(Vec::new());
        }

        let db = get_db()?;

        let mut result = db
            .query(STILL_ASSIGNED_QUERY)
            .bind(("staff_id", change.staff_id.to_string()))
            .bind(("booking_ids", booking_ids))
            .bind(("sweep", sweep))
            .bind(("as_of", change.as_of.to_string()))
            .await?;

        #[derive(Deserialize)]
        struct KeyRow {
            key: String,
        }

        let rows: Vec<KeyRow> = result.take(0)?;

        parse_booking_ids(rows.into_iter().map(|row| row.key))
    }
}

fn parse_booking_ids(keys: impl IntoIterator<Item = String>) -> Result<Vec<BookingId>, DbError> {
    keys.into_iter()
        .map(|key| {
            BookingId::parse(&key)
                .map_err(|e| DbError::Serialization(format!("Bad booking id {}: {}", key, e)))
        })
        .collect()
}

impl StaffDirectory for TransitionStore {
    async fn staff_member(&self, id: StaffId) -> Result<Option<StaffMember>, PortError> {
        match StaffRepository::get(id).await {
            Ok(staff) => Ok(Some(staff)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn roster(&self) -> Result<Vec<StaffMember>, PortError> {
        Ok(StaffRepository::list().await?)
    }
}

impl BookingDirectory for TransitionStore {
    async fn bookings_for_staff(
        &self,
        staff_id: StaffId,
        from: NaiveDate,
    ) -> Result<Vec<Booking>, PortError> {
        Ok(BookingRepository::for_staff(staff_id, from).await?)
    }
}

impl StatusCommitter for TransitionStore {
    async fn commit(&self, change: &StatusChange) -> Result<CommitReport, PortError> {
        Ok(Self::apply(change).await?)
    }
}
