//! Operator-tunable rules for status transitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{LeavePeriod, TransitionError};

/// How strictly leave periods are checked before a move to `OnLeave`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveValidation {
    /// Accept whatever the operator entered.
    #[default]
    Unvalidated,
    /// Reject periods whose end precedes their start.
    RejectInvertedRange,
    /// Also reject periods that start in the past.
    Strict,
}

/// Configuration for the status transition controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionPolicy {
    /// Leave period checks.
    pub leave_validation: LeaveValidation,
    /// Whether a move to `OnLeave` must carry a leave period.
    pub require_leave_period: bool,
}

impl TransitionPolicy {
    /// Set the leave validation level.
    pub fn with_leave_validation(mut self, validation: LeaveValidation) -> Self {
        self.leave_validation = validation;
        self
    }

    /// Require a leave period when moving to `OnLeave`.
    pub fn requiring_leave_period(mut self) -> Self {
        self.require_leave_period = true;
        self
    }

    /// Check a leave period proposed on `today`.
    pub fn check_leave(
        &self,
        leave: Option<&LeavePeriod>,
        today: NaiveDate,
    ) -> Result<(), TransitionError> {
        let Some(period) = leave else {
            return if self.require_leave_period {
                Err(TransitionError::LeavePeriodRequired)
            } else {
                Ok(())
            };
        };

        match self.leave_validation {
            LeaveValidation::Unvalidated => Ok(()),
            LeaveValidation::RejectInvertedRange | LeaveValidation::Strict
                if period.is_inverted() =>
            {
                Err(TransitionError::InvalidLeavePeriod {
                    period: *period,
                    reason: "end date is before start date",
                })
            }
            LeaveValidation::Strict if period.start < today => {
                Err(TransitionError::InvalidLeavePeriod {
                    period: *period,
                    reason: "start date is in the past",
                })
            }
            LeaveValidation::RejectInvertedRange | LeaveValidation::Strict => Ok(()),
        }
    }
}
