// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visit and request status tracking and transition logic.
//!
//! The visit lifecycle is a fixed table. Anything not listed in
//! [`VisitStatus::can_transition_to`] is rejected; the machine never tries to
//! infer what the caller meant.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle states of a maintenance visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Created by a non-supervisory role, waiting for approval.
    Pending,
    /// Approved and booked for a date.
    Scheduled,
    /// An engineer verified the device on site and started work.
    InProgress,
    /// Work stopped until spare parts arrive.
    NeedsSpareParts,
    /// Work needs a follow-up visit.
    NeedsSecondVisit,
    /// Kept for records imported with this status. No transitions lead here.
    Rescheduled,
    /// Work finished.
    Completed,
    /// Visit abandoned. Retained for audit.
    Cancelled,
}

impl VisitStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Pending,
        Self::Scheduled,
        Self::InProgress,
        Self::NeedsSpareParts,
        Self::NeedsSecondVisit,
        Self::Rescheduled,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::NeedsSpareParts => "needs_spare_parts",
            Self::NeedsSecondVisit => "needs_second_visit",
            Self::Rescheduled => "rescheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidVisitStatus(s.to_string()))
    }

    /// Returns true if no further work happens on a visit in this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Checks the lifecycle table.
    ///
    /// Legal transitions:
    /// - `Pending` → `Scheduled` (approval)
    /// - `Scheduled` → `InProgress` (verified start)
    /// - `InProgress` → `Completed` | `NeedsSpareParts` | `NeedsSecondVisit` | `Cancelled`
    /// - `Pending` | `Scheduled` → `Cancelled`
    /// - `NeedsSpareParts` | `NeedsSecondVisit` → `Scheduled` (rebooking)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Scheduled)
                | (Self::Scheduled, Self::InProgress)
                | (
                    Self::InProgress,
                    Self::Completed
                        | Self::NeedsSpareParts
                        | Self::NeedsSecondVisit
                        | Self::Cancelled
                )
                | (Self::Pending | Self::Scheduled, Self::Cancelled)
                | (Self::NeedsSpareParts | Self::NeedsSecondVisit, Self::Scheduled)
        )
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// Pure: no persistence access, no side effects.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the pair is not in the table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Lists the statuses reachable from this one.
    #[must_use]
    pub fn legal_targets(&self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|target| self.can_transition_to(*target))
            .collect()
    }
}

impl FromStr for VisitStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the maintenance request a visit belongs to.
///
/// The request status follows its visits; it has no table of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Raised, no visit booked yet.
    Open,
    /// A visit is waiting for approval.
    AwaitingApproval,
    /// A visit is booked.
    Scheduled,
    /// A visit is being worked.
    InProgress,
    /// Blocked on parts or a follow-up visit.
    OnHold,
    /// The engineer could not complete the work; a supervisor must review.
    UnderReview,
    /// Work done.
    Completed,
    /// Request withdrawn.
    Cancelled,
}

impl RequestStatus {
    const ALL: [Self; 8] = [
        Self::Open,
        Self::AwaitingApproval,
        Self::Scheduled,
        Self::InProgress,
        Self::OnHold,
        Self::UnderReview,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::UnderReview => "under_review",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if the request no longer counts towards anyone's workload.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidRequestStatus(s.to_string()))
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
