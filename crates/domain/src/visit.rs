// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The visit aggregate.
//!
//! A visit is only mutated through the methods here, which keep the
//! timestamp and assignment invariants:
//! - `started_at` is set exactly when the status has passed `InProgress`
//! - `completed_at` is set exactly when the status is `Completed`
//! - engineer ids in `assignments` are unique

use crate::error::DomainError;
use crate::status::{RequestStatus, VisitStatus};
use crate::ticket::TicketNumber;
use crate::types::{CustomerId, DeviceId, EngineerId, RequestId, UserId, VisitId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// How a visit came to be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOrigin {
    /// Booked from a sales offer (installation, commissioning).
    Sales,
    /// Booked from a support call.
    Support,
    /// Booked under a preventive maintenance contract.
    Contract,
}

impl VisitOrigin {
    /// Returns the string representation of the origin.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Support => "support",
            Self::Contract => "contract",
        }
    }
}

impl FromStr for VisitOrigin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(Self::Sales),
            "support" => Ok(Self::Support),
            "contract" => Ok(Self::Contract),
            _ => Err(DomainError::InvalidOrigin(s.to_string())),
        }
    }
}

/// Result classification reported by the engineer once work has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOutcome {
    Completed,
    NeedsSpareParts,
    NeedsSecondVisit,
    /// The engineer could not do the work; a supervisor decides what happens next.
    CannotComplete,
}

impl VisitOutcome {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NeedsSpareParts => "needs_spare_parts",
            Self::NeedsSecondVisit => "needs_second_visit",
            Self::CannotComplete => "cannot_complete",
        }
    }

    /// The visit status this outcome moves the visit to, if any.
    ///
    /// `CannotComplete` leaves the visit where it is.
    #[must_use]
    pub const fn target_status(&self) -> Option<VisitStatus> {
        match self {
            Self::Completed => Some(VisitStatus::Completed),
            Self::NeedsSpareParts => Some(VisitStatus::NeedsSpareParts),
            Self::NeedsSecondVisit => Some(VisitStatus::NeedsSecondVisit),
            Self::CannotComplete => None,
        }
    }

    /// The status the owning request takes when this outcome is recorded.
    #[must_use]
    pub const fn request_status(&self) -> RequestStatus {
        match self {
            Self::Completed => RequestStatus::Completed,
            Self::NeedsSpareParts | Self::NeedsSecondVisit => RequestStatus::OnHold,
            Self::CannotComplete => RequestStatus::UnderReview,
        }
    }
}

impl FromStr for VisitOutcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "needs_spare_parts" => Ok(Self::NeedsSpareParts),
            "needs_second_visit" => Ok(Self::NeedsSecondVisit),
            "cannot_complete" => Ok(Self::CannotComplete),
            _ => Err(DomainError::InvalidOutcome(s.to_string())),
        }
    }
}

/// One engineer on a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub visit_id: VisitId,
    pub engineer_id: EngineerId,
    pub assigned_by: UserId,
    #[serde(with = "time::serde::rfc3339")]
    pub assigned_at: OffsetDateTime,
}

/// Fields supplied when booking a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub ticket_number: TicketNumber,
    pub request_id: RequestId,
    pub customer_id: CustomerId,
    pub device_id: DeviceId,
    pub scheduled_for: OffsetDateTime,
    pub origin: VisitOrigin,
    pub status: VisitStatus,
    pub is_paid: bool,
    pub cost_cents: Option<i64>,
}

/// A scheduled or performed maintenance visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub ticket_number: TicketNumber,
    pub request_id: RequestId,
    pub customer_id: CustomerId,
    pub device_id: DeviceId,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_for: OffsetDateTime,
    pub origin: VisitOrigin,
    pub status: VisitStatus,
    pub primary_engineer: Option<EngineerId>,
    /// Ordered by assignment time.
    pub assignments: Vec<Assignment>,
    pub is_paid: bool,
    pub cost_cents: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub outcome: Option<VisitOutcome>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Visit {
    /// Creates a visit with no engineers.
    #[must_use]
    pub fn new(id: VisitId, fields: NewVisit, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            ticket_number: fields.ticket_number,
            request_id: fields.request_id,
            customer_id: fields.customer_id,
            device_id: fields.device_id,
            scheduled_for: fields.scheduled_for,
            origin: fields.origin,
            status: fields.status,
            primary_engineer: None,
            assignments: Vec::new(),
            is_paid: fields.is_paid,
            cost_cents: fields.cost_cents,
            started_at: None,
            completed_at: None,
            outcome: None,
            created_at,
        }
    }

    /// Moves the visit to `target` and stamps the lifecycle timestamps.
    ///
    /// Returns the previous status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the move is not in the
    /// lifecycle table. The visit is left untouched in that case.
    pub fn transition_to(
        &mut self,
        target: VisitStatus,
        at: OffsetDateTime,
    ) -> Result<VisitStatus, DomainError> {
        self.status.validate_transition(target)?;
        let previous = self.status;
        self.status = target;
        if target == VisitStatus::InProgress {
            self.started_at = Some(at);
        }
        if target == VisitStatus::Completed {
            self.completed_at = Some(at);
        }
        if target == VisitStatus::Scheduled {
            self.outcome = None;
        }
        Ok(previous)
    }

    /// Returns the engineer ids in assignment order.
    #[must_use]
    pub fn engineer_ids(&self) -> Vec<EngineerId> {
        self.assignments.iter().map(|a| a.engineer_id).collect()
    }

    /// True if the engineer is the primary engineer or in the assignment set.
    #[must_use]
    pub fn is_assigned(&self, engineer: EngineerId) -> bool {
        self.primary_engineer == Some(engineer)
            || self.assignments.iter().any(|a| a.engineer_id == engineer)
    }

    /// True if the engineer counts towards this visit's workload.
    #[must_use]
    pub fn is_open_for(&self, engineer: EngineerId) -> bool {
        !self.status.is_terminal() && self.is_assigned(engineer)
    }

    /// Replaces the assignment set.
    ///
    /// Duplicate ids are collapsed, keeping the first occurrence. The first
    /// engineer becomes primary only if the visit had no primary yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or the visit is closed.
    pub fn replace_assignments(
        &mut self,
        engineers: &[EngineerId],
        assigned_by: UserId,
        at: OffsetDateTime,
    ) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::AssignmentsFrozen {
                status: self.status,
            });
        }

        let mut unique: Vec<EngineerId> = Vec::with_capacity(engineers.len());
        for engineer in engineers {
            if !unique.contains(engineer) {
                unique.push(*engineer);
            }
        }
        let Some(first) = unique.first().copied() else {
            return Err(DomainError::EmptyAssignment);
        };

        self.assignments = unique
            .into_iter()
            .map(|engineer_id| Assignment {
                visit_id: self.id,
                engineer_id,
                assigned_by,
                assigned_at: at,
            })
            .collect();

        if self.primary_engineer.is_none() {
            self.primary_engineer = Some(first);
        }
        Ok(())
    }
}
