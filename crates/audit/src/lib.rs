// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

use fieldvisit_domain::{Role, UserId, VisitId, VisitStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Errors raised while reading audit values back from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    #[error("unknown audit action: {0}")]
    UnknownAction(String),
}

/// Represents the user performing an action.
///
/// The role is captured at the time of the action, so later role changes do
/// not rewrite history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// True if the actor may approve, assign, reschedule or cancel.
    #[must_use]
    pub fn is_supervisory(&self) -> bool {
        self.role.is_supervisory()
    }
}

/// The operation that produced an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Approve,
    Assign,
    Start,
    RecordOutcome,
    Reschedule,
    Cancel,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Approve => "approve",
            Self::Assign => "assign",
            Self::Start => "start",
            Self::RecordOutcome => "record_outcome",
            Self::Reschedule => "reschedule",
            Self::Cancel => "cancel",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "approve" => Ok(Self::Approve),
            "assign" => Ok(Self::Assign),
            "start" => Ok(Self::Start),
            "record_outcome" => Ok(Self::RecordOutcome),
            "reschedule" => Ok(Self::Reschedule),
            "cancel" => Ok(Self::Cancel),
            _ => Err(AuditError::UnknownAction(s.to_string())),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one mutation of a visit.
///
/// Every successful mutation produces exactly one entry:
/// - who performed it (actor)
/// - what was done (action)
/// - the status before and after
///
/// `old_status` is `None` only for the entry written when the visit is
/// created. Mutations that do not change status record equal old and new
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub visit_id: VisitId,
    pub actor: Actor,
    pub action: AuditAction,
    pub old_status: Option<VisitStatus>,
    pub new_status: VisitStatus,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl AuditEntry {
    /// Creates an entry for a status change.
    #[must_use]
    pub const fn transition(
        visit_id: VisitId,
        actor: Actor,
        action: AuditAction,
        old_status: VisitStatus,
        new_status: VisitStatus,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            visit_id,
            actor,
            action,
            old_status: Some(old_status),
            new_status,
            note: None,
            recorded_at,
        }
    }

    /// Creates the entry written when a visit is first persisted.
    #[must_use]
    pub const fn creation(
        visit_id: VisitId,
        actor: Actor,
        status: VisitStatus,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            visit_id,
            actor,
            action: AuditAction::Create,
            old_status: None,
            new_status: status,
            note: None,
            recorded_at,
        }
    }

    /// Attaches a free-text note. Blank notes are dropped.
    #[must_use]
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    /// True if the entry records a status change.
    #[must_use]
    pub fn changes_status(&self) -> bool {
        self.old_status != Some(self.new_status)
    }
}
