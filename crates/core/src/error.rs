// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldvisit_domain::{DomainError, Role, VisitStatus};

/// Errors surfaced by orchestrator operations.
///
/// Every variant except `Persistence` is a business outcome the caller is
/// expected to handle. None of them are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A referenced visit, request, device, facility or engineer is absent.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity looked up.
        entity: &'static str,
        /// The identifier that was looked up, as text.
        id: String,
    },
    /// The lifecycle table rejects the requested move.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// The visit's current status.
        from: VisitStatus,
        /// The requested status.
        to: VisitStatus,
    },
    /// The acting engineer is neither primary nor in the assignment set.
    #[error("engineer is not assigned to this visit")]
    NotAssigned,
    /// The scanned code is not the device's registered code.
    #[error("scanned code does not match the device")]
    CodeMismatch,
    /// No free ticket number was found within the attempt budget.
    #[error("no unique ticket number after {attempts} attempts")]
    IdentifierExhausted {
        /// How many candidates were tried.
        attempts: u32,
    },
    /// The actor's role may not perform the action.
    #[error("{role} may not {action}")]
    NotPermitted {
        /// The attempted action.
        action: &'static str,
        /// The actor's role.
        role: Role,
    },
    /// A domain rule was violated.
    #[error("domain violation: {0}")]
    DomainViolation(DomainError),
    /// The storage backend failed. The unit of work was rolled back.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Builds a `NotFound` error for any displayable identifier.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            other => Self::DomainViolation(other),
        }
    }
}
