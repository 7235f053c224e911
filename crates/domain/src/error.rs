// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::status::VisitStatus;
use crate::types::{CustomerId, DeviceId, EngineerId};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// The requested status change is not in the lifecycle table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: VisitStatus,
        /// The requested status.
        to: VisitStatus,
    },
    /// A visit status string could not be parsed.
    #[error("invalid visit status: {0}")]
    InvalidVisitStatus(String),
    /// A request status string could not be parsed.
    #[error("invalid request status: {0}")]
    InvalidRequestStatus(String),
    /// A visit outcome string could not be parsed.
    #[error("invalid visit outcome: {0}")]
    InvalidOutcome(String),
    /// A visit origin string could not be parsed.
    #[error("invalid visit origin: {0}")]
    InvalidOrigin(String),
    /// A role string could not be parsed.
    #[error("invalid role: {0}")]
    InvalidRole(String),
    /// A ticket number string does not have the `PREFIX-YYYYMMDD-NNNN` shape.
    #[error("invalid ticket number: {0}")]
    InvalidTicketNumber(String),
    /// A ticket suffix outside `0..=9999` was supplied.
    #[error("ticket suffix {0} does not fit in four digits")]
    TicketSuffixOutOfRange(u16),
    /// Manual assignment was requested with no engineers.
    #[error("at least one engineer must be assigned")]
    EmptyAssignment,
    /// The device does not belong to the customer that raised the request.
    #[error("device {device} does not belong to customer {customer}")]
    DeviceCustomerMismatch {
        /// The device referenced by the command.
        device: DeviceId,
        /// The customer that owns the request.
        customer: CustomerId,
    },
    /// An outcome was recorded while the visit was not being worked.
    #[error("an outcome can only be recorded while in progress (status is {status})")]
    OutcomeNotAllowed {
        /// The visit's status at the time of the attempt.
        status: VisitStatus,
    },
    /// Assignments cannot change once a visit is closed.
    #[error("visit is {status}; assignments are frozen")]
    AssignmentsFrozen {
        /// The terminal status of the visit.
        status: VisitStatus,
    },
    /// An engineer referenced by an assignment is deactivated.
    #[error("engineer {0} is not active")]
    InactiveEngineer(EngineerId),
}
