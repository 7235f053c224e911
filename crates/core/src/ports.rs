// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Interfaces the orchestrator consumes.
//!
//! Storage is reached only through a [`UnitOfWork`] handed out by
//! [`VisitStore::atomically`]. There is no ambient transaction: whatever
//! happens inside the closure commits or rolls back together.

use crate::error::CoreError;
use fieldvisit_audit::AuditEntry;
use fieldvisit_domain::{
    Assignment, Device, DeviceId, Engineer, EngineerId, Facility, FacilityId, MaintenanceRequest,
    RequestId, RequestStatus, Role, TicketNumber, UserId, Visit, VisitId,
};
use std::collections::BTreeMap;

/// Append-only audit storage.
pub trait AuditSink {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be stored.
    fn record_transition(&mut self, entry: &AuditEntry) -> Result<(), CoreError>;

    /// Returns every entry for a visit, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the trail cannot be read.
    fn audit_trail(&mut self, visit_id: VisitId) -> Result<Vec<AuditEntry>, CoreError>;
}

/// Reads and writes available inside one atomic unit of work.
///
/// Lookups return `Ok(None)` for missing rows; the orchestrator decides
/// whether absence is an error.
pub trait UnitOfWork: AuditSink {
    /// Loads a visit with its assignments populated in assignment order.
    fn find_visit(&mut self, id: VisitId) -> Result<Option<Visit>, CoreError>;
    fn find_request(&mut self, id: RequestId) -> Result<Option<MaintenanceRequest>, CoreError>;
    fn find_device(&mut self, id: DeviceId) -> Result<Option<Device>, CoreError>;
    /// Case-insensitive lookup by registered device code.
    fn find_device_by_code(&mut self, code: &str) -> Result<Option<Device>, CoreError>;
    fn find_facility(&mut self, id: FacilityId) -> Result<Option<Facility>, CoreError>;
    fn find_engineer(&mut self, id: EngineerId) -> Result<Option<Engineer>, CoreError>;
    /// Active engineers in a stable order (ascending id).
    fn active_engineers(&mut self) -> Result<Vec<Engineer>, CoreError>;
    /// Non-terminal visits on which any of the engineers is primary or assigned.
    fn open_visits_for(&mut self, engineers: &[EngineerId]) -> Result<Vec<Visit>, CoreError>;
    fn ticket_exists(&mut self, ticket: &TicketNumber) -> Result<bool, CoreError>;
    /// Inserts the visit row. Assignments are written separately.
    fn insert_visit(&mut self, visit: &Visit) -> Result<(), CoreError>;
    /// Updates the visit row. Assignments are written separately.
    fn update_visit(&mut self, visit: &Visit) -> Result<(), CoreError>;
    /// Removes every assignment of the visit and inserts the given set.
    fn replace_assignments(
        &mut self,
        visit_id: VisitId,
        assignments: &[Assignment],
    ) -> Result<(), CoreError>;
    fn update_request_status(
        &mut self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), CoreError>;
}

/// Hands out units of work.
pub trait VisitStore: Send + Sync {
    /// Runs `work` atomically.
    ///
    /// If `work` returns an error every write it made is rolled back and the
    /// error is returned unchanged. Isolation is at least read-committed.
    ///
    /// # Errors
    ///
    /// Returns the error from `work`, or `CoreError::Persistence` if the
    /// transaction itself fails.
    fn atomically<T, F>(&self, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, CoreError>;
}

/// Message sent through the notification port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub metadata: BTreeMap<String, String>,
}

impl Notification {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Delivery failure reported by a notifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound user notifications. Best-effort from the orchestrator's view.
pub trait Notifier: Send + Sync {
    /// Notifies every user holding `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify_role(&self, role: Role, notification: &Notification) -> Result<(), NotifyError>;

    /// Notifies one user.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify_user(&self, user: UserId, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_role(&self, role: Role, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            role = %role,
            title = %notification.title,
            body = %notification.body,
            metadata = ?notification.metadata,
            "Role notification"
        );
        Ok(())
    }

    fn notify_user(&self, user: UserId, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = user.value(),
            title = %notification.title,
            body = %notification.body,
            metadata = ?notification.metadata,
            "User notification"
        );
        Ok(())
    }
}
