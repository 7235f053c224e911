// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The visit service.
//!
//! Each public operation runs inside one unit of work. Events and
//! notifications go out only after that unit of work has committed, and
//! their failures are logged and swallowed.

use crate::assignment;
use crate::cache::Cache;
use crate::config::VisitConfig;
use crate::devices::{CachedDevices, DeviceLookup, StoreDevices};
use crate::error::CoreError;
use crate::events::{DomainEvent, EventSink, VisitScheduled};
use crate::ports::{Notification, Notifier, UnitOfWork, VisitStore};
use crate::ticket::TicketGenerator;
use crate::verification::verify_presence;
use fieldvisit_audit::{Actor, AuditAction, AuditEntry};
use fieldvisit_domain::{
    Device, DeviceId, DomainError, EngineerId, MaintenanceRequest, NewVisit, RequestId,
    RequestStatus, Role, TicketNumber, Visit, VisitId, VisitOrigin, VisitOutcome, VisitStatus,
};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

/// Input for [`VisitService::create_visit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVisit {
    pub request_id: RequestId,
    pub device_id: DeviceId,
    pub scheduled_for: OffsetDateTime,
    pub origin: VisitOrigin,
    pub is_paid: bool,
    pub cost_cents: Option<i64>,
    /// Stored on the creation audit entry.
    pub note: Option<String>,
}

fn load_visit(uow: &mut dyn UnitOfWork, id: VisitId) -> Result<Visit, CoreError> {
    uow.find_visit(id)?
        .ok_or_else(|| CoreError::not_found("visit", id))
}

fn load_request(
    uow: &mut dyn UnitOfWork,
    id: RequestId,
) -> Result<MaintenanceRequest, CoreError> {
    uow.find_request(id)?
        .ok_or_else(|| CoreError::not_found("request", id))
}

fn require_supervisory(actor: &Actor, action: &'static str) -> Result<(), CoreError> {
    if actor.is_supervisory() {
        Ok(())
    } else {
        Err(CoreError::NotPermitted {
            action,
            role: actor.role,
        })
    }
}

/// Orchestrates visits over a store, a device cache, an event sink and a
/// notifier.
pub struct VisitService<S> {
    store: S,
    tickets: TicketGenerator,
    devices: Arc<dyn Cache<Device>>,
    device_ttl: Duration,
    events: Arc<dyn EventSink>,
    notifier: Arc<dyn Notifier>,
}

impl<S: VisitStore> VisitService<S> {
    #[must_use]
    pub fn new(
        store: S,
        config: &VisitConfig,
        devices: Arc<dyn Cache<Device>>,
        events: Arc<dyn EventSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            tickets: TicketGenerator::new(config.ticket_prefix.clone(), config.ticket_max_attempts),
            devices,
            device_ttl: config.device_cache_ttl(),
            events,
            notifier,
        }
    }

    /// Replaces the ticket generator.
    #[must_use]
    pub fn with_ticket_generator(mut self, tickets: TicketGenerator) -> Self {
        self.tickets = tickets;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    fn device_lookup<'a>(
        &'a self,
        uow: &'a mut dyn UnitOfWork,
    ) -> CachedDevices<'a, StoreDevices<'a>> {
        CachedDevices::new(StoreDevices::new(uow), self.devices.as_ref(), self.device_ttl)
    }

    /// Books a visit for a request and device.
    ///
    /// The initial status comes from the actor's role. An engineer is
    /// auto-assigned when one covers the device's location.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing request or device, a domain violation
    /// if the device belongs to another customer, or `IdentifierExhausted` if
    /// no ticket number could be generated.
    pub fn create_visit(&self, command: CreateVisit, actor: &Actor) -> Result<Visit, CoreError> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let status: VisitStatus = actor.role.initial_visit_status();

        let visit: Visit = self.store.atomically(|uow| {
            let request: MaintenanceRequest = load_request(uow, command.request_id)?;
            let device: Device = self.device_lookup(uow).device(command.device_id)?;
            if device.customer_id != request.customer_id {
                return Err(DomainError::DeviceCustomerMismatch {
                    device: device.id,
                    customer: request.customer_id,
                }
                .into());
            }

            let ticket_number: TicketNumber = self
                .tickets
                .generate(now.date(), &mut |candidate| uow.ticket_exists(candidate))?;

            let mut visit: Visit = Visit::new(
                VisitId::generate(),
                NewVisit {
                    ticket_number,
                    request_id: request.id,
                    customer_id: request.customer_id,
                    device_id: device.id,
                    scheduled_for: command.scheduled_for,
                    origin: command.origin,
                    status,
                    is_paid: command.is_paid,
                    cost_cents: command.cost_cents,
                },
                now,
            );
            uow.insert_visit(&visit)?;
            uow.record_transition(
                &AuditEntry::creation(visit.id, *actor, status, now).with_note(command.note),
            )?;

            assignment::auto_assign(uow, &mut visit, &device, actor.id, now)?;

            let request_status: RequestStatus = if status == VisitStatus::Scheduled {
                RequestStatus::Scheduled
            } else {
                RequestStatus::AwaitingApproval
            };
            uow.update_request_status(request.id, request_status)?;
            Ok(visit)
        })?;

        tracing::info!(
            visit_id = %visit.id,
            ticket = %visit.ticket_number,
            status = %visit.status,
            actor_id = actor.id.value(),
            role = %actor.role,
            "Visit created"
        );

        if visit.status == VisitStatus::Scheduled {
            self.publish_scheduled(&visit);
        } else {
            self.notify_supervisors(&visit, "Visit awaiting approval");
        }
        self.notify_engineers(&visit, &visit.engineer_ids(), "New visit assigned");
        Ok(visit)
    }

    /// Approves a pending visit.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for non-supervisory roles, `NotFound` for an
    /// unknown visit, or `InvalidTransition` unless the visit is `Pending`.
    pub fn approve_visit(
        &self,
        visit_id: VisitId,
        actor: &Actor,
        note: Option<String>,
    ) -> Result<Visit, CoreError> {
        require_supervisory(actor, "approve visits")?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        let visit: Visit = self.store.atomically(|uow| {
            let mut visit: Visit = load_visit(uow, visit_id)?;
            if visit.status != VisitStatus::Pending {
                return Err(CoreError::InvalidTransition {
                    from: visit.status,
                    to: VisitStatus::Scheduled,
                });
            }
            let previous: VisitStatus = visit.transition_to(VisitStatus::Scheduled, now)?;
            uow.update_visit(&visit)?;
            uow.record_transition(
                &AuditEntry::transition(
                    visit.id,
                    *actor,
                    AuditAction::Approve,
                    previous,
                    visit.status,
                    now,
                )
                .with_note(note),
            )?;
            uow.update_request_status(visit.request_id, RequestStatus::Scheduled)?;
            Ok(visit)
        })?;

        tracing::info!(
            visit_id = %visit.id,
            ticket = %visit.ticket_number,
            actor_id = actor.id.value(),
            "Visit approved"
        );
        self.publish_scheduled(&visit);
        self.notify_engineers(&visit, &visit.engineer_ids(), "Visit approved");
        Ok(visit)
    }

    /// Replaces the engineers on a visit.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for non-supervisory roles, `NotFound` for an
    /// unknown visit or engineer, or a domain violation for an empty list,
    /// an inactive engineer or a closed visit.
    pub fn assign_engineers(
        &self,
        visit_id: VisitId,
        engineers: &[EngineerId],
        actor: &Actor,
        note: Option<String>,
    ) -> Result<Visit, CoreError> {
        require_supervisory(actor, "assign engineers")?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        let (visit, added) = self.store.atomically(|uow| {
            let mut visit: Visit = load_visit(uow, visit_id)?;
            let before: Vec<EngineerId> = visit.engineer_ids();
            assignment::assign_engineers(uow, &mut visit, engineers, actor.id, now)?;

            let note: Option<String> = note.or_else(|| {
                let ids: Vec<String> = visit
                    .engineer_ids()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                Some(format!("engineers: {}", ids.join(", ")))
            });
            uow.record_transition(
                &AuditEntry::transition(
                    visit.id,
                    *actor,
                    AuditAction::Assign,
                    visit.status,
                    visit.status,
                    now,
                )
                .with_note(note),
            )?;

            let added: Vec<EngineerId> = visit
                .engineer_ids()
                .into_iter()
                .filter(|id| !before.contains(id))
                .collect();
            Ok((visit, added))
        })?;

        tracing::info!(
            visit_id = %visit.id,
            engineers = ?visit.engineer_ids(),
            primary = ?visit.primary_engineer,
            actor_id = actor.id.value(),
            "Engineers assigned"
        );
        self.notify_engineers(&visit, &added, "New visit assigned");
        Ok(visit)
    }

    /// Starts work after the acting engineer proves presence at the device.
    ///
    /// The actor's user id is the acting engineer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the visit is `Scheduled`,
    /// `NotAssigned` if the engineer is not on the visit, or `CodeMismatch`
    /// if the scanned code is wrong.
    pub fn verify_and_start(
        &self,
        visit_id: VisitId,
        scanned_code: &str,
        actor: &Actor,
    ) -> Result<Visit, CoreError> {
        let engineer: EngineerId = EngineerId::from(actor.id);
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        let visit: Visit = self.store.atomically(|uow| {
            let mut visit: Visit = load_visit(uow, visit_id)?;
            visit.status.validate_transition(VisitStatus::InProgress)?;
            verify_presence(&visit, engineer, scanned_code, &mut self.device_lookup(uow))?;

            let previous: VisitStatus = visit.transition_to(VisitStatus::InProgress, now)?;
            uow.update_visit(&visit)?;
            uow.record_transition(&AuditEntry::transition(
                visit.id,
                *actor,
                AuditAction::Start,
                previous,
                visit.status,
                now,
            ))?;
            uow.update_request_status(visit.request_id, RequestStatus::InProgress)?;
            Ok(visit)
        })?;

        tracing::info!(
            visit_id = %visit.id,
            engineer_id = engineer.value(),
            "Visit started"
        );
        Ok(visit)
    }

    /// Records the result of work on an in-progress visit.
    ///
    /// `CannotComplete` leaves the visit status alone and puts the request
    /// on hold for review.
    ///
    /// # Errors
    ///
    /// Returns a domain violation unless the visit is `InProgress`, or
    /// `NotAssigned` if a non-supervisory actor is not on the visit.
    pub fn record_outcome(
        &self,
        visit_id: VisitId,
        outcome: VisitOutcome,
        actor: &Actor,
        note: Option<String>,
    ) -> Result<Visit, CoreError> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        let visit: Visit = self.store.atomically(|uow| {
            let mut visit: Visit = load_visit(uow, visit_id)?;
            if visit.status != VisitStatus::InProgress {
                return Err(DomainError::OutcomeNotAllowed {
                    status: visit.status,
                }
                .into());
            }
            if !actor.is_supervisory() && !visit.is_assigned(EngineerId::from(actor.id)) {
                return Err(CoreError::NotAssigned);
            }

            let previous: VisitStatus = visit.status;
            if let Some(target) = outcome.target_status() {
                visit.transition_to(target, now)?;
            }
            visit.outcome = Some(outcome);
            uow.update_visit(&visit)?;
            uow.record_transition(
                &AuditEntry::transition(
                    visit.id,
                    *actor,
                    AuditAction::RecordOutcome,
                    previous,
                    visit.status,
                    now,
                )
                .with_note(note.or_else(|| Some(outcome.as_str().to_string()))),
            )?;
            uow.update_request_status(visit.request_id, outcome.request_status())?;
            Ok(visit)
        })?;

        tracing::info!(
            visit_id = %visit.id,
            outcome = outcome.as_str(),
            status = %visit.status,
            actor_id = actor.id.value(),
            "Visit outcome recorded"
        );
        match outcome {
            VisitOutcome::Completed => {}
            VisitOutcome::CannotComplete => {
                self.notify_supervisors(&visit, "Visit needs review");
            }
            VisitOutcome::NeedsSpareParts | VisitOutcome::NeedsSecondVisit => {
                self.notify_supervisors(&visit, "Visit needs rebooking");
            }
        }
        Ok(visit)
    }

    /// Rebooks a visit that stopped for parts or a follow-up.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for non-supervisory roles or
    /// `InvalidTransition` unless the visit is waiting to be rebooked.
    pub fn reschedule_visit(
        &self,
        visit_id: VisitId,
        scheduled_for: OffsetDateTime,
        actor: &Actor,
        note: Option<String>,
    ) -> Result<Visit, CoreError> {
        require_supervisory(actor, "reschedule visits")?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        let visit: Visit = self.store.atomically(|uow| {
            let mut visit: Visit = load_visit(uow, visit_id)?;
            if !matches!(
                visit.status,
                VisitStatus::NeedsSpareParts | VisitStatus::NeedsSecondVisit
            ) {
                return Err(CoreError::InvalidTransition {
                    from: visit.status,
                    to: VisitStatus::Scheduled,
                });
            }
            let previous: VisitStatus = visit.transition_to(VisitStatus::Scheduled, now)?;
            visit.scheduled_for = scheduled_for;
            uow.update_visit(&visit)?;
            uow.record_transition(
                &AuditEntry::transition(
                    visit.id,
                    *actor,
                    AuditAction::Reschedule,
                    previous,
                    visit.status,
                    now,
                )
                .with_note(note),
            )?;
            uow.update_request_status(visit.request_id, RequestStatus::Scheduled)?;
            Ok(visit)
        })?;

        tracing::info!(
            visit_id = %visit.id,
            scheduled_for = %visit.scheduled_for,
            actor_id = actor.id.value(),
            "Visit rescheduled"
        );
        self.notify_engineers(&visit, &visit.engineer_ids(), "Visit rescheduled");
        Ok(visit)
    }

    /// Cancels an open visit. The owning request is left as is.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for non-supervisory roles or
    /// `InvalidTransition` if the visit cannot be cancelled from its status.
    pub fn cancel_visit(
        &self,
        visit_id: VisitId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Visit, CoreError> {
        require_supervisory(actor, "cancel visits")?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();

        let visit: Visit = self.store.atomically(|uow| {
            let mut visit: Visit = load_visit(uow, visit_id)?;
            let previous: VisitStatus = visit.transition_to(VisitStatus::Cancelled, now)?;
            uow.update_visit(&visit)?;
            uow.record_transition(
                &AuditEntry::transition(
                    visit.id,
                    *actor,
                    AuditAction::Cancel,
                    previous,
                    visit.status,
                    now,
                )
                .with_note(reason),
            )?;
            Ok(visit)
        })?;

        tracing::info!(
            visit_id = %visit.id,
            actor_id = actor.id.value(),
            "Visit cancelled"
        );
        self.notify_engineers(&visit, &visit.engineer_ids(), "Visit cancelled");
        Ok(visit)
    }

    /// Loads a visit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the visit does not exist.
    pub fn visit(&self, visit_id: VisitId) -> Result<Visit, CoreError> {
        self.store.atomically(|uow| load_visit(uow, visit_id))
    }

    /// Returns the audit history of a visit, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the visit does not exist.
    pub fn audit_trail(&self, visit_id: VisitId) -> Result<Vec<AuditEntry>, CoreError> {
        self.store.atomically(|uow| {
            load_visit(uow, visit_id)?;
            uow.audit_trail(visit_id)
        })
    }

    /// Finds a device by its label code, using the device cache.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no device carries the code.
    pub fn find_device_by_code(&self, code: &str) -> Result<Device, CoreError> {
        self.store
            .atomically(|uow| self.device_lookup(uow).device_by_code(code))
    }

    fn publish_scheduled(&self, visit: &Visit) {
        let event: DomainEvent = DomainEvent::VisitScheduled(VisitScheduled::snapshot(visit));
        if let Err(err) = self.events.dispatch(event) {
            tracing::warn!(
                visit_id = %visit.id,
                error = %err,
                "Failed to dispatch visit scheduled event"
            );
        }
    }

    fn visit_notification(visit: &Visit, title: &str) -> Notification {
        Notification::new(
            title,
            format!(
                "Visit {} for device {} is {} on {}",
                visit.ticket_number, visit.device_id, visit.status, visit.scheduled_for
            ),
        )
        .with("visit_id", visit.id)
        .with("ticket_number", &visit.ticket_number)
        .with("status", visit.status)
    }

    fn notify_supervisors(&self, visit: &Visit, title: &str) {
        let notification: Notification = Self::visit_notification(visit, title);
        for role in Role::supervisory_roles() {
            if let Err(err) = self.notifier.notify_role(role, &notification) {
                tracing::warn!(
                    visit_id = %visit.id,
                    role = %role,
                    error = %err,
                    "Failed to notify role"
                );
            }
        }
    }

    fn notify_engineers(&self, visit: &Visit, engineers: &[EngineerId], title: &str) {
        if engineers.is_empty() {
            return;
        }
        let notification: Notification = Self::visit_notification(visit, title);
        for engineer in engineers {
            if let Err(err) = self.notifier.notify_user((*engineer).into(), &notification) {
                tracing::warn!(
                    visit_id = %visit.id,
                    engineer_id = engineer.value(),
                    error = %err,
                    "Failed to notify engineer"
                );
            }
        }
    }
}
