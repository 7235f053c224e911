// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain events and their best-effort background delivery.

use fieldvisit_domain::{
    CustomerId, DeviceId, EngineerId, TicketNumber, Visit, VisitId, VisitOrigin,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A visit landed in `Scheduled`.
///
/// Captured at emission time; later changes to the visit do not show up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitScheduled {
    pub visit_id: VisitId,
    pub ticket_number: TicketNumber,
    pub customer_id: CustomerId,
    pub device_id: DeviceId,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_for: OffsetDateTime,
    pub origin: VisitOrigin,
    pub engineer_ids: Vec<EngineerId>,
}

impl VisitScheduled {
    /// Snapshots a visit.
    #[must_use]
    pub fn snapshot(visit: &Visit) -> Self {
        Self {
            visit_id: visit.id,
            ticket_number: visit.ticket_number.clone(),
            customer_id: visit.customer_id,
            device_id: visit.device_id,
            scheduled_for: visit.scheduled_for,
            origin: visit.origin,
            engineer_ids: visit.engineer_ids(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    VisitScheduled(VisitScheduled),
}

impl DomainEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::VisitScheduled(_) => "visit_scheduled",
        }
    }

    #[must_use]
    pub const fn visit_id(&self) -> VisitId {
        match self {
            Self::VisitScheduled(event) => event.visit_id,
        }
    }
}

/// Why an event could not be handed off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("event queue is full")]
    QueueFull,
    #[error("event queue is closed")]
    Closed,
}

/// Accepts events after their unit of work has committed.
///
/// Implementations must not block the caller.
pub trait EventSink: Send + Sync {
    /// Hands an event off for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be queued. Callers log and
    /// continue.
    fn dispatch(&self, event: DomainEvent) -> Result<(), DispatchError>;
}

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Consumes events on the dispatcher's background task.
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Errors are logged by the dispatcher; the event is not redelivered.
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}

/// Handler that logs each event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let payload: String = serde_json::to_string(event)?;
        tracing::info!(event = event.name(), visit_id = %event.visit_id(), %payload, "Domain event");
        Ok(())
    }
}

/// Bounded queue drained by a background task.
///
/// Dropping every clone of the dispatcher closes the queue; the task drains
/// what is left and exits.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: mpsc::Sender<DomainEvent>,
}

impl EventDispatcher {
    /// Spawns the delivery task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if `capacity` is zero.
    pub fn spawn<H: EventHandler>(handler: H, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<DomainEvent>(capacity);
        let worker: JoinHandle<()> = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                if let Err(err) = handler.handle(&event) {
                    tracing::error!(
                        event = event.name(),
                        visit_id = %event.visit_id(),
                        error = %err,
                        "Event handler failed"
                    );
                }
            }
            tracing::debug!("Event dispatcher stopped");
        });
        (Self { sender }, worker)
    }
}

impl EventSink for EventDispatcher {
    fn dispatch(&self, event: DomainEvent) -> Result<(), DispatchError> {
        self.sender.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }
}
