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

mod assignment;
mod cache;
mod config;
mod devices;
mod error;
mod events;
mod orchestrator;
mod ports;
mod ticket;
mod verification;

#[cfg(test)]
mod tests;

pub use assignment::{assign_engineers, auto_assign, service_location};
pub use cache::{Cache, MokaCache};
pub use config::{ConfigError, VisitConfig};
pub use devices::{CachedDevices, DeviceLookup, StoreDevices, device_code_key, device_key};
pub use error::CoreError;
pub use events::{
    DispatchError, DomainEvent, EventDispatcher, EventHandler, EventSink, HandlerError,
    LoggingEventHandler, VisitScheduled,
};
pub use orchestrator::{CreateVisit, VisitService};
pub use ports::{
    AuditSink, Notification, Notifier, NotifyError, TracingNotifier, UnitOfWork, VisitStore,
};
pub use ticket::TicketGenerator;
pub use verification::verify_presence;
