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
mod error;
mod reference;
mod role;
mod status;
mod ticket;
mod types;
mod visit;

pub use assignment::{least_loaded, matching_engineers, workload_of};
pub use error::DomainError;
pub use reference::{Device, DeviceOwner, Engineer, Facility, MaintenanceRequest, codes_match};
pub use role::Role;
pub use status::{RequestStatus, VisitStatus};
pub use ticket::{MAX_TICKET_SUFFIX, TicketNumber};
pub use types::{CustomerId, DeviceId, EngineerId, FacilityId, RequestId, UserId, VisitId};
pub use visit::{Assignment, NewVisit, Visit, VisitOrigin, VisitOutcome};
