// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, SeedData};
use fieldvisit::{
    Cache, CreateVisit, DispatchError, DomainEvent, EventSink, MokaCache, Notifier, TracingNotifier,
    VisitConfig, VisitService,
};
use fieldvisit_audit::Actor;
use fieldvisit_domain::{
    CustomerId, Device, DeviceId, DeviceOwner, Engineer, EngineerId, Facility, FacilityId,
    MaintenanceRequest, NewVisit, RequestId, RequestStatus, Role, TicketNumber, UserId, Visit,
    VisitId, VisitOrigin, VisitStatus,
};
use std::sync::{Arc, Mutex};
use time::macros::{date, datetime};

pub const FACILITY_DEVICE: DeviceId = DeviceId::new(100);
pub const FACILITY_CODE: &str = "ABC123";
pub const CUSTOMER_DEVICE: DeviceId = DeviceId::new(101);
pub const REQUEST: RequestId = RequestId::new(500);

pub fn engineer(id: i64, areas: &[&str], active: bool) -> Engineer {
    Engineer {
        id: EngineerId::new(id),
        name: format!("Engineer {id}"),
        coverage_areas: areas.iter().map(|area| (*area).to_string()).collect(),
        active,
    }
}

pub fn seed_data() -> SeedData {
    SeedData {
        facilities: vec![Facility {
            id: FacilityId::new(10),
            customer_id: CustomerId::new(1),
            name: String::from("Main Lab"),
            location: String::from("Nasr City, Cairo"),
        }],
        devices: vec![
            Device {
                id: FACILITY_DEVICE,
                customer_id: CustomerId::new(1),
                code: String::from(FACILITY_CODE),
                owner: DeviceOwner::Facility(FacilityId::new(10)),
            },
            Device {
                id: CUSTOMER_DEVICE,
                customer_id: CustomerId::new(1),
                code: String::from("CUST-1"),
                owner: DeviceOwner::Customer,
            },
        ],
        engineers: vec![
            engineer(1, &["Cairo", "Giza"], true),
            engineer(2, &["cairo"], true),
            engineer(3, &["Alexandria"], true),
            engineer(4, &["Cairo"], false),
        ],
        requests: vec![MaintenanceRequest {
            id: REQUEST,
            customer_id: CustomerId::new(1),
            status: RequestStatus::Open,
            created_by: UserId::new(901),
            description: String::from("Analyzer fails self-test"),
        }],
    }
}

pub fn seeded_persistence() -> Persistence {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.seed(&seed_data()).unwrap();
    persistence
}

/// A visit row ready for insertion, not yet stored.
pub fn draft_visit(suffix: u16, status: VisitStatus) -> Visit {
    Visit::new(
        VisitId::generate(),
        NewVisit {
            ticket_number: TicketNumber::compose("MV", date!(2026 - 06 - 01), suffix).unwrap(),
            request_id: REQUEST,
            customer_id: CustomerId::new(1),
            device_id: FACILITY_DEVICE,
            scheduled_for: datetime!(2026-06-01 09:00 UTC),
            origin: VisitOrigin::Contract,
            status,
            is_paid: false,
            cost_cents: None,
        },
        datetime!(2026-05-30 12:00 UTC),
    )
}

#[derive(Debug, Default)]
pub struct RecordingEvents {
    pub events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEvents {
    pub fn recorded(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEvents {
    fn dispatch(&self, event: DomainEvent) -> Result<(), DispatchError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct Harness {
    pub service: VisitService<Persistence>,
    pub events: Arc<RecordingEvents>,
    pub cache: Arc<MokaCache<Device>>,
}

impl Harness {
    pub fn new() -> Self {
        let events: Arc<RecordingEvents> = Arc::new(RecordingEvents::default());
        let cache: Arc<MokaCache<Device>> = Arc::new(MokaCache::new(100));
        let service: VisitService<Persistence> = VisitService::new(
            seeded_persistence(),
            &VisitConfig::default(),
            Arc::clone(&cache) as Arc<dyn Cache<Device>>,
            Arc::clone(&events) as Arc<dyn EventSink>,
            Arc::new(TracingNotifier) as Arc<dyn Notifier>,
        );
        Self {
            service,
            events,
            cache,
        }
    }

    pub fn store(&self) -> &Persistence {
        self.service.store()
    }
}

pub fn create_command(device: DeviceId) -> CreateVisit {
    CreateVisit {
        request_id: REQUEST,
        device_id: device,
        scheduled_for: datetime!(2026-06-01 09:00 UTC),
        origin: VisitOrigin::Support,
        is_paid: true,
        cost_cents: Some(15_000),
        note: Some(String::from("booked by phone")),
    }
}

pub const fn manager() -> Actor {
    Actor::new(UserId::new(900), Role::Manager)
}

pub const fn sales() -> Actor {
    Actor::new(UserId::new(901), Role::Sales)
}

pub const fn engineer_actor(id: i64) -> Actor {
    Actor::new(UserId::new(id), Role::Engineer)
}
