// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ports::AuditSink;
use crate::{
    Cache, CoreError, CreateVisit, DispatchError, DomainEvent, EventSink, MokaCache, Notification,
    Notifier, NotifyError, UnitOfWork, VisitConfig, VisitService, VisitStore,
};
use fieldvisit_audit::{Actor, AuditEntry};
use fieldvisit_domain::{
    Assignment, CustomerId, Device, DeviceId, DeviceOwner, Engineer, EngineerId, Facility,
    FacilityId, MaintenanceRequest, RequestId, RequestStatus, Role, TicketNumber, UserId, Visit,
    VisitId, VisitOrigin,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::macros::datetime;

pub const REQUEST: RequestId = RequestId::new(500);
pub const OTHER_CUSTOMER_REQUEST: RequestId = RequestId::new(501);
pub const FACILITY_DEVICE: DeviceId = DeviceId::new(100);
pub const CUSTOMER_DEVICE: DeviceId = DeviceId::new(101);
pub const FOREIGN_DEVICE: DeviceId = DeviceId::new(200);
pub const FACILITY_CODE: &str = "ABC123";

/// Whole-state copy used as the unit of work. Committing swaps it in.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub visits: BTreeMap<VisitId, Visit>,
    pub assignments: BTreeMap<VisitId, Vec<Assignment>>,
    pub requests: BTreeMap<RequestId, MaintenanceRequest>,
    pub devices: BTreeMap<DeviceId, Device>,
    pub facilities: BTreeMap<FacilityId, Facility>,
    pub engineers: BTreeMap<EngineerId, Engineer>,
    pub audit: Vec<AuditEntry>,
    pub device_reads: usize,
    pub fail_audit: bool,
}

impl StoreState {
    fn hydrate(&self, visit: &Visit) -> Visit {
        let mut visit: Visit = visit.clone();
        visit.assignments = self
            .assignments
            .get(&visit.id)
            .cloned()
            .unwrap_or_default();
        visit
    }

    fn store_row(&mut self, visit: &Visit) {
        let mut row: Visit = visit.clone();
        row.assignments.clear();
        self.visits.insert(row.id, row);
    }
}

impl AuditSink for StoreState {
    fn record_transition(&mut self, entry: &AuditEntry) -> Result<(), CoreError> {
        if self.fail_audit {
            return Err(CoreError::Persistence(String::from("audit table unavailable")));
        }
        self.audit.push(entry.clone());
        Ok(())
    }

    fn audit_trail(&mut self, visit_id: VisitId) -> Result<Vec<AuditEntry>, CoreError> {
        Ok(self
            .audit
            .iter()
            .filter(|entry| entry.visit_id == visit_id)
            .cloned()
            .collect())
    }
}

impl UnitOfWork for StoreState {
    fn find_visit(&mut self, id: VisitId) -> Result<Option<Visit>, CoreError> {
        Ok(self.visits.get(&id).map(|visit| self.hydrate(visit)))
    }

    fn find_request(&mut self, id: RequestId) -> Result<Option<MaintenanceRequest>, CoreError> {
        Ok(self.requests.get(&id).cloned())
    }

    fn find_device(&mut self, id: DeviceId) -> Result<Option<Device>, CoreError> {
        self.device_reads += 1;
        Ok(self.devices.get(&id).cloned())
    }

    fn find_device_by_code(&mut self, code: &str) -> Result<Option<Device>, CoreError> {
        self.device_reads += 1;
        Ok(self
            .devices
            .values()
            .find(|device| device.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    fn find_facility(&mut self, id: FacilityId) -> Result<Option<Facility>, CoreError> {
        Ok(self.facilities.get(&id).cloned())
    }

    fn find_engineer(&mut self, id: EngineerId) -> Result<Option<Engineer>, CoreError> {
        Ok(self.engineers.get(&id).cloned())
    }

    fn active_engineers(&mut self) -> Result<Vec<Engineer>, CoreError> {
        Ok(self
            .engineers
            .values()
            .filter(|engineer| engineer.active)
            .cloned()
            .collect())
    }

    fn open_visits_for(&mut self, engineers: &[EngineerId]) -> Result<Vec<Visit>, CoreError> {
        Ok(self
            .visits
            .values()
            .map(|visit| self.hydrate(visit))
            .filter(|visit| !visit.status.is_terminal())
            .filter(|visit| engineers.iter().any(|id| visit.is_assigned(*id)))
            .collect())
    }

    fn ticket_exists(&mut self, ticket: &TicketNumber) -> Result<bool, CoreError> {
        Ok(self.visits.values().any(|visit| &visit.ticket_number == ticket))
    }

    fn insert_visit(&mut self, visit: &Visit) -> Result<(), CoreError> {
        self.store_row(visit);
        Ok(())
    }

    fn update_visit(&mut self, visit: &Visit) -> Result<(), CoreError> {
        if !self.visits.contains_key(&visit.id) {
            return Err(CoreError::not_found("visit", visit.id));
        }
        self.store_row(visit);
        Ok(())
    }

    fn replace_assignments(
        &mut self,
        visit_id: VisitId,
        assignments: &[Assignment],
    ) -> Result<(), CoreError> {
        self.assignments.insert(visit_id, assignments.to_vec());
        Ok(())
    }

    fn update_request_status(
        &mut self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), CoreError> {
        let request: &mut MaintenanceRequest = self
            .requests
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("request", id))?;
        request.status = status;
        Ok(())
    }
}

/// Store that works on a copy of its state and keeps it only on success.
#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn seeded() -> Self {
        Self {
            state: Mutex::new(seed_state()),
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.lock().unwrap().clone()
    }

    pub fn modify(&self, change: impl FnOnce(&mut StoreState)) {
        change(&mut self.state.lock().unwrap());
    }
}

impl VisitStore for FakeStore {
    fn atomically<T, F>(&self, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, CoreError>,
    {
        let mut guard = self.state.lock().unwrap();
        let mut working: StoreState = guard.clone();
        let value: T = work(&mut working)?;
        *guard = working;
        Ok(value)
    }
}

pub fn engineer(id: i64, areas: &[&str], active: bool) -> Engineer {
    Engineer {
        id: EngineerId::new(id),
        name: format!("Engineer {id}"),
        coverage_areas: areas.iter().map(|area| (*area).to_string()).collect(),
        active,
    }
}

pub fn seed_state() -> StoreState {
    let mut state: StoreState = StoreState::default();
    state.facilities.insert(
        FacilityId::new(10),
        Facility {
            id: FacilityId::new(10),
            customer_id: CustomerId::new(1),
            name: String::from("Main Lab"),
            location: String::from("Nasr City, Cairo"),
        },
    );
    for device in [
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
        Device {
            id: FOREIGN_DEVICE,
            customer_id: CustomerId::new(2),
            code: String::from("OTHER-1"),
            owner: DeviceOwner::Customer,
        },
    ] {
        state.devices.insert(device.id, device);
    }
    for engineer in [
        engineer(1, &["Cairo"], true),
        engineer(2, &["cairo"], true),
        engineer(3, &["Alexandria"], true),
        engineer(4, &["Cairo"], false),
    ] {
        state.engineers.insert(engineer.id, engineer);
    }
    for (id, customer) in [(REQUEST, 1), (OTHER_CUSTOMER_REQUEST, 2)] {
        state.requests.insert(
            id,
            MaintenanceRequest {
                id,
                customer_id: CustomerId::new(customer),
                status: RequestStatus::Open,
                created_by: UserId::new(901),
                description: String::from("Device reports calibration errors"),
            },
        );
    }
    state
}

#[derive(Debug, Default)]
pub struct RecordingEvents {
    pub events: Mutex<Vec<DomainEvent>>,
    pub fail: AtomicBool,
}

impl RecordingEvents {
    pub fn recorded(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEvents {
    fn dispatch(&self, event: DomainEvent) -> Result<(), DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::QueueFull);
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub roles: Mutex<Vec<(Role, Notification)>>,
    pub users: Mutex<Vec<(UserId, Notification)>>,
    pub failures: AtomicUsize,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn notified_roles(&self) -> Vec<Role> {
        self.roles.lock().unwrap().iter().map(|(role, _)| *role).collect()
    }

    pub fn notified_users(&self) -> Vec<UserId> {
        self.users.lock().unwrap().iter().map(|(user, _)| *user).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_role(&self, role: Role, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(NotifyError(String::from("smtp down")));
        }
        self.roles.lock().unwrap().push((role, notification.clone()));
        Ok(())
    }

    fn notify_user(&self, user: UserId, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(NotifyError(String::from("smtp down")));
        }
        self.users.lock().unwrap().push((user, notification.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub service: VisitService<FakeStore>,
    pub events: Arc<RecordingEvents>,
    pub notifier: Arc<RecordingNotifier>,
    pub cache: Arc<MokaCache<Device>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(FakeStore::seeded())
    }

    pub fn with_store(store: FakeStore) -> Self {
        let events: Arc<RecordingEvents> = Arc::new(RecordingEvents::default());
        let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
        let cache: Arc<MokaCache<Device>> = Arc::new(MokaCache::new(100));
        let service: VisitService<FakeStore> = VisitService::new(
            store,
            &VisitConfig::default(),
            Arc::clone(&cache) as Arc<dyn Cache<Device>>,
            Arc::clone(&events) as Arc<dyn EventSink>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        Self {
            service,
            events,
            notifier,
            cache,
        }
    }

    pub fn state(&self) -> StoreState {
        self.service.store().snapshot()
    }

    /// Creates a visit for `device` as `actor` on the default request.
    pub fn create(&self, device: DeviceId, actor: &Actor) -> Result<Visit, CoreError> {
        self.service.create_visit(create_command(device), actor)
    }

    /// Creates a visit as a manager and starts it as engineer 1.
    pub fn in_progress_visit(&self) -> Visit {
        let visit: Visit = self.create(FACILITY_DEVICE, &manager()).unwrap();
        self.service
            .verify_and_start(visit.id, FACILITY_CODE, &engineer_actor(1))
            .unwrap()
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
        note: None,
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
