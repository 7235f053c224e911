// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{CUSTOMER_DEVICE, FACILITY_DEVICE, StoreState, engineer, seed_state};
use crate::{UnitOfWork, assign_engineers, auto_assign, service_location};
use fieldvisit_domain::{
    Device, EngineerId, FacilityId, NewVisit, RequestId, TicketNumber, UserId, Visit, VisitId,
    VisitOrigin, VisitStatus,
};
use time::macros::{date, datetime};

fn device(state: &StoreState, id: fieldvisit_domain::DeviceId) -> Device {
    state.devices[&id].clone()
}

fn new_visit(state: &mut StoreState, suffix: u16) -> Visit {
    let visit: Visit = Visit::new(
        VisitId::generate(),
        NewVisit {
            ticket_number: TicketNumber::compose("MV", date!(2026 - 06 - 01), suffix).unwrap(),
            request_id: RequestId::new(500),
            customer_id: fieldvisit_domain::CustomerId::new(1),
            device_id: FACILITY_DEVICE,
            scheduled_for: datetime!(2026-06-01 09:00 UTC),
            origin: VisitOrigin::Contract,
            status: VisitStatus::Scheduled,
            is_paid: false,
            cost_cents: None,
        },
        datetime!(2026-05-30 12:00 UTC),
    );
    state.insert_visit(&visit).unwrap();
    visit
}

#[test]
fn test_service_location_comes_from_facility() {
    let mut state: StoreState = seed_state();
    let facility_device: Device = device(&state, FACILITY_DEVICE);
    let customer_device: Device = device(&state, CUSTOMER_DEVICE);

    assert_eq!(
        service_location(&mut state, &facility_device).unwrap(),
        Some(String::from("Nasr City, Cairo"))
    );
    assert_eq!(service_location(&mut state, &customer_device).unwrap(), None);
}

#[test]
fn test_blank_facility_location_counts_as_none() {
    let mut state: StoreState = seed_state();
    state
        .facilities
        .get_mut(&FacilityId::new(10))
        .unwrap()
        .location = String::from("   ");
    let facility_device: Device = device(&state, FACILITY_DEVICE);

    assert_eq!(service_location(&mut state, &facility_device).unwrap(), None);
}

#[test]
fn test_auto_assign_writes_visit_and_assignment_rows() {
    let mut state: StoreState = seed_state();
    let facility_device: Device = device(&state, FACILITY_DEVICE);
    let mut visit: Visit = new_visit(&mut state, 1);

    let chosen = auto_assign(
        &mut state,
        &mut visit,
        &facility_device,
        UserId::new(900),
        datetime!(2026-05-30 12:00 UTC),
    )
    .unwrap();

    assert_eq!(chosen, Some(EngineerId::new(1)));
    assert_eq!(state.assignments[&visit.id].len(), 1);
    assert_eq!(
        state.visits[&visit.id].primary_engineer,
        Some(EngineerId::new(1))
    );
}

#[test]
fn test_auto_assign_skips_when_nobody_covers_location() {
    let mut state: StoreState = seed_state();
    state.engineers.clear();
    state
        .engineers
        .insert(EngineerId::new(3), engineer(3, &["Alexandria"], true));
    let facility_device: Device = device(&state, FACILITY_DEVICE);
    let mut visit: Visit = new_visit(&mut state, 1);

    let chosen = auto_assign(
        &mut state,
        &mut visit,
        &facility_device,
        UserId::new(900),
        datetime!(2026-05-30 12:00 UTC),
    )
    .unwrap();

    assert_eq!(chosen, None);
    assert_eq!(visit.primary_engineer, None);
    assert!(!state.assignments.contains_key(&visit.id));
}

#[test]
fn test_auto_assign_ignores_closed_visits_in_workload() {
    let mut state: StoreState = seed_state();
    let facility_device: Device = device(&state, FACILITY_DEVICE);
    let at = datetime!(2026-05-30 12:00 UTC);

    for suffix in 1..=3 {
        let mut done: Visit = new_visit(&mut state, suffix);
        assign_engineers(&mut state, &mut done, &[EngineerId::new(1)], UserId::new(900), at)
            .unwrap();
        done.status = VisitStatus::Completed;
        state.update_visit(&done).unwrap();
    }
    let mut open: Visit = new_visit(&mut state, 10);
    assign_engineers(&mut state, &mut open, &[EngineerId::new(2)], UserId::new(900), at).unwrap();

    let mut visit: Visit = new_visit(&mut state, 11);
    let chosen = auto_assign(&mut state, &mut visit, &facility_device, UserId::new(900), at)
        .unwrap();

    assert_eq!(chosen, Some(EngineerId::new(1)));
}

#[test]
fn test_reassignment_leaves_no_stale_rows() {
    let mut state: StoreState = seed_state();
    let at = datetime!(2026-05-30 12:00 UTC);
    let mut visit: Visit = new_visit(&mut state, 1);
    assign_engineers(
        &mut state,
        &mut visit,
        &[EngineerId::new(1), EngineerId::new(2), EngineerId::new(3)],
        UserId::new(900),
        at,
    )
    .unwrap();

    assign_engineers(&mut state, &mut visit, &[EngineerId::new(3)], UserId::new(900), at).unwrap();

    let rows = &state.assignments[&visit.id];
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].engineer_id, EngineerId::new(3));
    assert_eq!(
        state.visits[&visit.id].primary_engineer,
        Some(EngineerId::new(1))
    );
}
