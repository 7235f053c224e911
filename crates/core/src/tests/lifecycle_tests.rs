// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::CoreError;
use crate::tests::helpers::{FACILITY_CODE, FACILITY_DEVICE, Harness, engineer_actor, manager};
use fieldvisit_domain::{Visit, VisitId, VisitOutcome, VisitStatus};
use time::macros::datetime;

type Operation = fn(&Harness, VisitId) -> Result<Visit, CoreError>;

fn approve(harness: &Harness, id: VisitId) -> Result<Visit, CoreError> {
    harness.service.approve_visit(id, &manager(), None)
}

fn start(harness: &Harness, id: VisitId) -> Result<Visit, CoreError> {
    harness
        .service
        .verify_and_start(id, FACILITY_CODE, &engineer_actor(1))
}

fn complete(harness: &Harness, id: VisitId) -> Result<Visit, CoreError> {
    harness
        .service
        .record_outcome(id, VisitOutcome::Completed, &manager(), None)
}

fn reschedule(harness: &Harness, id: VisitId) -> Result<Visit, CoreError> {
    harness
        .service
        .reschedule_visit(id, datetime!(2026-07-01 09:00 UTC), &manager(), None)
}

fn cancel(harness: &Harness, id: VisitId) -> Result<Visit, CoreError> {
    harness.service.cancel_visit(id, &manager(), None)
}

/// Builds a visit assigned to engineer 1 and forces it into `status`.
fn visit_in(status: VisitStatus) -> (Harness, VisitId) {
    let harness = Harness::new();
    let visit: Visit = harness.create(FACILITY_DEVICE, &manager()).unwrap();
    harness.service.store().modify(|state| {
        state.visits.get_mut(&visit.id).unwrap().status = status;
    });
    (harness, visit.id)
}

#[test]
fn test_operations_follow_the_transition_table() {
    let operations: [(&str, Operation, fn(VisitStatus) -> bool); 5] = [
        ("approve", approve, |s| s == VisitStatus::Pending),
        ("start", start, |s| s == VisitStatus::Scheduled),
        ("complete", complete, |s| s == VisitStatus::InProgress),
        ("reschedule", reschedule, |s| {
            matches!(
                s,
                VisitStatus::NeedsSpareParts | VisitStatus::NeedsSecondVisit
            )
        }),
        ("cancel", cancel, |s| s.can_transition_to(VisitStatus::Cancelled)),
    ];

    for from in VisitStatus::ALL {
        for (name, operation, allowed) in &operations {
            let (harness, id) = visit_in(from);
            let audit_before: usize = harness.state().audit.len();

            let result = operation(&harness, id);

            if allowed(from) {
                assert!(result.is_ok(), "{name} from {from} should succeed: {result:?}");
                assert_eq!(harness.state().audit.len(), audit_before + 1);
            } else {
                assert!(result.is_err(), "{name} from {from} should fail");
                assert_eq!(harness.service.visit(id).unwrap().status, from);
                assert_eq!(harness.state().audit.len(), audit_before);
            }
        }
    }
}

#[test]
fn test_terminal_visits_reject_every_operation() {
    for from in [VisitStatus::Completed, VisitStatus::Cancelled] {
        let (harness, id) = visit_in(from);
        for operation in [approve, start, complete, reschedule, cancel] {
            assert!(operation(&harness, id).is_err());
        }
        assert_eq!(harness.service.visit(id).unwrap().status, from);
    }
}

#[test]
fn test_rescheduled_status_is_a_dead_end() {
    let (harness, id) = visit_in(VisitStatus::Rescheduled);
    for operation in [approve, start, complete, reschedule, cancel] {
        assert!(operation(&harness, id).is_err());
    }
}
