// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assignment engine: composes the pure selection rules with storage.

use crate::error::CoreError;
use crate::ports::UnitOfWork;
use fieldvisit_domain::{
    Device, DeviceOwner, DomainError, Engineer, EngineerId, UserId, Visit, least_loaded,
    matching_engineers,
};
use time::OffsetDateTime;

/// Resolves where a device is serviced.
///
/// Customer-held devices have no location on record.
///
/// # Errors
///
/// Returns an error if the facility cannot be read.
pub fn service_location(
    uow: &mut dyn UnitOfWork,
    device: &Device,
) -> Result<Option<String>, CoreError> {
    let DeviceOwner::Facility(facility_id) = device.owner else {
        return Ok(None);
    };
    Ok(uow
        .find_facility(facility_id)?
        .map(|facility| facility.location)
        .filter(|location| !location.trim().is_empty()))
}

/// Picks the least-loaded engineer covering the device's location and
/// assigns them.
///
/// Best-effort: returns `Ok(None)` and leaves the visit untouched if there is
/// no location or no matching engineer. Writes the visit and its assignment
/// rows when an engineer is chosen.
///
/// # Errors
///
/// Returns an error only if storage fails.
pub fn auto_assign(
    uow: &mut dyn UnitOfWork,
    visit: &mut Visit,
    device: &Device,
    assigned_by: UserId,
    at: OffsetDateTime,
) -> Result<Option<EngineerId>, CoreError> {
    let Some(location) = service_location(uow, device)? else {
        tracing::warn!(
            visit_id = %visit.id,
            device_id = device.id.value(),
            "Auto-assignment skipped: no service location"
        );
        return Ok(None);
    };

    let pool: Vec<Engineer> = uow.active_engineers()?;
    let candidates: Vec<&Engineer> = matching_engineers(&location, &pool);
    if candidates.is_empty() {
        tracing::warn!(
            visit_id = %visit.id,
            location = %location,
            "Auto-assignment skipped: no engineer covers location"
        );
        return Ok(None);
    }

    let candidate_ids: Vec<EngineerId> = candidates.iter().map(|e| e.id).collect();
    let open: Vec<Visit> = uow.open_visits_for(&candidate_ids)?;
    let Some(chosen) = least_loaded(&candidates, &open) else {
        return Ok(None);
    };

    visit.replace_assignments(&[chosen], assigned_by, at)?;
    uow.update_visit(visit)?;
    uow.replace_assignments(visit.id, &visit.assignments)?;

    tracing::info!(
        visit_id = %visit.id,
        engineer_id = chosen.value(),
        location = %location,
        candidates = candidates.len(),
        "Engineer auto-assigned"
    );
    Ok(Some(chosen))
}

/// Replaces the visit's assignment set with the given engineers.
///
/// Every engineer must exist and be active. The visit row and its assignment
/// rows are written in the caller's unit of work, so no reader ever sees a
/// partial set.
///
/// # Errors
///
/// Returns `NotFound` for an unknown engineer, a domain violation for an
/// inactive engineer, an empty list or a closed visit.
pub fn assign_engineers(
    uow: &mut dyn UnitOfWork,
    visit: &mut Visit,
    engineers: &[EngineerId],
    assigned_by: UserId,
    at: OffsetDateTime,
) -> Result<(), CoreError> {
    for id in engineers {
        let engineer: Engineer = uow
            .find_engineer(*id)?
            .ok_or_else(|| CoreError::not_found("engineer", id))?;
        if !engineer.active {
            return Err(DomainError::InactiveEngineer(engineer.id).into());
        }
    }

    visit.replace_assignments(engineers, assigned_by, at)?;
    uow.update_visit(visit)?;
    uow.replace_assignments(visit.id, &visit.assignments)?;
    Ok(())
}
