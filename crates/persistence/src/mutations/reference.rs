// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes to reference data.
//!
//! The orchestrator only ever moves a request's status. The insert helpers
//! exist for seeding fixtures and tests.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldvisit_domain::{
    Device, DeviceOwner, Engineer, Facility, MaintenanceRequest, RequestId, RequestStatus,
};

use crate::data_models::{code_key, flag};
use crate::diesel_schema::{
    devices, engineer_coverage_areas, engineers, facilities, maintenance_requests,
};
use crate::error::PersistenceError;

/// # Errors
///
/// Returns an error if the update fails or the request does not exist.
pub fn update_request_status(
    conn: &mut SqliteConnection,
    id: RequestId,
    status: RequestStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        maintenance_requests::table.filter(maintenance_requests::request_id.eq(id.value())),
    )
    .set(maintenance_requests::status.eq(status.as_str()))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::MissingRow {
            table: "maintenance_requests",
            key: id.to_string(),
        });
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_facility(
    conn: &mut SqliteConnection,
    facility: &Facility,
) -> Result<(), PersistenceError> {
    diesel::insert_into(facilities::table)
        .values((
            facilities::facility_id.eq(facility.id.value()),
            facilities::customer_id.eq(facility.customer_id.value()),
            facilities::name.eq(&facility.name),
            facilities::location.eq(&facility.location),
        ))
        .execute(conn)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the insert fails, including an unknown facility.
pub fn insert_device(conn: &mut SqliteConnection, device: &Device) -> Result<(), PersistenceError> {
    let facility_id: Option<i64> = match device.owner {
        DeviceOwner::Facility(id) => Some(id.value()),
        DeviceOwner::Customer => None,
    };

    diesel::insert_into(devices::table)
        .values((
            devices::device_id.eq(device.id.value()),
            devices::customer_id.eq(device.customer_id.value()),
            devices::code.eq(&device.code),
            devices::code_key.eq(code_key(&device.code)),
            devices::facility_id.eq(facility_id),
        ))
        .execute(conn)?;
    Ok(())
}

/// Changes a device's registered code.
///
/// # Errors
///
/// Returns an error if the update fails or the device does not exist.
pub fn update_device_code(
    conn: &mut SqliteConnection,
    device: &Device,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(devices::table.filter(devices::device_id.eq(device.id.value())))
            .set((
                devices::code.eq(&device.code),
                devices::code_key.eq(code_key(&device.code)),
            ))
            .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::MissingRow {
            table: "devices",
            key: device.id.to_string(),
        });
    }
    Ok(())
}

/// Inserts an engineer and their coverage areas in the given order.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn insert_engineer(
    conn: &mut SqliteConnection,
    engineer: &Engineer,
) -> Result<(), PersistenceError> {
    diesel::insert_into(engineers::table)
        .values((
            engineers::engineer_id.eq(engineer.id.value()),
            engineers::name.eq(&engineer.name),
            engineers::is_active.eq(flag(engineer.active)),
        ))
        .execute(conn)?;

    for (position, area) in engineer.coverage_areas.iter().enumerate() {
        let position: i32 = i32::try_from(position)
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
        diesel::insert_into(engineer_coverage_areas::table)
            .values((
                engineer_coverage_areas::engineer_id.eq(engineer.id.value()),
                engineer_coverage_areas::area.eq(area),
                engineer_coverage_areas::position.eq(position),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_request(
    conn: &mut SqliteConnection,
    request: &MaintenanceRequest,
) -> Result<(), PersistenceError> {
    diesel::insert_into(maintenance_requests::table)
        .values((
            maintenance_requests::request_id.eq(request.id.value()),
            maintenance_requests::customer_id.eq(request.customer_id.value()),
            maintenance_requests::status.eq(request.status.as_str()),
            maintenance_requests::created_by.eq(request.created_by.value()),
            maintenance_requests::description.eq(&request.description),
        ))
        .execute(conn)?;
    Ok(())
}
