// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lookups over reference data: requests, devices, facilities, engineers.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldvisit_domain::{
    Device, DeviceId, Engineer, EngineerId, Facility, FacilityId, MaintenanceRequest, RequestId,
};
use std::collections::BTreeMap;

use crate::data_models::{DeviceRow, EngineerRow, FacilityRow, RequestRow, code_key};
use crate::diesel_schema::{
    devices, engineer_coverage_areas, engineers, facilities, maintenance_requests,
};
use crate::error::PersistenceError;

/// # Errors
///
/// Returns an error if the query fails or the status cannot be decoded.
pub fn find_request(
    conn: &mut SqliteConnection,
    id: RequestId,
) -> Result<Option<MaintenanceRequest>, PersistenceError> {
    maintenance_requests::table
        .filter(maintenance_requests::request_id.eq(id.value()))
        .select(RequestRow::as_select())
        .first::<RequestRow>(conn)
        .optional()?
        .map(MaintenanceRequest::try_from)
        .transpose()
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn find_device(
    conn: &mut SqliteConnection,
    id: DeviceId,
) -> Result<Option<Device>, PersistenceError> {
    Ok(devices::table
        .filter(devices::device_id.eq(id.value()))
        .select(DeviceRow::as_select())
        .first::<DeviceRow>(conn)
        .optional()?
        .map(Device::from))
}

/// Finds a device by its code, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_device_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Option<Device>, PersistenceError> {
    let key: String = code_key(code);
    if key.is_empty() {
        return Ok(None);
    }

    Ok(devices::table
        .filter(devices::code_key.eq(key))
        .order(devices::device_id.asc())
        .select(DeviceRow::as_select())
        .first::<DeviceRow>(conn)
        .optional()?
        .map(Device::from))
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn find_facility(
    conn: &mut SqliteConnection,
    id: FacilityId,
) -> Result<Option<Facility>, PersistenceError> {
    Ok(facilities::table
        .filter(facilities::facility_id.eq(id.value()))
        .select(FacilityRow::as_select())
        .first::<FacilityRow>(conn)
        .optional()?
        .map(Facility::from))
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn find_engineer(
    conn: &mut SqliteConnection,
    id: EngineerId,
) -> Result<Option<Engineer>, PersistenceError> {
    let row: Option<EngineerRow> = engineers::table
        .filter(engineers::engineer_id.eq(id.value()))
        .select(EngineerRow::as_select())
        .first::<EngineerRow>(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut areas: BTreeMap<i64, Vec<String>> = coverage_areas(conn, &[row.engineer_id])?;
    let covered: Vec<String> = areas.remove(&row.engineer_id).unwrap_or_default();
    Ok(Some(row.into_engineer(covered)))
}

/// Active engineers in ascending id order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_engineers(conn: &mut SqliteConnection) -> Result<Vec<Engineer>, PersistenceError> {
    let rows: Vec<EngineerRow> = engineers::table
        .filter(engineers::is_active.eq(1))
        .order(engineers::engineer_id.asc())
        .select(EngineerRow::as_select())
        .load::<EngineerRow>(conn)?;

    let ids: Vec<i64> = rows.iter().map(|row| row.engineer_id).collect();
    let mut areas: BTreeMap<i64, Vec<String>> = coverage_areas(conn, &ids)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let covered: Vec<String> = areas.remove(&row.engineer_id).unwrap_or_default();
            row.into_engineer(covered)
        })
        .collect())
}

fn coverage_areas(
    conn: &mut SqliteConnection,
    engineer_ids: &[i64],
) -> Result<BTreeMap<i64, Vec<String>>, PersistenceError> {
    let rows: Vec<(i64, String)> = engineer_coverage_areas::table
        .filter(engineer_coverage_areas::engineer_id.eq_any(engineer_ids))
        .order((
            engineer_coverage_areas::engineer_id.asc(),
            engineer_coverage_areas::position.asc(),
        ))
        .select((
            engineer_coverage_areas::engineer_id,
            engineer_coverage_areas::area,
        ))
        .load::<(i64, String)>(conn)?;

    let mut grouped: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for (engineer_id, area) in rows {
        grouped.entry(engineer_id).or_default().push(area);
    }
    Ok(grouped)
}
