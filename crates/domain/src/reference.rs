// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Entities owned by the surrounding application that visits refer to.

use crate::status::RequestStatus;
use crate::types::{CustomerId, DeviceId, EngineerId, FacilityId, RequestId, UserId};
use serde::{Deserialize, Serialize};

/// A field engineer and the areas they cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engineer {
    pub id: EngineerId,
    pub name: String,
    /// Free-text region names, e.g. `"Cairo"` or `"Giza - 6th of October"`.
    pub coverage_areas: Vec<String>,
    pub active: bool,
}

/// Who a device physically belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DeviceOwner {
    /// Installed at one of the customer's facilities.
    Facility(FacilityId),
    /// Held by the customer directly; there is no service location on record.
    Customer,
}

/// A serviced device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub customer_id: CustomerId,
    /// Code printed on the device label and scanned on site.
    pub code: String,
    pub owner: DeviceOwner,
}

/// A customer site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub customer_id: CustomerId,
    pub name: String,
    pub location: String,
}

/// A customer's maintenance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: RequestId,
    pub customer_id: CustomerId,
    pub status: RequestStatus,
    pub created_by: UserId,
    pub description: String,
}

/// Compares a scanned device code against the registered one.
///
/// Case-insensitive; surrounding whitespace from scanners is ignored.
#[must_use]
pub fn codes_match(scanned: &str, registered: &str) -> bool {
    let scanned = scanned.trim();
    !scanned.is_empty() && scanned.eq_ignore_ascii_case(registered.trim())
}
