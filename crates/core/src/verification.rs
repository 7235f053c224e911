// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::devices::DeviceLookup;
use crate::error::CoreError;
use fieldvisit_domain::{Device, EngineerId, Visit, codes_match};

/// Confirms an engineer is on site at the visit's device.
///
/// Checks, in order:
/// 1. the engineer is primary or in the assignment set
/// 2. the scanned code matches the device's registered code
///
/// The code is always compared against an authoritative read of the device,
/// never a cached copy. The read also refreshes any cache behind `devices`.
///
/// # Errors
///
/// Returns `CoreError::NotAssigned`, `CoreError::CodeMismatch`, or
/// `CoreError::NotFound` if the device no longer exists.
pub fn verify_presence(
    visit: &Visit,
    engineer: EngineerId,
    scanned_code: &str,
    devices: &mut dyn DeviceLookup,
) -> Result<Device, CoreError> {
    if !visit.is_assigned(engineer) {
        tracing::info!(
            visit_id = %visit.id,
            engineer_id = engineer.value(),
            "Verification rejected: engineer not assigned"
        );
        return Err(CoreError::NotAssigned);
    }

    let device: Device = devices.refresh(visit.device_id)?;
    if codes_match(scanned_code, &device.code) {
        return Ok(device);
    }

    tracing::info!(
        visit_id = %visit.id,
        engineer_id = engineer.value(),
        device_id = device.id.value(),
        "Verification rejected: code mismatch"
    );
    Err(CoreError::CodeMismatch)
}
