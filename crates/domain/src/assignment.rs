// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure engineer selection rules.
//!
//! Selection composes a permissive geography filter with a workload count.
//! Both are deterministic for a fixed input ordering.

use crate::reference::Engineer;
use crate::types::EngineerId;
use crate::visit::Visit;

/// Returns the active engineers whose coverage areas match `location`.
///
/// Matching is case-insensitive substring containment in either direction,
/// so `"Cairo"` covers `"Nasr City, Cairo"` and `"cairo - nasr city"` covers
/// `"Cairo"`. Blank areas and blank locations never match. Input order is kept.
#[must_use]
pub fn matching_engineers<'a>(location: &str, pool: &'a [Engineer]) -> Vec<&'a Engineer> {
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return Vec::new();
    }

    pool.iter()
        .filter(|engineer| engineer.active)
        .filter(|engineer| {
            engineer.coverage_areas.iter().any(|area| {
                let area = area.trim().to_lowercase();
                !area.is_empty() && (location.contains(&area) || area.contains(&location))
            })
        })
        .collect()
}

/// Counts the non-terminal visits the engineer is on.
#[must_use]
pub fn workload_of(engineer: EngineerId, active_visits: &[Visit]) -> usize {
    active_visits
        .iter()
        .filter(|visit| visit.is_open_for(engineer))
        .count()
}

/// Picks the candidate with the smallest workload.
///
/// Ties go to the candidate that appears first.
#[must_use]
pub fn least_loaded(candidates: &[&Engineer], active_visits: &[Visit]) -> Option<EngineerId> {
    candidates
        .iter()
        .map(|engineer| (engineer.id, workload_of(engineer.id, active_visits)))
        .min_by_key(|(_, workload)| *workload)
        .map(|(id, _)| id)
}
