// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldvisit_domain::{Assignment, Visit, VisitId};
use tracing::debug;

use crate::data_models::{flag, format_optional_time, format_time};
use crate::diesel_schema::{visit_assignments, visits};
use crate::error::PersistenceError;

/// Inserts the visit row. Assignments are written by [`replace_assignments`].
///
/// # Errors
///
/// Returns an error if the insert fails, including a duplicate ticket number.
pub fn insert_visit(conn: &mut SqliteConnection, visit: &Visit) -> Result<(), PersistenceError> {
    diesel::insert_into(visits::table)
        .values((
            visits::visit_id.eq(visit.id.to_string()),
            visits::ticket_number.eq(visit.ticket_number.as_str()),
            visits::request_id.eq(visit.request_id.value()),
            visits::customer_id.eq(visit.customer_id.value()),
            visits::device_id.eq(visit.device_id.value()),
            visits::scheduled_for.eq(format_time(visit.scheduled_for)?),
            visits::origin.eq(visit.origin.as_str()),
            visits::status.eq(visit.status.as_str()),
            visits::primary_engineer_id.eq(visit.primary_engineer.map(|id| id.value())),
            visits::is_paid.eq(flag(visit.is_paid)),
            visits::cost_cents.eq(visit.cost_cents),
            visits::started_at.eq(format_optional_time(visit.started_at)?),
            visits::completed_at.eq(format_optional_time(visit.completed_at)?),
            visits::outcome.eq(visit.outcome.map(|outcome| outcome.as_str())),
            visits::created_at.eq(format_time(visit.created_at)?),
        ))
        .execute(conn)?;

    debug!(visit_id = %visit.id, ticket = %visit.ticket_number, "Inserted visit row");
    Ok(())
}

/// Writes the mutable columns of an existing visit row.
///
/// Identity columns (ticket, request, customer, device, creation time) never
/// change after insert and are left alone.
///
/// # Errors
///
/// Returns an error if the update fails or no row matches the visit id.
pub fn update_visit(conn: &mut SqliteConnection, visit: &Visit) -> Result<(), PersistenceError> {
    let target = visits::table.filter(visits::visit_id.eq(visit.id.to_string()));
    let updated: usize = diesel::update(target)
        .set((
            visits::scheduled_for.eq(format_time(visit.scheduled_for)?),
            visits::status.eq(visit.status.as_str()),
            visits::primary_engineer_id.eq(visit.primary_engineer.map(|id| id.value())),
            visits::is_paid.eq(flag(visit.is_paid)),
            visits::cost_cents.eq(visit.cost_cents),
            visits::started_at.eq(format_optional_time(visit.started_at)?),
            visits::completed_at.eq(format_optional_time(visit.completed_at)?),
            visits::outcome.eq(visit.outcome.map(|outcome| outcome.as_str())),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::MissingRow {
            table: "visits",
            key: visit.id.to_string(),
        });
    }

    debug!(visit_id = %visit.id, status = %visit.status, "Updated visit row");
    Ok(())
}

/// Replaces the assignment set of a visit.
///
/// Every existing row for the visit is removed before the new set is
/// inserted, so an engineer dropped from the set leaves nothing behind.
///
/// # Errors
///
/// Returns an error if the delete or any insert fails.
pub fn replace_assignments(
    conn: &mut SqliteConnection,
    visit_id: VisitId,
    assignments: &[Assignment],
) -> Result<(), PersistenceError> {
    let key: String = visit_id.to_string();

    let removed: usize =
        diesel::delete(visit_assignments::table.filter(visit_assignments::visit_id.eq(&key)))
            .execute(conn)?;

    for (position, assignment) in assignments.iter().enumerate() {
        let position: i32 = i32::try_from(position)
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
        diesel::insert_into(visit_assignments::table)
            .values((
                visit_assignments::visit_id.eq(&key),
                visit_assignments::engineer_id.eq(assignment.engineer_id.value()),
                visit_assignments::assigned_by.eq(assignment.assigned_by.value()),
                visit_assignments::assigned_at.eq(format_time(assignment.assigned_at)?),
                visit_assignments::position.eq(position),
            ))
            .execute(conn)?;
    }

    debug!(
        visit_id = %visit_id,
        removed,
        inserted = assignments.len(),
        "Replaced visit assignments"
    );
    Ok(())
}
