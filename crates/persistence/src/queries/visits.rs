// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldvisit_domain::{Assignment, EngineerId, TicketNumber, Visit, VisitId, VisitStatus};
use std::collections::BTreeMap;

use crate::data_models::{AssignmentRow, VisitRow};
use crate::diesel_schema::{visit_assignments, visits};
use crate::error::PersistenceError;

/// Loads one visit with its assignments in assignment order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn find_visit(
    conn: &mut SqliteConnection,
    id: VisitId,
) -> Result<Option<Visit>, PersistenceError> {
    let row: Option<VisitRow> = visits::table
        .filter(visits::visit_id.eq(id.to_string()))
        .select(VisitRow::as_select())
        .first::<VisitRow>(conn)
        .optional()?;

    match row {
        Some(row) => hydrate(conn, vec![row]).map(|mut found| found.pop()),
        None => Ok(None),
    }
}

/// Loads the non-terminal visits on which any engineer is primary or assigned.
///
/// Results are ordered by creation time.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn open_visits_for(
    conn: &mut SqliteConnection,
    engineers: &[EngineerId],
) -> Result<Vec<Visit>, PersistenceError> {
    if engineers.is_empty() {
        return Ok(Vec::new());
    }

    let engineer_ids: Vec<i64> = engineers.iter().map(EngineerId::value).collect();
    let closed: Vec<&'static str> = VisitStatus::ALL
        .iter()
        .filter(|status| status.is_terminal())
        .map(VisitStatus::as_str)
        .collect();

    let assigned_visit_ids: Vec<String> = visit_assignments::table
        .filter(visit_assignments::engineer_id.eq_any(&engineer_ids))
        .select(visit_assignments::visit_id)
        .distinct()
        .load::<String>(conn)?;

    let mut rows: BTreeMap<String, VisitRow> = BTreeMap::new();

    let via_assignment: Vec<VisitRow> = visits::table
        .filter(visits::visit_id.eq_any(&assigned_visit_ids))
        .filter(visits::status.ne_all(closed.clone()))
        .select(VisitRow::as_select())
        .load::<VisitRow>(conn)?;
    let primary_ids: Vec<Option<i64>> = engineer_ids.iter().copied().map(Some).collect();
    let via_primary: Vec<VisitRow> = visits::table
        .filter(visits::primary_engineer_id.eq_any(primary_ids))
        .filter(visits::status.ne_all(closed))
        .select(VisitRow::as_select())
        .load::<VisitRow>(conn)?;

    for row in via_assignment.into_iter().chain(via_primary) {
        rows.entry(row.visit_id.clone()).or_insert(row);
    }

    let mut ordered: Vec<VisitRow> = rows.into_values().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    hydrate(conn, ordered)
}

/// Returns true if a visit already holds the ticket number.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn ticket_exists(
    conn: &mut SqliteConnection,
    ticket: &TicketNumber,
) -> Result<bool, PersistenceError> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        visits::table.filter(visits::ticket_number.eq(ticket.as_str())),
    ))
    .get_result::<bool>(conn)?;
    Ok(exists)
}

/// Lists visits, newest first, optionally restricted to one status.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_visits(
    conn: &mut SqliteConnection,
    status: Option<VisitStatus>,
) -> Result<Vec<Visit>, PersistenceError> {
    let mut query = visits::table
        .select(VisitRow::as_select())
        .order(visits::created_at.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(visits::status.eq(status.as_str()));
    }
    let rows: Vec<VisitRow> = query.load::<VisitRow>(conn)?;
    hydrate(conn, rows)
}

/// Attaches assignment rows to visit rows, preserving the row order.
fn hydrate(
    conn: &mut SqliteConnection,
    rows: Vec<VisitRow>,
) -> Result<Vec<Visit>, PersistenceError> {
    let visit_ids: Vec<String> = rows.iter().map(|row| row.visit_id.clone()).collect();
    let mut assignments: BTreeMap<String, Vec<Assignment>> = load_assignments(conn, &visit_ids)?;

    rows.into_iter()
        .map(|row| {
            let attached: Vec<Assignment> = assignments.remove(&row.visit_id).unwrap_or_default();
            row.into_visit(attached)
        })
        .collect()
}

fn load_assignments(
    conn: &mut SqliteConnection,
    visit_ids: &[String],
) -> Result<BTreeMap<String, Vec<Assignment>>, PersistenceError> {
    if visit_ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let rows: Vec<AssignmentRow> = visit_assignments::table
        .filter(visit_assignments::visit_id.eq_any(visit_ids))
        .order((
            visit_assignments::visit_id.asc(),
            visit_assignments::position.asc(),
        ))
        .select(AssignmentRow::as_select())
        .load::<AssignmentRow>(conn)?;

    let mut grouped: BTreeMap<String, Vec<Assignment>> = BTreeMap::new();
    for row in rows {
        let key: String = row.visit_id.clone();
        grouped
            .entry(key)
            .or_default()
            .push(Assignment::try_from(row)?);
    }
    Ok(grouped)
}
