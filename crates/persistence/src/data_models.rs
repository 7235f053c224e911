// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion to domain values.
//!
//! Identifiers are stored as integers (UUIDs as text), enums by their
//! stable string names, and instants as RFC 3339 text.

use diesel::prelude::*;
use fieldvisit_audit::{Actor, AuditEntry};
use fieldvisit_domain::{
    Assignment, CustomerId, Device, DeviceId, DeviceOwner, Engineer, EngineerId, Facility,
    FacilityId, MaintenanceRequest, RequestId, TicketNumber, UserId, Visit, VisitId,
};
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{
    devices, engineers, facilities, maintenance_requests, visit_assignments, visit_audit_log,
    visits,
};
use crate::error::PersistenceError;

pub(crate) fn format_time(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub(crate) fn format_optional_time(
    at: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    at.map(format_time).transpose()
}

fn parse_time(table: &'static str, raw: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| PersistenceError::corrupt(table, e))
}

fn parse<T>(table: &'static str, raw: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| PersistenceError::corrupt(table, format!("{raw:?}: {e}")))
}

/// `SQLite` has no boolean type; flags are stored as 0 or 1.
pub(crate) fn flag(value: bool) -> i32 {
    i32::from(value)
}

/// Normalized form of a device code used for lookups.
pub(crate) fn code_key(code: &str) -> String {
    code.trim().to_lowercase()
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = visits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VisitRow {
    pub visit_id: String,
    pub ticket_number: String,
    pub request_id: i64,
    pub customer_id: i64,
    pub device_id: i64,
    pub scheduled_for: String,
    pub origin: String,
    pub status: String,
    pub primary_engineer_id: Option<i64>,
    pub is_paid: i32,
    pub cost_cents: Option<i64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub outcome: Option<String>,
    pub created_at: String,
}

impl VisitRow {
    /// Builds the domain visit from this row and its assignment rows.
    pub fn into_visit(self, assignments: Vec<Assignment>) -> Result<Visit, PersistenceError> {
        const TABLE: &str = "visits";
        Ok(Visit {
            id: parse::<VisitId>(TABLE, &self.visit_id)?,
            ticket_number: parse::<TicketNumber>(TABLE, &self.ticket_number)?,
            request_id: RequestId::new(self.request_id),
            customer_id: CustomerId::new(self.customer_id),
            device_id: DeviceId::new(self.device_id),
            scheduled_for: parse_time(TABLE, &self.scheduled_for)?,
            origin: parse(TABLE, &self.origin)?,
            status: parse(TABLE, &self.status)?,
            primary_engineer: self.primary_engineer_id.map(EngineerId::new),
            assignments,
            is_paid: self.is_paid != 0,
            cost_cents: self.cost_cents,
            started_at: self
                .started_at
                .as_deref()
                .map(|raw| parse_time(TABLE, raw))
                .transpose()?,
            completed_at: self
                .completed_at
                .as_deref()
                .map(|raw| parse_time(TABLE, raw))
                .transpose()?,
            outcome: self
                .outcome
                .as_deref()
                .map(|raw| parse(TABLE, raw))
                .transpose()?,
            created_at: parse_time(TABLE, &self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = visit_assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssignmentRow {
    pub visit_id: String,
    pub engineer_id: i64,
    pub assigned_by: i64,
    pub assigned_at: String,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = PersistenceError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "visit_assignments";
        Ok(Self {
            visit_id: parse(TABLE, &row.visit_id)?,
            engineer_id: EngineerId::new(row.engineer_id),
            assigned_by: UserId::new(row.assigned_by),
            assigned_at: parse_time(TABLE, &row.assigned_at)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = visit_audit_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditRow {
    pub visit_id: String,
    pub actor_id: i64,
    pub actor_role: String,
    pub action: String,
    pub old_status: Option<String>,
    pub new_status: String,
    pub note: Option<String>,
    pub recorded_at: String,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = PersistenceError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "visit_audit_log";
        Ok(Self {
            visit_id: parse(TABLE, &row.visit_id)?,
            actor: Actor::new(UserId::new(row.actor_id), parse(TABLE, &row.actor_role)?),
            action: parse(TABLE, &row.action)?,
            old_status: row
                .old_status
                .as_deref()
                .map(|raw| parse(TABLE, raw))
                .transpose()?,
            new_status: parse(TABLE, &row.new_status)?,
            note: row.note,
            recorded_at: parse_time(TABLE, &row.recorded_at)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = devices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeviceRow {
    pub device_id: i64,
    pub customer_id: i64,
    pub code: String,
    pub facility_id: Option<i64>,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: DeviceId::new(row.device_id),
            customer_id: CustomerId::new(row.customer_id),
            code: row.code,
            owner: row
                .facility_id
                .map_or(DeviceOwner::Customer, |id| {
                    DeviceOwner::Facility(FacilityId::new(id))
                }),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = facilities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FacilityRow {
    pub facility_id: i64,
    pub customer_id: i64,
    pub name: String,
    pub location: String,
}

impl From<FacilityRow> for Facility {
    fn from(row: FacilityRow) -> Self {
        Self {
            id: FacilityId::new(row.facility_id),
            customer_id: CustomerId::new(row.customer_id),
            name: row.name,
            location: row.location,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = engineers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EngineerRow {
    pub engineer_id: i64,
    pub name: String,
    pub is_active: i32,
}

impl EngineerRow {
    pub fn into_engineer(self, coverage_areas: Vec<String>) -> Engineer {
        Engineer {
            id: EngineerId::new(self.engineer_id),
            name: self.name,
            coverage_areas,
            active: self.is_active != 0,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = maintenance_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RequestRow {
    pub request_id: i64,
    pub customer_id: i64,
    pub status: String,
    pub created_by: i64,
    pub description: String,
}

impl TryFrom<RequestRow> for MaintenanceRequest {
    type Error = PersistenceError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RequestId::new(row.request_id),
            customer_id: CustomerId::new(row.customer_id),
            status: parse("maintenance_requests", &row.status)?,
            created_by: UserId::new(row.created_by),
            description: row.description,
        })
    }
}
