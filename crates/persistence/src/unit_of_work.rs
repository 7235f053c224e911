// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use fieldvisit::{AuditSink, CoreError, UnitOfWork};
use fieldvisit_audit::AuditEntry;
use fieldvisit_domain::{
    Assignment, Device, DeviceId, Engineer, EngineerId, Facility, FacilityId, MaintenanceRequest,
    RequestId, RequestStatus, TicketNumber, Visit, VisitId,
};

use crate::{mutations, queries};

/// Unit of work bound to a connection that is already inside a transaction.
pub struct SqliteUnitOfWork<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteUnitOfWork<'c> {
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl AuditSink for SqliteUnitOfWork<'_> {
    fn record_transition(&mut self, entry: &AuditEntry) -> Result<(), CoreError> {
        Ok(mutations::audit::append_audit_entry(self.conn, entry)?)
    }

    fn audit_trail(&mut self, visit_id: VisitId) -> Result<Vec<AuditEntry>, CoreError> {
        Ok(queries::audit::audit_trail(self.conn, visit_id)?)
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn find_visit(&mut self, id: VisitId) -> Result<Option<Visit>, CoreError> {
        Ok(queries::visits::find_visit(self.conn, id)?)
    }

    fn find_request(&mut self, id: RequestId) -> Result<Option<MaintenanceRequest>, CoreError> {
        Ok(queries::reference::find_request(self.conn, id)?)
    }

    fn find_device(&mut self, id: DeviceId) -> Result<Option<Device>, CoreError> {
        Ok(queries::reference::find_device(self.conn, id)?)
    }

    fn find_device_by_code(&mut self, code: &str) -> Result<Option<Device>, CoreError> {
        Ok(queries::reference::find_device_by_code(self.conn, code)?)
    }

    fn find_facility(&mut self, id: FacilityId) -> Result<Option<Facility>, CoreError> {
        Ok(queries::reference::find_facility(self.conn, id)?)
    }

    fn find_engineer(&mut self, id: EngineerId) -> Result<Option<Engineer>, CoreError> {
        Ok(queries::reference::find_engineer(self.conn, id)?)
    }

    fn active_engineers(&mut self) -> Result<Vec<Engineer>, CoreError> {
        Ok(queries::reference::active_engineers(self.conn)?)
    }

    fn open_visits_for(&mut self, engineers: &[EngineerId]) -> Result<Vec<Visit>, CoreError> {
        Ok(queries::visits::open_visits_for(self.conn, engineers)?)
    }

    fn ticket_exists(&mut self, ticket: &TicketNumber) -> Result<bool, CoreError> {
        Ok(queries::visits::ticket_exists(self.conn, ticket)?)
    }

    fn insert_visit(&mut self, visit: &Visit) -> Result<(), CoreError> {
        Ok(mutations::visits::insert_visit(self.conn, visit)?)
    }

    fn update_visit(&mut self, visit: &Visit) -> Result<(), CoreError> {
        Ok(mutations::visits::update_visit(self.conn, visit)?)
    }

    fn replace_assignments(
        &mut self,
        visit_id: VisitId,
        assignments: &[Assignment],
    ) -> Result<(), CoreError> {
        Ok(mutations::visits::replace_assignments(
            self.conn,
            visit_id,
            assignments,
        )?)
    }

    fn update_request_status(
        &mut self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), CoreError> {
        Ok(mutations::reference::update_request_status(
            self.conn, id, status,
        )?)
    }
}
