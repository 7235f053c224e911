// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldvisit_audit::AuditEntry;
use fieldvisit_domain::VisitId;

use crate::data_models::AuditRow;
use crate::diesel_schema::visit_audit_log;
use crate::error::PersistenceError;

/// Returns the audit trail of a visit in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn audit_trail(
    conn: &mut SqliteConnection,
    visit_id: VisitId,
) -> Result<Vec<AuditEntry>, PersistenceError> {
    visit_audit_log::table
        .filter(visit_audit_log::visit_id.eq(visit_id.to_string()))
        .order(visit_audit_log::audit_id.asc())
        .select(AuditRow::as_select())
        .load::<AuditRow>(conn)?
        .into_iter()
        .map(AuditEntry::try_from)
        .collect()
}
