// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldvisit_audit::AuditEntry;
use tracing::debug;

use crate::data_models::format_time;
use crate::diesel_schema::visit_audit_log;
use crate::error::PersistenceError;

/// Appends one audit entry.
///
/// This is the only write path into `visit_audit_log`; triggers reject
/// updates and deletes at the database level.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_audit_entry(
    conn: &mut SqliteConnection,
    entry: &AuditEntry,
) -> Result<(), PersistenceError> {
    diesel::insert_into(visit_audit_log::table)
        .values((
            visit_audit_log::visit_id.eq(entry.visit_id.to_string()),
            visit_audit_log::actor_id.eq(entry.actor.id.value()),
            visit_audit_log::actor_role.eq(entry.actor.role.as_str()),
            visit_audit_log::action.eq(entry.action.as_str()),
            visit_audit_log::old_status.eq(entry.old_status.map(|status| status.as_str())),
            visit_audit_log::new_status.eq(entry.new_status.as_str()),
            visit_audit_log::note.eq(entry.note.as_deref()),
            visit_audit_log::recorded_at.eq(format_time(entry.recorded_at)?),
        ))
        .execute(conn)?;

    debug!(
        visit_id = %entry.visit_id,
        action = %entry.action,
        new_status = %entry.new_status,
        "Appended audit entry"
    );
    Ok(())
}
