// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for field-service visits.
//!
//! [`Persistence`] implements [`VisitStore`]: every unit of work runs inside
//! one `BEGIN IMMEDIATE` transaction on a single mutex-guarded connection,
//! so writers are serialized and a failed unit of work leaves no trace.
//!
//! ## Layout
//!
//! - `connection` opens databases and applies the embedded migrations
//! - `queries/` holds reads, `mutations/` holds writes
//! - [`SqliteUnitOfWork`] maps the core ports onto those functions
//!
//! ## Testing
//!
//! Tests run against isolated shared-cache in-memory databases created by
//! [`Persistence::new_in_memory`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod connection;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod unit_of_work;

#[cfg(test)]
mod tests;

pub use connection::{MIGRATIONS, verify_foreign_key_enforcement};
pub use error::PersistenceError;
pub use unit_of_work::SqliteUnitOfWork;

use diesel::SqliteConnection;
use fieldvisit::{CoreError, UnitOfWork, VisitStore};
use fieldvisit_domain::{Device, Engineer, Facility, MaintenanceRequest, Visit, VisitStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Sequence for unique in-memory database names so tests stay isolated.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reference data loaded by [`Persistence::seed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub facilities: Vec<Facility>,
    pub devices: Vec<Device>,
    pub engineers: Vec<Engineer>,
    pub requests: Vec<MaintenanceRequest>,
}

impl SeedData {
    /// Parses fixtures from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid seed JSON.
    pub fn from_json(raw: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Counts of rows written by [`Persistence::seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub facilities: usize,
    pub devices: usize,
    pub engineers: usize,
    pub requests: usize,
}

/// Failure inside a transaction: either the unit of work or the database.
enum TransactionError {
    Work(CoreError),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for TransactionError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

/// The `SQLite` visit store.
pub struct Persistence {
    conn: Mutex<SqliteConnection>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Creates a store backed by a fresh, isolated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_visits_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = connection::initialize_database(&shared_memory_url)?;
        connection::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a store backed by a database file, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = connection::initialize_database(path_str)?;
        connection::enable_wal_mode(&mut conn)?;
        connection::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::ConnectionPoisoned)
    }

    /// Runs `f` inside one immediate transaction.
    fn with_transaction<T, F>(&self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    {
        let mut conn = self.lock()?;
        conn.immediate_transaction::<T, PersistenceError, _>(f)
    }

    /// Loads reference data in one transaction.
    ///
    /// Facilities go first so devices can reference them.
    ///
    /// # Errors
    ///
    /// Returns an error if any row is rejected; nothing is written then.
    pub fn seed(&self, data: &SeedData) -> Result<SeedSummary, PersistenceError> {
        let summary: SeedSummary = self.with_transaction(|conn| {
            for facility in &data.facilities {
                mutations::reference::insert_facility(conn, facility)?;
            }
            for device in &data.devices {
                mutations::reference::insert_device(conn, device)?;
            }
            for engineer in &data.engineers {
                mutations::reference::insert_engineer(conn, engineer)?;
            }
            for request in &data.requests {
                mutations::reference::insert_request(conn, request)?;
            }
            Ok(SeedSummary {
                facilities: data.facilities.len(),
                devices: data.devices.len(),
                engineers: data.engineers.len(),
                requests: data.requests.len(),
            })
        })?;

        info!(
            facilities = summary.facilities,
            devices = summary.devices,
            engineers = summary.engineers,
            requests = summary.requests,
            "Seeded reference data"
        );
        Ok(summary)
    }

    /// Changes the registered code of an existing device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not exist or the update fails.
    pub fn update_device_code(&self, device: &Device) -> Result<(), PersistenceError> {
        self.with_transaction(|conn| mutations::reference::update_device_code(conn, device))
    }

    /// Lists visits, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_visits(&self, status: Option<VisitStatus>) -> Result<Vec<Visit>, PersistenceError> {
        let mut conn = self.lock()?;
        queries::visits::list_visits(&mut conn, status)
    }
}

impl VisitStore for Persistence {
    fn atomically<T, F>(&self, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, CoreError>,
    {
        let mut conn = self.lock()?;
        conn.immediate_transaction::<T, TransactionError, _>(|conn| {
            let mut uow = SqliteUnitOfWork::new(conn);
            work(&mut uow).map_err(TransactionError::Work)
        })
        .map_err(|err| match err {
            TransactionError::Work(err) => err,
            TransactionError::Database(err) => PersistenceError::from(err).into(),
        })
    }
}
