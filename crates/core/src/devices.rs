// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Device lookups, with an optional cache decorator.
//!
//! The verification gate only sees [`DeviceLookup`]; whether reads hit the
//! cache is decided by the caller composing the lookup.

use crate::cache::Cache;
use crate::error::CoreError;
use crate::ports::UnitOfWork;
use fieldvisit_domain::{Device, DeviceId};
use std::time::Duration;

/// Resolves devices.
pub trait DeviceLookup {
    /// Resolves a device by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the device does not exist.
    fn device(&mut self, id: DeviceId) -> Result<Device, CoreError>;

    /// Resolves a device by its registered code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no device has the code.
    fn device_by_code(&mut self, code: &str) -> Result<Device, CoreError>;

    /// Reads the device from authoritative storage, bypassing any cache.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the device does not exist.
    fn refresh(&mut self, id: DeviceId) -> Result<Device, CoreError>;
}

/// Lookups served straight from the unit of work.
pub struct StoreDevices<'a> {
    uow: &'a mut dyn UnitOfWork,
}

impl<'a> StoreDevices<'a> {
    pub fn new(uow: &'a mut dyn UnitOfWork) -> Self {
        Self { uow }
    }
}

impl DeviceLookup for StoreDevices<'_> {
    fn device(&mut self, id: DeviceId) -> Result<Device, CoreError> {
        self.uow
            .find_device(id)?
            .ok_or_else(|| CoreError::not_found("device", id))
    }

    fn device_by_code(&mut self, code: &str) -> Result<Device, CoreError> {
        self.uow
            .find_device_by_code(code.trim())?
            .ok_or_else(|| CoreError::not_found("device", code))
    }

    fn refresh(&mut self, id: DeviceId) -> Result<Device, CoreError> {
        self.device(id)
    }
}

/// Cache key for a device by id.
#[must_use]
pub fn device_key(id: DeviceId) -> String {
    format!("device:{id}")
}

/// Cache key for a device by code.
#[must_use]
pub fn device_code_key(code: &str) -> String {
    format!("device-code:{}", code.trim().to_lowercase())
}

/// Caching decorator over another lookup.
///
/// A miss reads through to the inner lookup and stores the result under both
/// its id key and its code key. `refresh` always reads through and replaces
/// both entries.
pub struct CachedDevices<'c, L> {
    inner: L,
    cache: &'c dyn Cache<Device>,
    ttl: Duration,
}

impl<'c, L: DeviceLookup> CachedDevices<'c, L> {
    pub fn new(inner: L, cache: &'c dyn Cache<Device>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn store(&self, device: &Device) {
        self.cache.set(&device_key(device.id), device.clone(), self.ttl);
        self.cache
            .set(&device_code_key(&device.code), device.clone(), self.ttl);
    }
}

impl<L: DeviceLookup> DeviceLookup for CachedDevices<'_, L> {
    fn device(&mut self, id: DeviceId) -> Result<Device, CoreError> {
        let inner = &mut self.inner;
        let cache = self.cache;
        let ttl = self.ttl;
        cache.get_or_create(&device_key(id), ttl, &mut || {
            let device: Device = inner.device(id)?;
            cache.set(&device_code_key(&device.code), device.clone(), ttl);
            Ok(device)
        })
    }

    fn device_by_code(&mut self, code: &str) -> Result<Device, CoreError> {
        let inner = &mut self.inner;
        let cache = self.cache;
        let ttl = self.ttl;
        cache.get_or_create(&device_code_key(code), ttl, &mut || {
            let device: Device = inner.device_by_code(code)?;
            cache.set(&device_key(device.id), device.clone(), ttl);
            Ok(device)
        })
    }

    fn refresh(&mut self, id: DeviceId) -> Result<Device, CoreError> {
        if let Some(stale) = self.cache.get(&device_key(id)) {
            self.cache.invalidate(&device_code_key(&stale.code));
        }
        match self.inner.refresh(id) {
            Ok(device) => {
                tracing::debug!(device_id = id.value(), "Refreshed cached device");
                self.store(&device);
                Ok(device)
            }
            Err(err) => {
                self.cache.invalidate(&device_key(id));
                Err(err)
            }
        }
    }
}
