// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use moka::Expiry;
use std::time::{Duration, Instant};

/// Key/value cache with a per-entry time to live.
///
/// Values served from a cache are advisory. Callers must be able to fall
/// back to the authoritative source.
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V>;

    fn set(&self, key: &str, value: V, ttl: Duration);

    fn invalidate(&self, key: &str);

    /// Returns the cached value, or runs `loader` and caches its result.
    ///
    /// Loader errors are returned and nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns the loader's error on a miss.
    fn get_or_create(
        &self,
        key: &str,
        ttl: Duration,
        loader: &mut dyn FnMut() -> Result<V, CoreError>,
    ) -> Result<V, CoreError> {
        if let Some(value) = self.get(key) {
            tracing::debug!(key, "Cache hit");
            return Ok(value);
        }
        tracing::debug!(key, "Cache miss");
        let value: V = loader()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    ttl: Duration,
}

/// Expires each entry after the ttl it was stored with.
struct PerEntryTtl;

impl<V> Expiry<String, CacheEntry<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process [`Cache`] backed by moka.
pub struct MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: moka::sync::Cache<String, CacheEntry<V>>,
}

impl<V> MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: moka::sync::Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl<V> Cache<V> for MokaCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value)
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        self.inner
            .insert(key.to_string(), CacheEntry { value, ttl });
    }

    fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }
}
