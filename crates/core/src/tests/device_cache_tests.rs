// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{FACILITY_CODE, FACILITY_DEVICE, StoreState, seed_state};
use crate::{
    Cache, CachedDevices, CoreError, DeviceLookup, MokaCache, StoreDevices, device_code_key,
    device_key,
};
use fieldvisit_domain::{Device, DeviceId};
use std::time::Duration;

const TTL: Duration = Duration::from_secs(3_600);

#[test]
fn test_keys_are_namespaced_and_lowercased() {
    assert_eq!(device_key(DeviceId::new(7)), "device:7");
    assert_eq!(device_code_key(" AbC123 "), "device-code:abc123");
}

#[test]
fn test_lookup_by_id_reads_storage_once() {
    let mut state: StoreState = seed_state();
    let cache: MokaCache<Device> = MokaCache::new(16);

    for _ in 0..3 {
        let mut lookup = CachedDevices::new(StoreDevices::new(&mut state), &cache, TTL);
        let device: Device = lookup.device(FACILITY_DEVICE).unwrap();
        assert_eq!(device.code, FACILITY_CODE);
    }

    assert_eq!(state.device_reads, 1);
}

#[test]
fn test_lookup_by_id_also_fills_code_entry() {
    let mut state: StoreState = seed_state();
    let cache: MokaCache<Device> = MokaCache::new(16);

    CachedDevices::new(StoreDevices::new(&mut state), &cache, TTL)
        .device(FACILITY_DEVICE)
        .unwrap();
    let by_code: Device = CachedDevices::new(StoreDevices::new(&mut state), &cache, TTL)
        .device_by_code("abc123")
        .unwrap();

    assert_eq!(by_code.id, FACILITY_DEVICE);
    assert_eq!(state.device_reads, 1);
}

#[test]
fn test_refresh_replaces_stale_entries() {
    let mut state: StoreState = seed_state();
    let cache: MokaCache<Device> = MokaCache::new(16);
    let mut stale: Device = state.devices[&FACILITY_DEVICE].clone();
    stale.code = String::from("OLD-CODE");
    cache.set(&device_key(FACILITY_DEVICE), stale.clone(), TTL);
    cache.set(&device_code_key("OLD-CODE"), stale, TTL);

    let refreshed: Device = CachedDevices::new(StoreDevices::new(&mut state), &cache, TTL)
        .refresh(FACILITY_DEVICE)
        .unwrap();

    assert_eq!(refreshed.code, FACILITY_CODE);
    assert_eq!(
        cache.get(&device_key(FACILITY_DEVICE)).unwrap().code,
        FACILITY_CODE
    );
    assert!(cache.get(&device_code_key("OLD-CODE")).is_none());
    assert!(cache.get(&device_code_key(FACILITY_CODE)).is_some());
}

#[test]
fn test_missing_device_is_not_cached() {
    let mut state: StoreState = seed_state();
    let cache: MokaCache<Device> = MokaCache::new(16);
    let missing: DeviceId = DeviceId::new(404);

    for _ in 0..2 {
        let result = CachedDevices::new(StoreDevices::new(&mut state), &cache, TTL).device(missing);
        assert_eq!(result, Err(CoreError::not_found("device", missing)));
    }

    assert_eq!(state.device_reads, 2);
    assert!(cache.get(&device_key(missing)).is_none());
}

#[test]
fn test_expired_entries_read_through_again() {
    let mut state: StoreState = seed_state();
    let cache: MokaCache<Device> = MokaCache::new(16);
    let short: Duration = Duration::from_millis(20);

    CachedDevices::new(StoreDevices::new(&mut state), &cache, short)
        .device(FACILITY_DEVICE)
        .unwrap();
    std::thread::sleep(Duration::from_millis(80));
    CachedDevices::new(StoreDevices::new(&mut state), &cache, short)
        .device(FACILITY_DEVICE)
        .unwrap();

    assert_eq!(state.device_reads, 2);
}
