// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for periodic polling, using paused tokio time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use appliance_sync::config::{DeviceConfig, SyncConfig};
use appliance_sync::error::SourceError;
use appliance_sync::event::ObserverEvent;
use appliance_sync::source::{MemorySource, RawState, StateSource};
use appliance_sync::types::{DeviceId, EntityRef};
use appliance_sync::ApplianceHub;

fn light_entity() -> EntityRef {
    EntityRef::new("light.living_room_bulb").unwrap()
}

fn config() -> SyncConfig {
    SyncConfig::new()
        .with_poll_interval(Duration::from_secs(1))
        .with_fault_backoff(Duration::from_secs(2))
}

/// Panics on the first `panics` fetches, then reads from the inner source.
#[derive(Clone)]
struct FlakySource {
    inner: MemorySource,
    remaining_panics: Arc<AtomicUsize>,
}

impl FlakySource {
    fn new(inner: MemorySource, panics: usize) -> Self {
        Self {
            inner,
            remaining_panics: Arc::new(AtomicUsize::new(panics)),
        }
    }
}

impl StateSource for FlakySource {
    async fn fetch(&self, entity: &EntityRef) -> Result<RawState, SourceError> {
        let should_panic = self
            .remaining_panics
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        assert!(!should_panic, "source exploded");
        self.inner.fetch(entity).await
    }
}

#[tokio::test(start_paused = true)]
async fn polls_at_interval() {
    let source = MemorySource::new();
    source.set(light_entity(), RawState::new("light_on"));
    let hub = ApplianceHub::new(source.clone(), &DeviceConfig::default_catalogue(), config());

    let handle = hub.start_polling();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    // Sweeps at 0s, 1s, 2s and 3s, two devices each.
    let fetches = source.fetch_count();
    assert!((6..=8).contains(&fetches), "unexpected fetch count {fetches}");
    assert!(hub.device(&DeviceId::new("light_living").unwrap()).unwrap().power());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn polling_publishes_changes() {
    let source = MemorySource::new();
    let hub = ApplianceHub::new(source.clone(), &DeviceConfig::default_catalogue(), config());
    let mut observer = hub.connect_observer().await;
    let _ = observer.recv().await;

    let handle = hub.start_polling();
    source.set(light_entity(), RawState::new("light_on"));

    let Some(ObserverEvent::Update(update)) = observer.recv().await else {
        panic!("expected update from polling");
    };
    assert_eq!(update.device_id().as_str(), "light_living");

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_polling() {
    let source = MemorySource::new();
    let hub = ApplianceHub::new(source.clone(), &DeviceConfig::default_catalogue(), config());

    let handle = hub.start_polling();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(handle.is_running());
    handle.shutdown().await;

    let after_shutdown = source.fetch_count();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.fetch_count(), after_shutdown);
}

#[tokio::test(start_paused = true)]
async fn shutdown_lets_running_sweep_finish() {
    let source = MemorySource::new();
    source.set(light_entity(), RawState::new("light_on"));
    source.set_latency(Duration::from_millis(400));
    let hub = ApplianceHub::new(source.clone(), &DeviceConfig::default_catalogue(), config());

    let handle = hub.start_polling();
    // Inside the first sweep, while the air conditioner fetch is pending.
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.shutdown().await;

    assert_eq!(source.fetch_count(), 2);
    assert!(hub.device(&DeviceId::new("light_living").unwrap()).unwrap().power());
}

#[tokio::test(start_paused = true)]
async fn panicking_sweep_is_survived() {
    let memory = MemorySource::new();
    memory.set(light_entity(), RawState::new("light_on"));
    let source = FlakySource::new(memory.clone(), 1);
    let hub = ApplianceHub::new(source, &DeviceConfig::default_catalogue(), config());

    let handle = hub.start_polling();

    // First sweep panics on its first fetch; the next one runs after the
    // fault backoff.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(memory.fetch_count(), 0);
    assert!(handle.is_running());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(memory.fetch_count() >= 2);
    assert!(hub.device(&DeviceId::new("light_living").unwrap()).unwrap().power());

    handle.shutdown().await;
}
