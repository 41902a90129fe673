// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The sync engine.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::event::{ChangePublisher, SyncOrigin};
use crate::normalize::normalize;
use crate::source::{RawState, StateSource};
use crate::store::{CommitOutcome, DeviceStore, SyncTarget};
use crate::types::DeviceId;

use super::in_flight::{self, Claim, InFlight};
use super::{SyncOutcome, SyncSummary};

struct EngineInner<S> {
    store: Arc<DeviceStore>,
    source: S,
    publisher: ChangePublisher,
    fetch_timeout: Duration,
    in_flight: InFlight,
}

/// Mirrors upstream state into a [`DeviceStore`].
///
/// The engine is cheap to clone; clones share the store, the source, the
/// publisher and the in-flight registry, so a clone can be moved into a
/// spawned task.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use appliance_sync::config::{DeviceConfig, SyncConfig};
/// use appliance_sync::event::ChangePublisher;
/// use appliance_sync::source::{MemorySource, RawState};
/// use appliance_sync::store::DeviceStore;
/// use appliance_sync::sync::{SyncEngine, SyncOrigin, SyncOutcome};
/// use appliance_sync::types::{DeviceId, EntityRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = MemorySource::new();
/// source.set(EntityRef::new("light.living_room_bulb").unwrap(), RawState::new("light_on"));
///
/// let store = Arc::new(DeviceStore::new(&DeviceConfig::default_catalogue()));
/// let engine = SyncEngine::new(source, store, ChangePublisher::default(), &SyncConfig::default());
///
/// let light = DeviceId::new("light_living").unwrap();
/// assert_eq!(engine.sync_device(&light, SyncOrigin::Trigger).await, SyncOutcome::Changed);
/// assert_eq!(engine.sync_device(&light, SyncOrigin::Trigger).await, SyncOutcome::Unchanged);
/// # }
/// ```
pub struct SyncEngine<S> {
    inner: Arc<EngineInner<S>>,
}

impl<S> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for SyncEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("devices", &self.inner.store.len())
            .field("fetch_timeout", &self.inner.fetch_timeout)
            .field("observers", &self.inner.publisher.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl<S: StateSource> SyncEngine<S> {
    /// Creates an engine over `store`, reading from `source`.
    #[must_use]
    pub fn new(
        source: S,
        store: Arc<DeviceStore>,
        publisher: ChangePublisher,
        config: &SyncConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                source,
                publisher,
                fetch_timeout: config.fetch_timeout(),
                in_flight: InFlight::default(),
            }),
        }
    }

    /// Returns the store the engine writes to.
    #[must_use]
    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.inner.store
    }

    /// Returns the publisher changes are sent to.
    #[must_use]
    pub fn publisher(&self) -> &ChangePublisher {
        &self.inner.publisher
    }

    /// Returns the state source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Syncs one device.
    ///
    /// If a sync of the same device is already running, this waits for it
    /// and returns its outcome instead of fetching again. Should that sync be
    /// cancelled before finishing, this call runs its own.
    pub async fn sync_device(&self, id: &DeviceId, origin: SyncOrigin) -> SyncOutcome {
        loop {
            match self.inner.in_flight.claim(id) {
                Claim::Leader(guard) => {
                    let outcome = self.run(id, origin).await;
                    guard.finish(outcome);
                    return outcome;
                }
                Claim::Follower(slot) => {
                    tracing::debug!(device_id = %id, %origin, "Sync in flight, awaiting its outcome");
                    if let Some(outcome) = in_flight::follow(slot).await {
                        return outcome;
                    }
                    tracing::debug!(device_id = %id, "In-flight sync was cancelled, retrying");
                }
            }
        }
    }

    /// Syncs every tracked device in id order.
    ///
    /// Each device is synced independently; one unreachable device does not
    /// keep the others from being updated.
    pub async fn sync_all(&self, origin: SyncOrigin) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for id in self.inner.store.ids() {
            let outcome = self.sync_device(&id, origin).await;
            summary.record(id, outcome);
        }

        tracing::debug!(
            %origin,
            changed = summary.changed(),
            unchanged = summary.unchanged(),
            unavailable = summary.unavailable(),
            "Sweep complete"
        );
        summary
    }

    async fn run(&self, id: &DeviceId, origin: SyncOrigin) -> SyncOutcome {
        let Some(target) = self.inner.store.target(id) else {
            tracing::debug!(device_id = %id, "Device not tracked");
            return SyncOutcome::NotTracked;
        };

        let Some(raw) = self.fetch(&target).await else {
            return SyncOutcome::SourceUnavailable;
        };

        let normalized = normalize(target.kind, &raw);
        for miss in &normalized.misses {
            tracing::warn!(
                device_id = %id,
                field = miss.field.as_str(),
                raw = %miss.raw,
                "Unrecognized upstream value, using fallback"
            );
        }

        match self.inner.store.compare_and_commit(id, normalized.state) {
            CommitOutcome::Changed(device) => {
                tracing::info!(
                    device_id = %id,
                    %origin,
                    power = device.power(),
                    "Device state changed"
                );
                // Published while this sync still owns the device, so updates
                // for one device reach observers in commit order.
                self.inner.publisher.publish(device, origin);
                SyncOutcome::Changed
            }
            CommitOutcome::Unchanged(_) => {
                tracing::debug!(device_id = %id, %origin, "Device state unchanged");
                SyncOutcome::Unchanged
            }
            CommitOutcome::NotFound => SyncOutcome::NotTracked,
        }
    }

    async fn fetch(&self, target: &SyncTarget) -> Option<RawState> {
        let timeout = self.inner.fetch_timeout;
        match tokio::time::timeout(timeout, self.inner.source.fetch(&target.source_ref)).await {
            Ok(Ok(raw)) => Some(raw),
            Ok(Err(e)) => {
                tracing::warn!(
                    device_id = %target.id,
                    entity = %target.source_ref,
                    error = %e,
                    "Source unavailable, keeping last known state"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    device_id = %target.id,
                    entity = %target.source_ref,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "Fetch timed out, keeping last known state"
                );
                None
            }
        }
    }
}
