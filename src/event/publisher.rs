// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast publisher for committed changes.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::SyncConfig;
use crate::state::Device;
use crate::store::DeviceStore;

use super::{DeviceUpdate, Observer, SyncOrigin};

/// Fans committed device changes out to every connected [`Observer`].
///
/// # Capacity
///
/// Each observer can buffer `capacity` updates. Publishing never waits: an
/// observer whose buffer overflows loses the oldest updates and is resynced
/// with a full snapshot on its next receive.
#[derive(Debug, Clone)]
pub struct ChangePublisher {
    sender: broadcast::Sender<DeviceUpdate>,
}

impl ChangePublisher {
    /// Creates a publisher buffering up to `capacity` updates per observer.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a publisher sized by `config`.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.event_capacity())
    }

    /// Subscribes a new observer.
    ///
    /// The observer's first event is a snapshot of `store` taken right after
    /// the subscription, so no committed change can fall between the two.
    /// A change committed in that window may be delivered again as an
    /// update, never older than the snapshot.
    #[must_use]
    pub fn subscribe(&self, store: &Arc<DeviceStore>) -> Observer {
        let receiver = self.sender.subscribe();
        let initial = store.snapshots();
        let observer = Observer::new(receiver, Arc::clone(store), initial);
        tracing::info!(
            observer_id = %observer.id(),
            observers = self.subscriber_count(),
            "Observer connected"
        );
        observer
    }

    /// Returns the number of connected observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes a committed snapshot and returns how many observers got it.
    ///
    /// With no observers connected the update is dropped.
    pub fn publish(&self, device: Device, origin: SyncOrigin) -> usize {
        let update = DeviceUpdate::new(device, origin);
        let device_id = update.device_id().clone();
        let delivered = self.sender.send(update).unwrap_or(0);
        tracing::debug!(%device_id, %origin, delivered, "Published device update");
        delivered
    }
}

impl Default for ChangePublisher {
    fn default() -> Self {
        Self::new(SyncConfig::DEFAULT_EVENT_CAPACITY)
    }
}
