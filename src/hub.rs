// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facade tying the store, engine, publisher and scheduler together.

use std::sync::Arc;

use crate::config::{DeviceConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::event::{ChangePublisher, Observer};
use crate::source::StateSource;
use crate::state::Device;
use crate::store::DeviceStore;
use crate::sync::{Scheduler, SchedulerHandle, SyncEngine, SyncOrigin, SyncSummary};
use crate::types::DeviceId;

/// Read-only mirror of a set of hub devices.
///
/// The hub owns the device store and the sync engine and exposes the three
/// surfaces consumers need: reads, manual sync triggers and observer
/// subscriptions. Periodic polling is started separately with
/// [`start_polling`](Self::start_polling).
///
/// # Examples
///
/// ```
/// use appliance_sync::ApplianceHub;
/// use appliance_sync::config::{DeviceConfig, SyncConfig};
/// use appliance_sync::source::{MemorySource, RawState};
/// use appliance_sync::types::{DeviceId, EntityRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> appliance_sync::Result<()> {
/// let source = MemorySource::new();
/// source.set(EntityRef::new("light.living_room_bulb")?, RawState::new("light_on"));
///
/// let hub = ApplianceHub::new(source, &DeviceConfig::default_catalogue(), SyncConfig::default());
///
/// let light = DeviceId::new("light_living")?;
/// let summary = hub.trigger_sync(Some(&light)).await?;
/// assert_eq!(summary.changed(), 1);
/// assert!(hub.device(&light)?.power());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApplianceHub<S> {
    engine: SyncEngine<S>,
    config: SyncConfig,
}

impl<S: StateSource> ApplianceHub<S> {
    /// Creates a hub tracking `devices`, read from `source`.
    ///
    /// Every device starts with its default state until its first sync.
    #[must_use]
    pub fn new(source: S, devices: &[DeviceConfig], config: SyncConfig) -> Self {
        let store = Arc::new(DeviceStore::new(devices));
        let publisher = ChangePublisher::from_config(&config);
        let engine = SyncEngine::new(source, store, publisher, &config);

        tracing::debug!(devices = engine.store().len(), "Hub created");

        Self { engine, config }
    }

    /// Returns the sync engine.
    #[must_use]
    pub fn engine(&self) -> &SyncEngine<S> {
        &self.engine
    }

    /// Returns the sync configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns a snapshot of every tracked device.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.engine.store().snapshots()
    }

    /// Returns a snapshot of one device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if `id` is not tracked.
    pub fn device(&self, id: &DeviceId) -> Result<Device> {
        self.engine
            .store()
            .get(id)
            .ok_or_else(|| Error::DeviceNotFound(id.clone()))
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Syncs one device, or every device when `id` is `None`.
    ///
    /// Unreachable devices do not make this fail; they are reported in the
    /// summary and keep their last known state.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if `id` is not tracked.
    pub async fn trigger_sync(&self, id: Option<&DeviceId>) -> Result<SyncSummary> {
        let Some(id) = id else {
            return Ok(self.engine.sync_all(SyncOrigin::Trigger).await);
        };

        if !self.engine.store().contains(id) {
            return Err(Error::DeviceNotFound(id.clone()));
        }

        let mut summary = SyncSummary::default();
        let outcome = self.engine.sync_device(id, SyncOrigin::Trigger).await;
        summary.record(id.clone(), outcome);
        Ok(summary)
    }

    /// Starts periodic polling in a background task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "dropping the handle stops polling"]
    pub fn start_polling(&self) -> SchedulerHandle {
        Scheduler::new(self.engine.clone(), &self.config).spawn()
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Connects an observer.
    ///
    /// A sweep runs first so the observer's initial snapshot is fresh. The
    /// returned observer yields that snapshot as its first event, followed by
    /// every change committed afterwards.
    pub async fn connect_observer(&self) -> Observer {
        let summary = self.engine.sync_all(SyncOrigin::Connect).await;
        if !summary.is_success() {
            tracing::debug!(
                unavailable = summary.unavailable(),
                "Connecting observer with partially stale state"
            );
        }
        self.engine.publisher().subscribe(self.engine.store())
    }

    /// Returns the number of connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.engine.publisher().subscriber_count()
    }
}

#[cfg(feature = "http")]
impl ApplianceHub<crate::source::HomeAssistantSource> {
    /// Creates a hub reading from a Home Assistant instance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Source` if the Home Assistant client cannot be built.
    pub fn home_assistant(
        ha: crate::source::HomeAssistantConfig,
        devices: &[DeviceConfig],
        config: SyncConfig,
    ) -> Result<Self> {
        let source = ha.into_source()?;
        tracing::info!(base_url = %source.base_url(), "Using Home Assistant source");
        Ok(Self::new(source, devices, config))
    }
}
