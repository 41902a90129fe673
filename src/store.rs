// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concurrency-safe table of canonical device records.
//!
//! The store is created once from the device catalogue and never grows or
//! shrinks afterwards. Every write goes through
//! [`DeviceStore::compare_and_commit`], which compares and writes under one
//! write lock so that two concurrent commits of the same value cannot both
//! observe a change.

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::config::DeviceConfig;
use crate::state::{Device, DeviceState};
use crate::types::{DeviceId, DeviceKind, EntityRef};

/// Result of [`DeviceStore::compare_and_commit`].
///
/// The committed snapshot travels with the outcome, so callers never need to
/// re-read the store (where a later commit may already have replaced it).
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// At least one comparable field differed; the candidate was written.
    Changed(Device),
    /// The candidate matched the stored state; only the sync time moved.
    Unchanged(Device),
    /// No record with this id (or of this kind) exists.
    NotFound,
}

impl CommitOutcome {
    /// Returns `true` for [`CommitOutcome::Changed`].
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Returns the committed snapshot, if any.
    #[must_use]
    pub fn device(&self) -> Option<&Device> {
        match self {
            Self::Changed(device) | Self::Unchanged(device) => Some(device),
            Self::NotFound => None,
        }
    }
}

/// Where to read a device from, as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// Device key.
    pub id: DeviceId,
    /// Normalization rules to apply.
    pub kind: DeviceKind,
    /// Upstream entity to fetch.
    pub source_ref: EntityRef,
}

/// Table of device records keyed by [`DeviceId`].
///
/// Iteration order is the id order, so sweeps and listings are
/// deterministic.
///
/// # Examples
///
/// ```
/// use appliance_sync::config::DeviceConfig;
/// use appliance_sync::store::DeviceStore;
/// use appliance_sync::state::{DeviceState, LightState};
/// use appliance_sync::types::DeviceId;
///
/// let store = DeviceStore::new(&DeviceConfig::default_catalogue());
/// let light = DeviceId::new("light_living").unwrap();
///
/// let outcome = store.compare_and_commit(&light, DeviceState::Light(LightState::new(true)));
/// assert!(outcome.is_changed());
/// assert!(store.get(&light).unwrap().power());
/// ```
#[derive(Debug)]
pub struct DeviceStore {
    devices: RwLock<BTreeMap<DeviceId, Device>>,
}

impl DeviceStore {
    /// Creates a store holding one default record per configured device.
    ///
    /// If an id is configured twice the first entry wins.
    #[must_use]
    pub fn new(configs: &[DeviceConfig]) -> Self {
        let mut devices = BTreeMap::new();
        for config in configs {
            if devices.contains_key(&config.id) {
                tracing::warn!(device_id = %config.id, "Duplicate device id ignored");
                continue;
            }
            devices.insert(config.id.clone(), Device::new(config));
        }
        Self {
            devices: RwLock::new(devices),
        }
    }

    /// Returns a snapshot of one device.
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<Device> {
        self.devices.read().get(id).cloned()
    }

    /// Returns `true` if `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.read().contains_key(id)
    }

    /// Calls `f` for every record while holding the read lock.
    ///
    /// `f` must not call back into the store.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Device),
    {
        for device in self.devices.read().values() {
            f(device);
        }
    }

    /// Returns every tracked id.
    #[must_use]
    pub fn ids(&self) -> Vec<DeviceId> {
        self.devices.read().keys().cloned().collect()
    }

    /// Returns a snapshot of every record.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Device> {
        self.devices.read().values().cloned().collect()
    }

    /// Returns what the sync engine needs to fetch `id`.
    #[must_use]
    pub fn target(&self, id: &DeviceId) -> Option<SyncTarget> {
        self.devices.read().get(id).map(|device| SyncTarget {
            id: device.id().clone(),
            kind: device.kind(),
            source_ref: device.source_ref().clone(),
        })
    }

    /// Returns the number of tracked devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns `true` if no device is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Compares `candidate` with the stored state and writes it.
    ///
    /// Comparison, write and timestamp refresh happen in one critical
    /// section. `last_updated` is refreshed even when nothing else changed.
    /// A candidate of a different device kind is rejected as
    /// [`CommitOutcome::NotFound`] and leaves the record untouched.
    pub fn compare_and_commit(&self, id: &DeviceId, candidate: DeviceState) -> CommitOutcome {
        let mut devices = self.devices.write();
        let Some(device) = devices.get_mut(id) else {
            return CommitOutcome::NotFound;
        };

        if device.kind() != candidate.kind() {
            tracing::warn!(
                device_id = %id,
                expected = %device.kind(),
                actual = %candidate.kind(),
                "Rejected candidate of the wrong device kind"
            );
            return CommitOutcome::NotFound;
        }

        if device.commit(candidate, Utc::now()) {
            CommitOutcome::Changed(device.clone())
        } else {
            CommitOutcome::Unchanged(device.clone())
        }
    }
}
