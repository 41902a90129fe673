// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory state source.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::SourceError;
use crate::types::EntityRef;

use super::{RawState, StateSource};

#[derive(Debug, Clone)]
enum Entry {
    Available(RawState),
    Failing,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<EntityRef, Entry>>,
    latency: Mutex<Duration>,
    fetches: AtomicUsize,
}

/// A [`StateSource`] backed by values held in memory.
///
/// Clones share the same entries, so a test can keep a handle and change what
/// the "hub" reports while a sync engine owns another clone. Entities that
/// were never set, or were marked failing, report
/// [`SourceError::EntityUnavailable`].
///
/// # Examples
///
/// ```
/// use appliance_sync::source::{MemorySource, RawState};
/// use appliance_sync::types::EntityRef;
///
/// let source = MemorySource::new();
/// let light = EntityRef::new("light.living_room_bulb").unwrap();
/// source.set(light.clone(), RawState::new("light_on"));
/// source.fail(&light);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<Inner>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the state reported for `entity`.
    pub fn set(&self, entity: EntityRef, raw: RawState) {
        self.inner.entries.lock().insert(entity, Entry::Available(raw));
    }

    /// Makes every fetch of `entity` fail until it is set again.
    pub fn fail(&self, entity: &EntityRef) {
        self.inner
            .entries
            .lock()
            .insert(entity.clone(), Entry::Failing);
    }

    /// Delays every fetch by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock() = latency;
    }

    /// Returns how many fetches were started, across all entities.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }
}

impl StateSource for MemorySource {
    async fn fetch(&self, entity: &EntityRef) -> Result<RawState, SourceError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);

        let latency = *self.inner.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let entry = self.inner.entries.lock().get(entity).cloned();
        match entry {
            Some(Entry::Available(raw)) => Ok(raw),
            Some(Entry::Failing) | None => Err(SourceError::EntityUnavailable(entity.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> EntityRef {
        EntityRef::new("light.living_room_bulb").unwrap()
    }

    #[tokio::test]
    async fn returns_stored_state() {
        let source = MemorySource::new();
        source.set(entity(), RawState::new("light_on"));

        let raw = source.fetch(&entity()).await.unwrap();
        assert_eq!(raw.state(), Some("light_on"));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn unknown_entity_is_unavailable() {
        let source = MemorySource::new();
        let err = source.fetch(&entity()).await.unwrap_err();
        assert!(matches!(err, SourceError::EntityUnavailable(_)));
    }

    #[tokio::test]
    async fn failing_entity_recovers_when_set() {
        let source = MemorySource::new();
        source.fail(&entity());
        assert!(source.fetch(&entity()).await.is_err());

        source.set(entity(), RawState::new("light_off"));
        assert!(source.fetch(&entity()).await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let source = MemorySource::new();
        let handle = source.clone();
        handle.set(entity(), RawState::new("light_on"));

        assert!(source.fetch(&entity()).await.is_ok());
        assert_eq!(handle.fetch_count(), 1);
    }
}
