// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer handles.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use uuid::Uuid;

use crate::state::Device;
use crate::store::DeviceStore;

use super::DeviceUpdate;

/// Unique identifier of a connected observer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell observers apart in logs
        let short = &self.0.simple().to_string()[..8];
        write!(f, "ObserverId({short}...)")
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event delivered to an [`Observer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// Full snapshot of every device.
    ///
    /// Always the first event, and sent again after the observer lagged.
    InitialState {
        /// Every tracked device.
        devices: Vec<Device>,
    },
    /// A single committed change.
    #[serde(rename = "device_update")]
    Update(DeviceUpdate),
}

/// A subscription to committed device changes.
///
/// Dropping the observer unsubscribes it.
pub struct Observer {
    id: ObserverId,
    receiver: broadcast::Receiver<DeviceUpdate>,
    store: Arc<DeviceStore>,
    pending: Option<Vec<Device>>,
}

impl Observer {
    /// Creates an observer whose first event is `initial`.
    ///
    /// `receiver` must be subscribed before `initial` is read from the
    /// store, so updates buffered in it are never older than the snapshot.
    pub(super) fn new(
        receiver: broadcast::Receiver<DeviceUpdate>,
        store: Arc<DeviceStore>,
        initial: Vec<Device>,
    ) -> Self {
        Self {
            id: ObserverId::new(),
            receiver,
            store,
            pending: Some(initial),
        }
    }

    /// Returns the observer id.
    #[must_use]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn recv(&mut self) -> Option<ObserverEvent> {
        if let Some(event) = self.take_snapshot() {
            return Some(event);
        }

        match self.receiver.recv().await {
            Ok(update) => Some(ObserverEvent::Update(update)),
            Err(RecvError::Lagged(missed)) => Some(self.resync(missed)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Returns the next event if one is ready.
    pub fn try_recv(&mut self) -> Option<ObserverEvent> {
        if let Some(event) = self.take_snapshot() {
            return Some(event);
        }

        match self.receiver.try_recv() {
            Ok(update) => Some(ObserverEvent::Update(update)),
            Err(TryRecvError::Lagged(missed)) => Some(self.resync(missed)),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Unsubscribes the observer.
    pub fn unsubscribe(self) {
        drop(self);
    }

    fn take_snapshot(&mut self) -> Option<ObserverEvent> {
        self.pending
            .take()
            .map(|devices| ObserverEvent::InitialState { devices })
    }

    fn resync(&mut self, missed: u64) -> ObserverEvent {
        tracing::warn!(observer_id = %self.id, missed, "Observer lagged, resending full state");
        // Updates still buffered predate the snapshot below
        self.receiver = self.receiver.resubscribe();
        ObserverEvent::InitialState {
            devices: self.store.snapshots(),
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.id)
            .field("snapshot_pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        tracing::debug!(observer_id = %self.id, "Observer disconnected");
    }
}
