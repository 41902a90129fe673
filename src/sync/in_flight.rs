// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device registry of running syncs.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::types::DeviceId;

use super::SyncOutcome;

type Slot = watch::Receiver<Option<SyncOutcome>>;

/// Tracks which devices have a sync in flight.
///
/// The first caller for a device becomes the leader and runs the sync.
/// Later callers follow: they wait on the leader's watch channel for its
/// outcome. The slot is removed when the leader's guard drops, whether it
/// finished or was cancelled.
#[derive(Debug, Default)]
pub(super) struct InFlight {
    slots: Mutex<HashMap<DeviceId, Slot>>,
}

pub(super) enum Claim<'a> {
    Leader(LeaderGuard<'a>),
    Follower(Slot),
}

impl InFlight {
    pub(super) fn claim(&self, id: &DeviceId) -> Claim<'_> {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(id) {
            return Claim::Follower(slot.clone());
        }

        let (sender, receiver) = watch::channel(None);
        slots.insert(id.clone(), receiver);
        Claim::Leader(LeaderGuard {
            registry: self,
            id: id.clone(),
            sender,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Held by the leader of a device sync.
pub(super) struct LeaderGuard<'a> {
    registry: &'a InFlight,
    id: DeviceId,
    sender: watch::Sender<Option<SyncOutcome>>,
}

impl LeaderGuard<'_> {
    /// Hands the outcome to every follower and releases the slot.
    pub(super) fn finish(self, outcome: SyncOutcome) {
        self.sender.send_replace(Some(outcome));
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        // The sender is dropped after this body, so a follower that sees the
        // channel close always finds the slot already gone.
        self.registry.slots.lock().remove(&self.id);
    }
}

/// Waits for the leader's outcome.
///
/// Returns `None` if the leader went away without finishing.
pub(super) async fn follow(mut slot: Slot) -> Option<SyncOutcome> {
    slot.wait_for(Option::is_some).await.ok().and_then(|outcome| *outcome)
}
