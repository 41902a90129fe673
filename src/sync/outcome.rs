// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sync results.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::types::DeviceId;

/// Result of syncing one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The device state changed and the change was published.
    Changed,
    /// The source confirmed the stored state.
    Unchanged,
    /// The source could not be read; the last known state was kept.
    SourceUnavailable,
    /// The device id is not tracked.
    NotTracked,
}

impl SyncOutcome {
    /// Returns `true` if the source was reached.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        matches!(self, Self::Changed | Self::Unchanged)
    }

    /// Returns the outcome as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::SourceUnavailable => "source_unavailable",
            Self::NotTracked => "not_tracked",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-device outcomes of a sweep.
///
/// Serializes the per-device outcomes together with the `changed`,
/// `unchanged`, `unavailable` and `not_tracked` counts.
///
/// # Examples
///
/// ```
/// use appliance_sync::sync::{SyncOutcome, SyncSummary};
/// use appliance_sync::types::DeviceId;
///
/// let mut summary = SyncSummary::default();
/// summary.record(DeviceId::new("light_living").unwrap(), SyncOutcome::Changed);
/// summary.record(DeviceId::new("air_conditioner").unwrap(), SyncOutcome::SourceUnavailable);
///
/// assert_eq!(summary.changed(), 1);
/// assert_eq!(summary.unavailable(), 1);
/// assert!(!summary.is_success());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    outcomes: BTreeMap<DeviceId, SyncOutcome>,
}

impl SyncSummary {
    /// Records the outcome for one device.
    pub fn record(&mut self, id: DeviceId, outcome: SyncOutcome) {
        self.outcomes.insert(id, outcome);
    }

    /// Returns the outcome recorded for `id`.
    #[must_use]
    pub fn outcome(&self, id: &DeviceId) -> Option<SyncOutcome> {
        self.outcomes.get(id).copied()
    }

    /// Iterates over the recorded outcomes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, SyncOutcome)> {
        self.outcomes.iter().map(|(id, outcome)| (id, *outcome))
    }

    /// Returns the number of devices synced.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of devices whose state changed.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.count(SyncOutcome::Changed)
    }

    /// Returns the number of devices confirmed unchanged.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(SyncOutcome::Unchanged)
    }

    /// Returns the number of devices whose source could not be read.
    #[must_use]
    pub fn unavailable(&self) -> usize {
        self.count(SyncOutcome::SourceUnavailable)
    }

    /// Returns the number of untracked ids.
    #[must_use]
    pub fn not_tracked(&self) -> usize {
        self.count(SyncOutcome::NotTracked)
    }

    /// Returns `true` if every device was reached.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(SyncOutcome::is_reachable)
    }

    fn count(&self, outcome: SyncOutcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

impl Serialize for SyncSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SyncSummary", 5)?;
        state.serialize_field("outcomes", &self.outcomes)?;
        state.serialize_field("changed", &self.changed())?;
        state.serialize_field("unchanged", &self.unchanged())?;
        state.serialize_field("unavailable", &self.unavailable())?;
        state.serialize_field("not_tracked", &self.not_tracked())?;
        state.end()
    }
}
