// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device record.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::config::DeviceConfig;
use crate::types::{AcMode, DeviceId, DeviceKind, EntityRef, FanSpeed};

use super::DeviceState;

/// A tracked device: identity, upstream reference and canonical state.
///
/// Records live in the [`DeviceStore`](crate::store::DeviceStore); every
/// clone handed out by the store is a consistent snapshot. Devices are
/// always read-only mirrors of the hub.
///
/// # Serialization
///
/// A device serializes to the flat JSON shape consumed by dashboards:
///
/// ```
/// use appliance_sync::config::DeviceConfig;
/// use appliance_sync::state::Device;
///
/// let config = DeviceConfig::light("light_living", "客厅灯", "light.living_room_bulb").unwrap();
/// let device = Device::new(&config);
///
/// let json = serde_json::to_value(&device).unwrap();
/// assert_eq!(json["type"], "light");
/// assert_eq!(json["is_on"], false);
/// assert_eq!(json["read_only"], true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: DeviceId,
    name: String,
    source_ref: EntityRef,
    state: DeviceState,
    last_updated: Option<DateTime<Utc>>,
}

impl Device {
    /// Creates a record in its initial, never-synced state.
    #[must_use]
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            source_ref: config.source_ref.clone(),
            state: DeviceState::initial(config.kind),
            last_updated: None,
        }
    }

    /// Returns the device id.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Returns the upstream entity this device mirrors.
    #[must_use]
    pub fn source_ref(&self) -> &EntityRef {
        &self.source_ref
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.state.kind()
    }

    /// Returns the canonical state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns whether the device is actively doing something.
    #[must_use]
    pub fn power(&self) -> bool {
        self.state.power()
    }

    /// Returns when a sync last confirmed this state, if ever.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Always `true`: commands are never sent to the hub.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        true
    }

    /// Overwrites the state in place and stamps the sync time.
    ///
    /// Returns `true` if any comparable field differed.
    pub(crate) fn commit(&mut self, candidate: DeviceState, at: DateTime<Utc>) -> bool {
        let changed = self.state != candidate;
        self.state = candidate;
        self.last_updated = Some(at);
        changed
    }
}

#[derive(Serialize)]
struct DeviceWire<'a> {
    id: &'a DeviceId,
    name: &'a str,
    #[serde(rename = "type")]
    kind: DeviceKind,
    is_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<AcMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode_display: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fan_speed: Option<FanSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fan_speed_display: Option<&'a str>,
    last_updated: Option<DateTime<Utc>>,
    ha_entity: &'a EntityRef,
    read_only: bool,
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ac = self.state.as_air_conditioner();
        DeviceWire {
            id: &self.id,
            name: &self.name,
            kind: self.kind(),
            is_on: self.power(),
            temperature: ac.map(super::AcState::target_temperature),
            mode: ac.map(super::AcState::mode),
            mode_display: ac.map(super::AcState::display_mode),
            fan_speed: ac.map(super::AcState::fan_speed),
            fan_speed_display: ac.map(super::AcState::display_fan_speed),
            last_updated: self.last_updated,
            ha_entity: &self.source_ref,
            read_only: self.read_only(),
        }
        .serialize(serializer)
    }
}
