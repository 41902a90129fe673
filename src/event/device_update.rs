// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Update payload types.

use std::fmt;

use serde::Serialize;

use crate::state::Device;
use crate::types::DeviceId;

/// What started the sync that produced an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOrigin {
    /// A scheduler tick.
    Periodic,
    /// An explicit trigger through the hub.
    Trigger,
    /// The sweep run when an observer connects.
    Connect,
}

impl SyncOrigin {
    /// Returns the origin as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::Trigger => "trigger",
            Self::Connect => "connect",
        }
    }
}

impl fmt::Display for SyncOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed change to one device.
///
/// Updates are only ever produced for real changes and never as the echo of
/// a user command (the system has no command path), so `changed` is always
/// `true` and `from_user` always `false`. Both are carried for observers
/// that expect them on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceUpdate {
    device_id: DeviceId,
    device: Device,
    changed: bool,
    from_user: bool,
    origin: SyncOrigin,
}

impl DeviceUpdate {
    /// Creates an update carrying the committed snapshot.
    #[must_use]
    pub fn new(device: Device, origin: SyncOrigin) -> Self {
        Self {
            device_id: device.id().clone(),
            device,
            changed: true,
            from_user: false,
            origin,
        }
    }

    /// Returns the id of the changed device.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the committed snapshot.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Returns what triggered the sync.
    #[must_use]
    pub fn origin(&self) -> SyncOrigin {
        self.origin
    }

    /// Always `true`.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Always `false`.
    #[must_use]
    pub fn from_user(&self) -> bool {
        self.from_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;

    #[test]
    fn update_wire_shape() {
        let config = DeviceConfig::default_catalogue().remove(1);
        let update = DeviceUpdate::new(Device::new(&config), SyncOrigin::Periodic);

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["device_id"], "light_living");
        assert_eq!(json["device"]["name"], "客厅灯");
        assert_eq!(json["changed"], true);
        assert_eq!(json["from_user"], false);
        assert_eq!(json["origin"], "periodic");
    }

    #[test]
    fn origin_display() {
        assert_eq!(SyncOrigin::Trigger.to_string(), "trigger");
        assert_eq!(SyncOrigin::Connect.as_str(), "connect");
    }
}
