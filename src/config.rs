// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the device catalogue and the sync engine.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use appliance_sync::config::{DeviceConfig, SyncConfig};
//!
//! let devices = DeviceConfig::default_catalogue();
//! assert_eq!(devices.len(), 2);
//!
//! let config = SyncConfig::new()
//!     .with_poll_interval(Duration::from_millis(500))
//!     .with_fetch_timeout(Duration::from_secs(2));
//! assert_eq!(config.fetch_timeout(), Duration::from_secs(2));
//! ```

use std::time::Duration;

use crate::error::ValueError;
use crate::types::{DeviceId, DeviceKind, EntityRef};

/// Static description of one tracked device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Store key of the device.
    pub id: DeviceId,
    /// Human-readable name.
    pub name: String,
    /// Which normalization rules apply.
    pub kind: DeviceKind,
    /// Upstream entity the device mirrors.
    pub source_ref: EntityRef,
}

impl DeviceConfig {
    /// Creates a device configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyIdentifier` if `id` or `source_ref` is empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: DeviceKind,
        source_ref: impl Into<String>,
    ) -> Result<Self, ValueError> {
        Ok(Self {
            id: DeviceId::new(id)?,
            name: name.into(),
            kind,
            source_ref: EntityRef::new(source_ref)?,
        })
    }

    /// Creates an air conditioner configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyIdentifier` if `id` or `source_ref` is empty.
    pub fn air_conditioner(
        id: impl Into<String>,
        name: impl Into<String>,
        source_ref: impl Into<String>,
    ) -> Result<Self, ValueError> {
        Self::new(id, name, DeviceKind::AirConditioner, source_ref)
    }

    /// Creates a light configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyIdentifier` if `id` or `source_ref` is empty.
    pub fn light(
        id: impl Into<String>,
        name: impl Into<String>,
        source_ref: impl Into<String>,
    ) -> Result<Self, ValueError> {
        Self::new(id, name, DeviceKind::Light, source_ref)
    }

    /// Returns the living-room air conditioner and light.
    #[must_use]
    pub fn default_catalogue() -> Vec<Self> {
        vec![
            Self {
                id: DeviceId::from_static("air_conditioner"),
                name: "客厅空调".to_string(),
                kind: DeviceKind::AirConditioner,
                source_ref: EntityRef::from_static("sensor.bedroom_ac_status"),
            },
            Self {
                id: DeviceId::from_static("light_living"),
                name: "客厅灯".to_string(),
                kind: DeviceKind::Light,
                source_ref: EntityRef::from_static("light.living_room_bulb"),
            },
        ]
    }
}

/// Timing and buffering parameters of the sync engine and scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    poll_interval: Duration,
    fetch_timeout: Duration,
    fault_backoff: Duration,
    event_capacity: usize,
}

impl SyncConfig {
    /// Default delay between periodic sweeps.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    /// Default bound on a single upstream fetch.
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default pause after a sweep fault before the loop resumes.
    pub const DEFAULT_FAULT_BACKOFF: Duration = Duration::from_secs(1);
    /// Default number of updates buffered per observer.
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            fault_backoff: Self::DEFAULT_FAULT_BACKOFF,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Sets the delay between periodic sweeps.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the bound on a single upstream fetch.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the pause after a sweep fault.
    #[must_use]
    pub fn with_fault_backoff(mut self, backoff: Duration) -> Self {
        self.fault_backoff = backoff;
        self
    }

    /// Sets the number of updates buffered per observer.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Returns the delay between periodic sweeps.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the bound on a single upstream fetch.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Returns the pause after a sweep fault.
    #[must_use]
    pub fn fault_backoff(&self) -> Duration {
        self.fault_backoff
    }

    /// Returns the number of updates buffered per observer.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_matches_living_room() {
        let devices = DeviceConfig::default_catalogue();

        assert_eq!(devices[0].id.as_str(), "air_conditioner");
        assert_eq!(devices[0].kind, DeviceKind::AirConditioner);
        assert_eq!(devices[0].source_ref.as_str(), "sensor.bedroom_ac_status");

        assert_eq!(devices[1].id.as_str(), "light_living");
        assert_eq!(devices[1].kind, DeviceKind::Light);
        assert_eq!(devices[1].source_ref.as_str(), "light.living_room_bulb");
    }

    #[test]
    fn constructors_validate_ids() {
        assert!(DeviceConfig::light("", "Lamp", "light.lamp").is_err());
        assert!(DeviceConfig::air_conditioner("ac", "AC", " ").is_err());
    }

    #[test]
    fn sync_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.fault_backoff(), Duration::from_secs(1));
        assert_eq!(config.event_capacity(), 256);
    }

    #[test]
    fn zero_event_capacity_is_raised() {
        assert_eq!(SyncConfig::new().with_event_capacity(0).event_capacity(), 1);
    }

    #[test]
    fn device_config_from_json() {
        let config: DeviceConfig = serde_json::from_value(serde_json::json!({
            "id": "hall_light",
            "name": "Hall",
            "kind": "light",
            "source_ref": "light.hall"
        }))
        .unwrap();
        assert_eq!(config.kind, DeviceKind::Light);
    }
}
