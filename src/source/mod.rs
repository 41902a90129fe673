// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Upstream state sources.
//!
//! A [`StateSource`] answers one question: what does the hub currently report
//! for an entity? Sources are strictly read-only; nothing in this crate sends
//! commands upstream.
//!
//! # Sources
//!
//! - [`HomeAssistantSource`]: Home Assistant REST API (`http` feature)
//! - [`MemorySource`]: in-process values for demos and tests

#[cfg(feature = "http")]
mod home_assistant;
mod memory;

#[cfg(feature = "http")]
pub use home_assistant::{HomeAssistantConfig, HomeAssistantSource};
pub use memory::MemorySource;

use std::future::Future;

use serde_json::{Map, Value};

use crate::error::SourceError;
use crate::types::EntityRef;

/// Raw entity state as reported by the hub.
///
/// `state` is the upstream state token (for example `制热` or `light_on`);
/// `attributes` is the free-form attribute bag. Unknown response fields are
/// ignored when decoding.
///
/// # Examples
///
/// ```
/// use appliance_sync::source::RawState;
///
/// let raw = RawState::new("制热")
///     .with_attribute("temperature", "24")
///     .with_attribute("fan_mode", "高速");
/// assert_eq!(raw.state(), Some("制热"));
/// assert_eq!(raw.attribute("fan_mode").and_then(|v| v.as_str()), Some("高速"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawState {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl RawState {
    /// Creates a raw state with the given token and no attributes.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            attributes: Map::new(),
        }
    }

    /// Creates a raw state that carries no state token.
    #[must_use]
    pub fn without_state() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the state token, if reported.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Returns an attribute, treating JSON `null` as absent.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|value| !value.is_null())
    }

    /// Returns all attributes.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

/// Read-only access to upstream entity state.
///
/// Implementations should report every transport or protocol failure as an
/// error; the sync engine treats any error as "source unavailable" for that
/// cycle and keeps the last known state. The engine applies its own timeout,
/// so implementations need not, and it never retries within one sync.
pub trait StateSource: Send + Sync + 'static {
    /// Fetches the current raw state of `entity`.
    fn fetch(
        &self,
        entity: &EntityRef,
    ) -> impl Future<Output = Result<RawState, SourceError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_home_assistant_payload() {
        let raw: RawState = serde_json::from_value(serde_json::json!({
            "entity_id": "sensor.bedroom_ac_status",
            "state": "制冷",
            "attributes": {
                "temperature": 22,
                "fan_mode": "低速",
                "friendly_name": "Bedroom AC"
            },
            "last_changed": "2024-11-20T08:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(raw.state(), Some("制冷"));
        assert_eq!(raw.attribute("temperature"), Some(&Value::from(22)));
    }

    #[test]
    fn missing_fields_default() {
        let raw: RawState = serde_json::from_str("{}").unwrap();
        assert_eq!(raw.state(), None);
        assert!(raw.attributes().is_empty());
    }

    #[test]
    fn null_attribute_is_absent() {
        let raw = RawState::new("cool").with_attribute("fan_mode", Value::Null);
        assert!(raw.attribute("fan_mode").is_none());
    }
}
