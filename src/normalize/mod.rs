// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping from upstream vocabulary to the canonical device model.
//!
//! [`normalize`] is total: every input, including missing or garbled state,
//! produces a valid [`DeviceState`]. Inputs that needed a fallback are
//! reported as [`NormalizationMiss`] values next to the result instead of as
//! errors, so a drifting upstream format degrades to best-effort data rather
//! than stalling the sync.
//!
//! # Examples
//!
//! ```
//! use appliance_sync::normalize::normalize;
//! use appliance_sync::source::RawState;
//! use appliance_sync::types::{AcMode, DeviceKind, FanSpeed};
//!
//! let raw = RawState::new("制热")
//!     .with_attribute("temperature", "24")
//!     .with_attribute("fan_mode", "高速");
//!
//! let normalized = normalize(DeviceKind::AirConditioner, &raw);
//! let ac = normalized.state.as_air_conditioner().unwrap();
//!
//! assert_eq!(ac.mode(), AcMode::Heat);
//! assert_eq!(ac.fan_speed(), FanSpeed::High);
//! assert_eq!(ac.target_temperature(), 24);
//! assert!(normalized.misses.is_empty());
//! ```

mod air_conditioner;
mod light;

use std::fmt;

use crate::source::RawState;
use crate::state::DeviceState;
use crate::types::DeviceKind;

pub use air_conditioner::{resolve_fan_speed, resolve_mode, resolve_temperature};
pub use light::resolve_light;

/// The field a [`NormalizationMiss`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissField {
    /// Air conditioner mode (the entity state).
    Mode,
    /// Air conditioner fan speed attribute.
    FanSpeed,
    /// Air conditioner temperature attribute.
    Temperature,
    /// Light on/off state.
    LightState,
}

impl MissField {
    /// Returns a short name for the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::FanSpeed => "fan speed",
            Self::Temperature => "temperature",
            Self::LightState => "light state",
        }
    }
}

/// An upstream value that matched no known token and was replaced by a
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NormalizationMiss {
    /// Which field fell back.
    pub field: MissField,
    /// The offending raw value, verbatim.
    pub raw: String,
}

impl NormalizationMiss {
    /// Creates a miss record.
    #[must_use]
    pub fn new(field: MissField, raw: impl Into<String>) -> Self {
        Self {
            field,
            raw: raw.into(),
        }
    }
}

impl fmt::Display for NormalizationMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {} value '{}'", self.field.as_str(), self.raw)
    }
}

/// Result of normalizing one raw reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The canonical candidate state.
    pub state: DeviceState,
    /// Fallbacks that were applied, in field order.
    pub misses: Vec<NormalizationMiss>,
}

impl Normalized {
    /// Returns `true` if every field was recognized.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.misses.is_empty()
    }
}

/// Normalizes a raw reading with the rules for `kind`.
#[must_use]
pub fn normalize(kind: DeviceKind, raw: &RawState) -> Normalized {
    let mut misses = Vec::new();
    let state = match kind {
        DeviceKind::AirConditioner => {
            DeviceState::AirConditioner(air_conditioner::normalize(raw, &mut misses))
        }
        DeviceKind::Light => DeviceState::Light(light::normalize(raw, &mut misses)),
    };
    Normalized { state, misses }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AcMode, FanSpeed};

    fn re_feed(state: &DeviceState) -> RawState {
        match state {
            DeviceState::AirConditioner(ac) => RawState::new(ac.mode().as_str())
                .with_attribute("temperature", ac.target_temperature())
                .with_attribute("fan_mode", ac.fan_speed().as_str()),
            DeviceState::Light(light) => {
                RawState::new(if light.is_on() { "light_on" } else { "light_off" })
            }
        }
    }

    #[test]
    fn heat_scenario() {
        let raw = RawState::new("制热")
            .with_attribute("temperature", "24")
            .with_attribute("fan_mode", "高速");

        let normalized = normalize(DeviceKind::AirConditioner, &raw);
        let ac = normalized.state.as_air_conditioner().unwrap();

        assert_eq!(ac.mode(), AcMode::Heat);
        assert!(ac.power());
        assert_eq!(ac.target_temperature(), 24);
        assert_eq!(ac.fan_speed(), FanSpeed::High);
        assert_eq!(ac.display_mode(), "制热");
        assert_eq!(ac.display_fan_speed(), "高速");
        assert!(normalized.is_clean());
    }

    #[test]
    fn unknown_mode_falls_back_to_off() {
        let normalized = normalize(DeviceKind::AirConditioner, &RawState::new("eco"));
        let ac = normalized.state.as_air_conditioner().unwrap();

        assert_eq!(ac.mode(), AcMode::Off);
        assert!(!ac.power());
        assert_eq!(
            normalized.misses,
            vec![NormalizationMiss::new(MissField::Mode, "eco")]
        );
    }

    #[test]
    fn light_unknown_state_is_off() {
        let normalized = normalize(DeviceKind::Light, &RawState::new("unknown_state"));
        assert!(!normalized.state.power());
        assert_eq!(normalized.misses[0].field, MissField::LightState);
    }

    #[test]
    fn normalization_is_idempotent() {
        let modes = [
            "制冷", "制热", "送风", "停止", "cool", "heat", "fan", "fan_only", "off", "auto",
            "dry", "COOL", "eco", "",
        ];
        let fans = ["低速", "中速", "高速", "low", "medium", "high"];

        for mode in modes {
            for fan in fans {
                let raw = RawState::new(mode)
                    .with_attribute("fan_mode", fan)
                    .with_attribute("temperature", 23);
                let once = normalize(DeviceKind::AirConditioner, &raw).state;
                let twice = normalize(DeviceKind::AirConditioner, &re_feed(&once)).state;
                assert_eq!(once, twice, "mode {mode:?}, fan {fan:?}");
            }
        }

        for state in ["light_on", "light_off", "on", "garbage"] {
            let once = normalize(DeviceKind::Light, &RawState::new(state)).state;
            let twice = normalize(DeviceKind::Light, &re_feed(&once)).state;
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn missing_state_is_total() {
        for kind in [DeviceKind::AirConditioner, DeviceKind::Light] {
            let normalized = normalize(kind, &RawState::without_state());
            assert_eq!(normalized.state.kind(), kind);
            assert!(!normalized.state.power());
        }
    }

    #[test]
    fn miss_display_cites_raw_value() {
        let miss = NormalizationMiss::new(MissField::Mode, "eco");
        assert_eq!(miss.to_string(), "unrecognized mode value 'eco'");
    }
}
