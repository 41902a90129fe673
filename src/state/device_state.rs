// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical per-kind device state.

use crate::types::{AcMode, DeviceKind, FanSpeed};

/// Canonical state of an air conditioner.
///
/// Display labels are never stored: [`display_mode`](Self::display_mode) and
/// [`display_fan_speed`](Self::display_fan_speed) derive them from the enums.
/// The only exception is an upstream fan speed that matched no vocabulary at
/// all, whose raw text is kept as the fan speed label.
///
/// # Examples
///
/// ```
/// use appliance_sync::state::AcState;
/// use appliance_sync::types::{AcMode, FanSpeed};
///
/// let state = AcState::new(AcMode::Heat, FanSpeed::High, 24);
/// assert!(state.power());
/// assert_eq!(state.display_mode(), "制热");
/// assert_eq!(state.display_fan_speed(), "高速");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcState {
    mode: AcMode,
    fan_speed: FanSpeed,
    /// Raw upstream fan speed text that matched no known token.
    unmapped_fan_speed: Option<String>,
    target_temperature: i32,
}

impl AcState {
    /// Target temperature assumed when the hub does not report one.
    pub const DEFAULT_TEMPERATURE: i32 = 26;

    /// Creates an air conditioner state.
    #[must_use]
    pub fn new(mode: AcMode, fan_speed: FanSpeed, target_temperature: i32) -> Self {
        Self {
            mode,
            fan_speed,
            unmapped_fan_speed: None,
            target_temperature,
        }
    }

    /// Keeps the raw fan speed text as the label for an unmapped reading.
    #[must_use]
    pub(crate) fn with_unmapped_fan_speed(mut self, raw: impl Into<String>) -> Self {
        self.unmapped_fan_speed = Some(raw.into());
        self
    }

    /// Returns the operating mode.
    #[must_use]
    pub fn mode(&self) -> AcMode {
        self.mode
    }

    /// Returns the fan speed.
    #[must_use]
    pub fn fan_speed(&self) -> FanSpeed {
        self.fan_speed
    }

    /// Returns the target temperature in degrees.
    #[must_use]
    pub fn target_temperature(&self) -> i32 {
        self.target_temperature
    }

    /// Returns `true` when the unit is running in any mode but `Off`.
    #[must_use]
    pub fn power(&self) -> bool {
        self.mode.is_active()
    }

    /// Returns the localized mode label.
    #[must_use]
    pub fn display_mode(&self) -> &'static str {
        self.mode.display()
    }

    /// Returns the fan speed label.
    #[must_use]
    pub fn display_fan_speed(&self) -> &str {
        self.unmapped_fan_speed
            .as_deref()
            .unwrap_or_else(|| self.fan_speed.display())
    }
}

impl Default for AcState {
    fn default() -> Self {
        Self::new(AcMode::Off, FanSpeed::Medium, Self::DEFAULT_TEMPERATURE)
    }
}

/// Canonical state of a light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightState {
    on: bool,
}

impl LightState {
    /// Creates a light state.
    #[must_use]
    pub const fn new(on: bool) -> Self {
        Self { on }
    }

    /// Returns `true` if the light is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }
}

/// Canonical state of any tracked device.
///
/// Equality is structural and covers every comparable field; the sync
/// timestamp lives on [`Device`](super::Device) and never takes part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// Air conditioner state.
    AirConditioner(AcState),
    /// Light state.
    Light(LightState),
}

impl DeviceState {
    /// Returns the state a record of `kind` starts with before its first sync.
    #[must_use]
    pub fn initial(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::AirConditioner => Self::AirConditioner(AcState::default()),
            DeviceKind::Light => Self::Light(LightState::default()),
        }
    }

    /// Returns the kind this state belongs to.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::AirConditioner(_) => DeviceKind::AirConditioner,
            Self::Light(_) => DeviceKind::Light,
        }
    }

    /// Returns whether the device is actively doing something.
    #[must_use]
    pub fn power(&self) -> bool {
        match self {
            Self::AirConditioner(ac) => ac.power(),
            Self::Light(light) => light.is_on(),
        }
    }

    /// Returns the air conditioner state, if this is one.
    #[must_use]
    pub fn as_air_conditioner(&self) -> Option<&AcState> {
        match self {
            Self::AirConditioner(ac) => Some(ac),
            Self::Light(_) => None,
        }
    }

    /// Returns the light state, if this is one.
    #[must_use]
    pub fn as_light(&self) -> Option<&LightState> {
        match self {
            Self::Light(light) => Some(light),
            Self::AirConditioner(_) => None,
        }
    }
}
