// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device kind tag.

use std::fmt;

/// The kind of a tracked device.
///
/// The set is closed: each variant has its own normalization branch in
/// [`normalize`](crate::normalize::normalize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// An air conditioner with mode, fan speed and target temperature.
    AirConditioner,
    /// A light with on/off state only.
    Light,
}

impl DeviceKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AirConditioner => "air_conditioner",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
