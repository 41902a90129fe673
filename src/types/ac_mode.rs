// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air conditioner operating mode.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Operating mode of an air conditioner.
///
/// The upstream hub reports a richer mode space (`auto`, `dry`, ...); those
/// are folded into these four variants by the normalizer.
///
/// # Examples
///
/// ```
/// use appliance_sync::types::AcMode;
///
/// assert_eq!(AcMode::Heat.as_str(), "heat");
/// assert_eq!(AcMode::Heat.display(), "制热");
/// assert!(AcMode::Cool.is_active());
/// assert!(!AcMode::Off.is_active());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AcMode {
    /// Cooling.
    Cool,
    /// Heating.
    Heat,
    /// Fan only.
    Fan,
    /// Stopped.
    #[default]
    Off,
}

impl AcMode {
    /// All modes, in display order.
    pub const ALL: [Self; 4] = [Self::Cool, Self::Heat, Self::Fan, Self::Off];

    /// Returns the canonical token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cool => "cool",
            Self::Heat => "heat",
            Self::Fan => "fan",
            Self::Off => "off",
        }
    }

    /// Returns the localized label shown to users.
    #[must_use]
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Cool => "制冷",
            Self::Heat => "制热",
            Self::Fan => "送风",
            Self::Off => "停止",
        }
    }

    /// Returns `true` unless the unit is stopped.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for AcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValueError::UnknownToken {
                kind: "mode",
                value: s.to_string(),
            })
    }
}
