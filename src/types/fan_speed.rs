// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air conditioner fan speed.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Fan speed of an air conditioner.
///
/// # Examples
///
/// ```
/// use appliance_sync::types::FanSpeed;
///
/// assert_eq!(FanSpeed::High.as_str(), "high");
/// assert_eq!(FanSpeed::High.display(), "高速");
/// assert_eq!(FanSpeed::from_display("低速"), Some(FanSpeed::Low));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FanSpeed {
    /// Low speed.
    Low,
    /// Medium speed.
    #[default]
    Medium,
    /// High speed.
    High,
}

impl FanSpeed {
    /// All speeds, slowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the canonical token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns the localized label shown to users.
    #[must_use]
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Low => "低速",
            Self::Medium => "中速",
            Self::High => "高速",
        }
    }

    /// Looks up a speed by its localized label.
    #[must_use]
    pub fn from_display(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.display() == label)
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanSpeed {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.as_str() == s)
            .ok_or_else(|| ValueError::UnknownToken {
                kind: "fan speed",
                value: s.to_string(),
            })
    }
}
