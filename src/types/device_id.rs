// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types for tracked devices and upstream entities.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Stable identifier of a tracked device.
///
/// Device ids are configured statically (for example `air_conditioner`) and
/// act as the key of the [`DeviceStore`](crate::store::DeviceStore).
///
/// # Examples
///
/// ```
/// use appliance_sync::types::DeviceId;
///
/// let id = DeviceId::new("light_living").unwrap();
/// assert_eq!(id.as_str(), "light_living");
///
/// assert!(DeviceId::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyIdentifier` if `id` is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValueError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValueError::EmptyIdentifier);
        }
        Ok(Self(id))
    }

    /// Creates an identifier from a literal known to be non-empty.
    pub(crate) fn from_static(id: &'static str) -> Self {
        debug_assert!(!id.trim().is_empty());
        Self(id.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

/// Reference to the upstream hub entity a device mirrors.
///
/// The value is opaque to the sync engine; the Home Assistant source uses it
/// as the entity id in `/api/states/{entity_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityRef(String);

impl EntityRef {
    /// Creates an entity reference.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyIdentifier` if `entity` is empty or whitespace.
    pub fn new(entity: impl Into<String>) -> Result<Self, ValueError> {
        let entity = entity.into();
        if entity.trim().is_empty() {
            return Err(ValueError::EmptyIdentifier);
        }
        Ok(Self(entity))
    }

    /// Creates a reference from a literal known to be non-empty.
    pub(crate) fn from_static(entity: &'static str) -> Self {
        debug_assert!(!entity.trim().is_empty());
        Self(entity.to_string())
    }

    /// Returns the entity id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityRef {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityRef> for String {
    fn from(entity: EntityRef) -> Self {
        entity.0
    }
}
