// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical device model.
//!
//! A [`Device`] pairs a device's identity with its canonical
//! [`DeviceState`]. The state is a closed enum per [`DeviceKind`], so a value
//! outside the known vocabulary can never be stored.
//!
//! [`DeviceKind`]: crate::types::DeviceKind
//!
//! # Examples
//!
//! ```
//! use appliance_sync::state::{AcState, DeviceState};
//! use appliance_sync::types::{AcMode, FanSpeed};
//!
//! let state = DeviceState::AirConditioner(AcState::new(AcMode::Cool, FanSpeed::Low, 22));
//! assert!(state.power());
//! ```

mod device;
mod device_state;

pub use device::Device;
pub use device_state::{AcState, DeviceState, LightState};
