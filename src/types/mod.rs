// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types of the canonical device model.
//!
//! Every type here is a closed vocabulary. Upstream strings are mapped onto
//! these types by the [`normalize`](crate::normalize) module; the strict
//! `FromStr` implementations below accept only canonical tokens.
//!
//! # Types
//!
//! - [`DeviceId`] - Stable key of a tracked device
//! - [`EntityRef`] - Upstream entity a device mirrors
//! - [`DeviceKind`] - Air conditioner or light
//! - [`AcMode`] - Cool/Heat/Fan/Off
//! - [`FanSpeed`] - Low/Medium/High

mod ac_mode;
mod device_id;
mod device_kind;
mod fan_speed;

pub use ac_mode::AcMode;
pub use device_id::{DeviceId, EntityRef};
pub use device_kind::DeviceKind;
pub use fan_speed::FanSpeed;
