// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notification for observers.
//!
//! The [`ChangePublisher`] fans committed changes out over a tokio broadcast
//! channel. Each [`Observer`] owns its own receiver, so a slow observer only
//! lags itself and never holds back the sync engine. An observer that falls
//! too far behind is resynchronized with a fresh [`ObserverEvent::InitialState`]
//! instead of replaying the updates it missed.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use appliance_sync::config::DeviceConfig;
//! use appliance_sync::event::{ChangePublisher, ObserverEvent};
//! use appliance_sync::store::DeviceStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(DeviceStore::new(&DeviceConfig::default_catalogue()));
//! let publisher = ChangePublisher::new(16);
//!
//! let mut observer = publisher.subscribe(&store);
//! match observer.recv().await {
//!     Some(ObserverEvent::InitialState { devices }) => assert_eq!(devices.len(), 2),
//!     other => panic!("unexpected {other:?}"),
//! }
//! # }
//! ```

mod device_update;
mod observer;
mod publisher;

pub use device_update::{DeviceUpdate, SyncOrigin};
pub use observer::{Observer, ObserverEvent, ObserverId};
pub use publisher::ChangePublisher;
