// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `appliance_sync` - a read-only mirror of home-automation appliances.
//!
//! This library keeps a local, canonical copy of an air conditioner and a
//! light exposed by a Home Assistant hub and pushes every detected change to
//! connected observers.
//!
//! # Overview
//!
//! - **Sources**: raw entity state is read through a [`StateSource`]; the
//!   Home Assistant REST API is supported out of the box (`http` feature).
//! - **Normalization**: localized and canonical upstream tokens map onto
//!   closed enums with defined fallbacks, so unexpected values never fail a
//!   sync.
//! - **Change detection**: commits compare and write atomically, and a
//!   change is published exactly once even when a manual trigger races the
//!   periodic poll.
//! - **Observers**: each observer gets a full snapshot first, then one
//!   update per committed change.
//!
//! - **Server** (`server` feature): REST reads, a sync trigger and a
//!   WebSocket observer channel over `axum`.
//!
//! The mirror is strictly read-only. No command is ever sent to the hub.
//!
//! # Quick Start
//!
//! ```no_run
//! use appliance_sync::ApplianceHub;
//! use appliance_sync::config::{DeviceConfig, SyncConfig};
//! use appliance_sync::event::ObserverEvent;
//! use appliance_sync::source::HomeAssistantConfig;
//!
//! #[tokio::main]
//! async fn main() -> appliance_sync::Result<()> {
//!     let ha = HomeAssistantConfig::new("http://homeassistant.local:8123")
//!         .with_token("long-lived-access-token");
//!     let hub = ApplianceHub::home_assistant(
//!         ha,
//!         &DeviceConfig::default_catalogue(),
//!         SyncConfig::default(),
//!     )?;
//!
//!     let polling = hub.start_polling();
//!
//!     let mut observer = hub.connect_observer().await;
//!     while let Some(event) = observer.recv().await {
//!         match event {
//!             ObserverEvent::InitialState { devices } => println!("{} devices", devices.len()),
//!             ObserverEvent::Update(update) => println!("{} changed", update.device_id()),
//!         }
//!     }
//!
//!     polling.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Testing Without a Hub
//!
//! [`MemorySource`](source::MemorySource) holds scripted states and can
//! simulate failures and latency:
//!
//! ```
//! use appliance_sync::ApplianceHub;
//! use appliance_sync::config::{DeviceConfig, SyncConfig};
//! use appliance_sync::source::{MemorySource, RawState};
//! use appliance_sync::types::{AcMode, DeviceId, EntityRef};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> appliance_sync::Result<()> {
//! let source = MemorySource::new();
//! source.set(
//!     EntityRef::new("sensor.bedroom_ac_status")?,
//!     RawState::new("制冷").with_attribute("temperature", 22),
//! );
//!
//! let hub = ApplianceHub::new(source, &DeviceConfig::default_catalogue(), SyncConfig::default());
//! hub.trigger_sync(None).await?;
//!
//! let ac = hub.device(&DeviceId::new("air_conditioner")?)?;
//! assert_eq!(ac.state().as_air_conditioner().map(|s| s.mode()), Some(AcMode::Cool));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
mod hub;
pub mod normalize;
#[cfg(feature = "server")]
pub mod server;
pub mod source;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;

pub use config::{DeviceConfig, SyncConfig};
pub use error::{Error, ParseError, Result, SourceError, ValueError};
pub use event::{ChangePublisher, DeviceUpdate, Observer, ObserverEvent};
pub use hub::ApplianceHub;
pub use source::{MemorySource, RawState, StateSource};
#[cfg(feature = "http")]
pub use source::{HomeAssistantConfig, HomeAssistantSource};
pub use state::{AcState, Device, DeviceState, LightState};
pub use store::DeviceStore;
pub use sync::{Scheduler, SchedulerHandle, SyncEngine, SyncOrigin, SyncOutcome, SyncSummary};
pub use types::{AcMode, DeviceId, DeviceKind, EntityRef, FanSpeed};
