// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP and WebSocket surface over an [`ApplianceHub`].
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /api/devices` | Every device, keyed by id, with a server timestamp |
//! | `GET /api/device/:device_id` | One device; `404` if it is not tracked |
//! | `POST /api/sync` | Sync one device (`{"device_id": "..."}`) or all of them |
//! | `GET /ws` | Observer channel, see [`ServerMessage`] and [`ClientMessage`] |
//!
//! Every JSON response carries a `success` flag. Nothing here writes to the
//! hub; a sync only reads upstream state.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use appliance_sync::ApplianceHub;
//! use appliance_sync::config::{DeviceConfig, SyncConfig};
//! use appliance_sync::source::MemorySource;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let hub = Arc::new(ApplianceHub::new(
//!     MemorySource::new(),
//!     &DeviceConfig::default_catalogue(),
//!     SyncConfig::default(),
//! ));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! appliance_sync::server::serve(listener, hub).await
//! # }
//! ```

mod rest;
mod socket;

pub use socket::{ClientMessage, ServerMessage};

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::hub::ApplianceHub;
use crate::source::StateSource;

/// Builds the router for `hub`.
#[must_use]
pub fn router<S: StateSource>(hub: Arc<ApplianceHub<S>>) -> Router {
    Router::new()
        .route("/api/devices", get(rest::list_devices::<S>))
        .route("/api/device/:device_id", get(rest::get_device::<S>))
        .route("/api/sync", post(rest::trigger_sync::<S>))
        .route("/ws", get(socket::upgrade::<S>))
        .with_state(hub)
}

/// Serves the router for `hub` on `listener` until the future is dropped.
///
/// # Errors
///
/// Returns an I/O error if the listener fails.
pub async fn serve<S: StateSource>(
    listener: TcpListener,
    hub: Arc<ApplianceHub<S>>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Serving appliance API");
    axum::serve(listener, router(hub)).await
}
