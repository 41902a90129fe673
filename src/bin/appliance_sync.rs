// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mirrors the living-room appliances from Home Assistant and serves them
//! over HTTP and WebSocket.
//!
//! Environment:
//!
//! - `HA_URL`: Home Assistant base URL (default `http://localhost:8123`)
//! - `HA_TOKEN`: long-lived access token
//! - `POLL_INTERVAL_MS`: delay between sweeps (default 1000)
//! - `BIND_ADDR`: listen address (default `0.0.0.0:5000`, falling back to
//!   `127.0.0.1:5000` if it cannot be bound)
//! - `RUST_LOG`: log filter (default `info`)

use std::sync::Arc;
use std::time::Duration;

use appliance_sync::ApplianceHub;
use appliance_sync::config::{DeviceConfig, SyncConfig};
use appliance_sync::server;
use appliance_sync::source::HomeAssistantConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_HA_URL: &str = "http://localhost:8123";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const FALLBACK_BIND_ADDR: &str = "127.0.0.1:5000";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn sync_config_from_env() -> SyncConfig {
    let config = SyncConfig::new();
    let Ok(raw) = std::env::var("POLL_INTERVAL_MS") else {
        return config;
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => config.with_poll_interval(Duration::from_millis(ms)),
        _ => {
            warn!(value = %raw, "Ignoring invalid POLL_INTERVAL_MS");
            config
        }
    }
}

fn home_assistant_from_env() -> HomeAssistantConfig {
    let url = std::env::var("HA_URL").unwrap_or_else(|_| DEFAULT_HA_URL.to_string());
    let config = HomeAssistantConfig::new(url);
    match std::env::var("HA_TOKEN") {
        Ok(token) if !token.trim().is_empty() => config.with_token(token.trim()),
        _ => {
            warn!("HA_TOKEN is not set, requests will be unauthenticated");
            config
        }
    }
}

async fn bind() -> std::io::Result<TcpListener> {
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    match TcpListener::bind(&addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if addr != FALLBACK_BIND_ADDR => {
            warn!(%addr, fallback = FALLBACK_BIND_ADDR, error = %e, "Bind failed, trying fallback");
            TcpListener::bind(FALLBACK_BIND_ADDR).await
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let ha = home_assistant_from_env();
    let sync = sync_config_from_env();
    let hub = ApplianceHub::home_assistant(ha, &DeviceConfig::default_catalogue(), sync)?;

    let summary = hub.trigger_sync(None).await?;
    for (id, outcome) in summary.iter() {
        if outcome.is_reachable() {
            info!(device_id = %id, %outcome, "Device reachable");
        } else {
            warn!(device_id = %id, %outcome, "Device not reachable, showing defaults");
        }
    }

    let hub = Arc::new(hub);
    let polling = hub.start_polling();
    let listener = bind().await?;

    tokio::select! {
        result = server::serve(listener, Arc::clone(&hub)) => {
            if let Err(e) = result {
                warn!(error = %e, "Server stopped");
            }
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Received Ctrl-C, shutting down");
        }
    }

    polling.shutdown().await;
    info!("Stopped");
    Ok(())
}
