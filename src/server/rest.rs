// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read and trigger endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::hub::ApplianceHub;
use crate::source::StateSource;
use crate::state::Device;
use crate::sync::SyncSummary;
use crate::types::DeviceId;

type HubState<S> = State<Arc<ApplianceHub<S>>>;

/// Body of `POST /api/sync`. A missing body or id means "every device".
#[derive(Debug, Default, Deserialize)]
pub(super) struct SyncRequest {
    #[serde(default)]
    device_id: Option<String>,
}

#[derive(Serialize)]
struct DevicesResponse {
    success: bool,
    devices: BTreeMap<DeviceId, Device>,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct DeviceResponse {
    success: bool,
    device: Device,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SyncSummary>,
}

fn message(status: StatusCode, message: impl Into<String>, summary: Option<SyncSummary>) -> Response {
    let body = MessageResponse {
        success: status.is_success(),
        message: message.into(),
        summary,
    };
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    message(StatusCode::NOT_FOUND, "device not found", None)
}

/// `GET /api/devices`
pub(super) async fn list_devices<S: StateSource>(State(hub): HubState<S>) -> Response {
    let devices = hub
        .devices()
        .into_iter()
        .map(|device| (device.id().clone(), device))
        .collect();
    let body = DevicesResponse {
        success: true,
        devices,
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /api/device/:device_id`
pub(super) async fn get_device<S: StateSource>(
    State(hub): HubState<S>,
    Path(device_id): Path<String>,
) -> Response {
    let Ok(id) = DeviceId::new(device_id) else {
        return not_found();
    };
    match hub.device(&id) {
        Ok(device) => (
            StatusCode::OK,
            Json(DeviceResponse {
                success: true,
                device,
            }),
        )
            .into_response(),
        Err(_) => not_found(),
    }
}

/// `POST /api/sync`
///
/// A single-device sync answers `500` when the hub could not be read; a
/// full sweep always succeeds and reports how many devices were reached.
pub(super) async fn trigger_sync<S: StateSource>(
    State(hub): HubState<S>,
    body: Option<Json<SyncRequest>>,
) -> Response {
    let requested = body
        .and_then(|Json(request)| request.device_id)
        .filter(|id| !id.trim().is_empty());

    let Some(raw) = requested else {
        return match hub.trigger_sync(None).await {
            Ok(summary) => {
                let reached = summary.changed() + summary.unchanged();
                tracing::debug!(reached, total = summary.total(), "Manual sweep finished");
                message(
                    StatusCode::OK,
                    format!("synced {reached} devices (read-only)"),
                    Some(summary),
                )
            }
            Err(e) => message(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
        };
    };

    let Ok(id) = DeviceId::new(raw) else {
        return not_found();
    };
    match hub.trigger_sync(Some(&id)).await {
        Ok(summary) if summary.is_success() => {
            message(StatusCode::OK, "sync succeeded (read-only)", Some(summary))
        }
        Ok(summary) => message(StatusCode::INTERNAL_SERVER_ERROR, "sync failed", Some(summary)),
        Err(Error::DeviceNotFound(_)) => not_found(),
        Err(e) => message(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::config::{DeviceConfig, SyncConfig};
    use crate::source::{MemorySource, RawState};
    use crate::types::EntityRef;

    fn hub(source: &MemorySource) -> Arc<ApplianceHub<MemorySource>> {
        Arc::new(ApplianceHub::new(
            source.clone(),
            &DeviceConfig::default_catalogue(),
            SyncConfig::default(),
        ))
    }

    fn light_on(source: &MemorySource) {
        source.set(
            EntityRef::new("light.living_room_bulb").unwrap(),
            RawState::new("light_on"),
        );
    }

    async fn json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn sync_body(device_id: &str) -> Option<Json<SyncRequest>> {
        Some(Json(SyncRequest {
            device_id: Some(device_id.to_string()),
        }))
    }

    #[tokio::test]
    async fn lists_devices_by_id() {
        let (status, body) = json(list_devices(State(hub(&MemorySource::new()))).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["devices"]["air_conditioner"]["name"], "客厅空调");
        assert_eq!(body["devices"]["light_living"]["is_on"], false);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_device_is_404() {
        let hub = hub(&MemorySource::new());

        let (status, body) = json(get_device(State(hub.clone()), Path("garage".into())).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = json(get_device(State(hub), Path("  ".into())).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn known_device_is_returned() {
        let (status, body) =
            json(get_device(State(hub(&MemorySource::new())), Path("light_living".into())).await)
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["device"]["id"], "light_living");
    }

    #[tokio::test]
    async fn sync_without_body_sweeps_everything() {
        let source = MemorySource::new();
        light_on(&source);
        let hub = hub(&source);

        let (status, body) = json(trigger_sync(State(hub.clone()), None).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "synced 1 devices (read-only)");
        assert_eq!(body["summary"]["changed"], 1);
        assert_eq!(body["summary"]["unavailable"], 1);
        assert!(hub.device(&DeviceId::new("light_living").unwrap()).unwrap().power());
    }

    #[tokio::test]
    async fn sync_of_one_device() {
        let source = MemorySource::new();
        light_on(&source);
        let hub = hub(&source);

        let (status, body) = json(trigger_sync(State(hub), sync_body("light_living")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["outcomes"]["light_living"], "changed");
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_device_sync_is_500() {
        let (status, body) =
            json(trigger_sync(State(hub(&MemorySource::new())), sync_body("air_conditioner")).await)
                .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["summary"]["outcomes"]["air_conditioner"], "source_unavailable");
    }

    #[tokio::test]
    async fn unknown_device_sync_is_404_without_fetch() {
        let source = MemorySource::new();
        let (status, _) = json(trigger_sync(State(hub(&source)), sync_body("garage")).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(source.fetch_count(), 0);
    }
}
