// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer channel over WebSocket.
//!
//! On connect the client gets `connection_status`, then `initial_state`
//! once the connect sweep has run, then one `device_update` per committed
//! change. A `request_sync` from any client syncs upstream; resulting
//! changes reach every connected client as `device_update`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use crate::event::ObserverEvent;
use crate::hub::ApplianceHub;
use crate::source::StateSource;
use crate::state::Device;
use crate::types::DeviceId;

/// Message sent to a socket client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message after the upgrade.
    ConnectionStatus {
        /// Always `connected`.
        status: String,
        /// Human-readable note.
        message: String,
    },
    /// Every device, keyed by id. Resent after the client lagged.
    InitialState {
        /// Tracked devices.
        devices: BTreeMap<DeviceId, Device>,
    },
    /// One committed change.
    DeviceUpdate {
        /// Changed device.
        device_id: DeviceId,
        /// Its new snapshot.
        device: Device,
        /// Always `false`.
        from_user: bool,
    },
    /// A client message could not be handled.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl ServerMessage {
    fn connected() -> Self {
        Self::ConnectionStatus {
            status: "connected".to_string(),
            message: "connected to server (read-only)".to_string(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl From<ObserverEvent> for ServerMessage {
    fn from(event: ObserverEvent) -> Self {
        match event {
            ObserverEvent::InitialState { devices } => Self::InitialState {
                devices: devices
                    .into_iter()
                    .map(|device| (device.id().clone(), device))
                    .collect(),
            },
            ObserverEvent::Update(update) => Self::DeviceUpdate {
                device_id: update.device_id().clone(),
                from_user: update.from_user(),
                device: update.device().clone(),
            },
        }
    }
}

/// Message received from a socket client.
///
/// ```json
/// {"event": "request_sync", "data": {"device_id": "light_living"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Sync one device, or every device when `device_id` is absent.
    RequestSync {
        /// Device to sync.
        #[serde(default)]
        device_id: Option<String>,
    },
}

/// `GET /ws`
pub(super) async fn upgrade<S: StateSource>(
    ws: WebSocketUpgrade,
    State(hub): State<Arc<ApplianceHub<S>>>,
) -> Response {
    ws.on_upgrade(move |socket| session(socket, hub))
}

async fn session<S: StateSource>(socket: WebSocket, hub: Arc<ApplianceHub<S>>) {
    let (mut tx, mut rx) = socket.split();

    if send(&mut tx, &ServerMessage::connected()).await.is_err() {
        return;
    }

    let mut observer = hub.connect_observer().await;
    let observer_id = observer.id();
    tracing::info!(%observer_id, "Socket client connected");

    loop {
        tokio::select! {
            event = observer.recv() => {
                let Some(event) = event else { break };
                if send(&mut tx, &ServerMessage::from(event)).await.is_err() {
                    break;
                }
            }
            incoming = rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_text(&hub, &text).await {
                        if send(&mut tx, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(%observer_id, error = %e, "Socket error");
                    break;
                }
            }
        }
    }

    tracing::info!(%observer_id, "Socket client disconnected");
}

async fn send(
    tx: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(text) => tx.send(Message::Text(text)).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize socket message");
            Ok(())
        }
    }
}

/// Handles one text frame; returns a reply only on error.
async fn handle_text<S: StateSource>(hub: &ApplianceHub<S>, text: &str) -> Option<ServerMessage> {
    let request = match serde_json::from_str::<ClientMessage>(text) {
        Ok(request) => request,
        Err(e) => return Some(ServerMessage::error(format!("invalid message: {e}"))),
    };

    match request {
        ClientMessage::RequestSync { device_id } => {
            let id = match device_id
                .filter(|id| !id.trim().is_empty())
                .map(DeviceId::new)
                .transpose()
            {
                Ok(id) => id,
                Err(e) => return Some(ServerMessage::error(e.to_string())),
            };
            match hub.trigger_sync(id.as_ref()).await {
                Ok(summary) => {
                    tracing::debug!(
                        changed = summary.changed(),
                        unavailable = summary.unavailable(),
                        "Socket sync request handled"
                    );
                    None
                }
                Err(e) => Some(ServerMessage::error(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceConfig, SyncConfig};
    use crate::event::{DeviceUpdate, SyncOrigin};
    use crate::source::{MemorySource, RawState};
    use crate::types::EntityRef;

    fn hub(source: &MemorySource) -> ApplianceHub<MemorySource> {
        ApplianceHub::new(
            source.clone(),
            &DeviceConfig::default_catalogue(),
            SyncConfig::default(),
        )
    }

    #[test]
    fn parses_request_sync() {
        let request: ClientMessage = serde_json::from_str(
            r#"{"event":"request_sync","data":{"device_id":"light_living"}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            ClientMessage::RequestSync {
                device_id: Some("light_living".into())
            }
        );

        let request: ClientMessage =
            serde_json::from_str(r#"{"event":"request_sync","data":{}}"#).unwrap();
        assert_eq!(request, ClientMessage::RequestSync { device_id: None });
    }

    #[test]
    fn update_wire_shape() {
        let source = MemorySource::new();
        let device = hub(&source).devices().remove(1);
        let message = ServerMessage::from(ObserverEvent::Update(DeviceUpdate::new(
            device,
            SyncOrigin::Periodic,
        )));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["event"], "device_update");
        assert_eq!(json["data"]["device_id"], "light_living");
        assert_eq!(json["data"]["device"]["type"], "light");
        assert_eq!(json["data"]["from_user"], false);
    }

    #[test]
    fn initial_state_is_keyed_by_id() {
        let source = MemorySource::new();
        let devices = hub(&source).devices();
        let json =
            serde_json::to_value(ServerMessage::from(ObserverEvent::InitialState { devices }))
                .unwrap();
        assert_eq!(json["event"], "initial_state");
        assert_eq!(json["data"]["devices"]["air_conditioner"]["mode"], "off");
    }

    #[tokio::test]
    async fn request_sync_updates_store() {
        let source = MemorySource::new();
        source.set(
            EntityRef::new("light.living_room_bulb").unwrap(),
            RawState::new("light_on"),
        );
        let hub = hub(&source);

        let reply = handle_text(
            &hub,
            r#"{"event":"request_sync","data":{"device_id":"light_living"}}"#,
        )
        .await;

        assert!(reply.is_none());
        assert!(hub.device(&DeviceId::new("light_living").unwrap()).unwrap().power());
    }

    #[tokio::test]
    async fn bad_requests_get_error_replies() {
        let hub = hub(&MemorySource::new());

        let reply = handle_text(&hub, "not json").await;
        assert!(matches!(reply, Some(ServerMessage::Error { .. })));

        let reply = handle_text(
            &hub,
            r#"{"event":"request_sync","data":{"device_id":"garage"}}"#,
        )
        .await;
        let Some(ServerMessage::Error { message }) = reply else {
            panic!("expected error");
        };
        assert!(message.contains("garage"));
    }
}
