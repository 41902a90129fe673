// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the Home Assistant source using wiremock.

#![cfg(feature = "http")]

use std::time::Duration;

use appliance_sync::config::{DeviceConfig, SyncConfig};
use appliance_sync::error::{ParseError, SourceError};
use appliance_sync::source::{HomeAssistantConfig, HomeAssistantSource, StateSource};
use appliance_sync::sync::SyncOutcome;
use appliance_sync::types::{AcMode, DeviceId, EntityRef, FanSpeed};
use appliance_sync::ApplianceHub;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn source(server: &MockServer) -> HomeAssistantSource {
    HomeAssistantConfig::new(server.uri())
        .with_token(TOKEN)
        .into_source()
        .unwrap()
}

fn ac_entity() -> EntityRef {
    EntityRef::new("sensor.bedroom_ac_status").unwrap()
}

fn ac_body() -> serde_json::Value {
    serde_json::json!({
        "entity_id": "sensor.bedroom_ac_status",
        "state": "制热",
        "attributes": {
            "temperature": "24",
            "fan_mode": "高速",
            "friendly_name": "Bedroom AC"
        },
        "last_changed": "2024-11-20T08:00:00+00:00",
        "last_updated": "2024-11-20T08:00:00+00:00"
    })
}

// ============================================================================
// HomeAssistantSource
// ============================================================================

mod source {
    use super::*;

    #[tokio::test]
    async fn fetch_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/states/sensor.bedroom_ac_status"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ac_body()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = source(&server).fetch(&ac_entity()).await.unwrap();

        assert_eq!(raw.state(), Some("制热"));
        assert_eq!(raw.attribute("fan_mode"), Some(&serde_json::json!("高速")));
    }

    #[tokio::test]
    async fn unauthorized_is_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("401: Unauthorized"))
            .mount(&server)
            .await;

        let err = source(&server).fetch(&ac_entity()).await.unwrap_err();
        assert!(matches!(err, SourceError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn missing_entity_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server).fetch(&ac_entity()).await.unwrap_err();
        assert!(matches!(err, SourceError::EntityUnavailable(e) if e == "sensor.bedroom_ac_status"));
    }

    #[tokio::test]
    async fn server_error_is_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = source(&server).fetch(&ac_entity()).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { code: 500, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = source(&server).fetch(&ac_entity()).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn body_without_state_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "entity_id": "sensor.bedroom_ac_status",
                "attributes": {}
            })))
            .mount(&server)
            .await;

        let err = source(&server).fetch(&ac_entity()).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Parse(ParseError::MissingField(field)) if field == "state"
        ));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ac_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let source = HomeAssistantConfig::new(server.uri())
            .with_timeout(Duration::from_millis(100))
            .into_source()
            .unwrap();

        let err = source.fetch(&ac_entity()).await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout(100)));
    }

    #[tokio::test]
    async fn only_get_is_issued() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ac_body()))
            .mount(&server)
            .await;

        source(&server).fetch(&ac_entity()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
    }
}

// ============================================================================
// End to end
// ============================================================================

mod hub {
    use super::*;

    #[tokio::test]
    async fn hub_mirrors_home_assistant() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/states/sensor.bedroom_ac_status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ac_body()))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/states/light.living_room_bulb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "entity_id": "light.living_room_bulb",
                "state": "light_on",
                "attributes": {}
            })))
            .mount(&server)
            .await;

        let hub = ApplianceHub::home_assistant(
            HomeAssistantConfig::new(server.uri()).with_token(TOKEN),
            &DeviceConfig::default_catalogue(),
            SyncConfig::default(),
        )
        .unwrap();

        let summary = hub.trigger_sync(None).await.unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.changed(), 2);

        let ac = hub.device(&DeviceId::new("air_conditioner").unwrap()).unwrap();
        let state = ac.state().as_air_conditioner().unwrap();
        assert_eq!(state.mode(), AcMode::Heat);
        assert_eq!(state.fan_speed(), FanSpeed::High);
        assert_eq!(state.target_temperature(), 24);

        let json = serde_json::to_value(&ac).unwrap();
        assert_eq!(json["mode"], "heat");
        assert_eq!(json["mode_display"], "制热");
        assert_eq!(json["fan_speed_display"], "高速");
        assert_eq!(json["ha_entity"], "sensor.bedroom_ac_status");
        assert_eq!(json["is_on"], true);
    }

    #[tokio::test]
    async fn unreachable_hub_keeps_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let hub = ApplianceHub::home_assistant(
            HomeAssistantConfig::new(server.uri()),
            &DeviceConfig::default_catalogue(),
            SyncConfig::default(),
        )
        .unwrap();

        let summary = hub.trigger_sync(None).await.unwrap();
        for (_, outcome) in summary.iter() {
            assert_eq!(outcome, SyncOutcome::SourceUnavailable);
        }
        assert!(hub.devices().iter().all(|d| !d.power()));
    }
}
