// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home Assistant REST state source.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{ParseError, SourceError};
use crate::types::EntityRef;

use super::{RawState, StateSource};

// ============================================================================
// HomeAssistantConfig
// ============================================================================

/// Connection parameters for a Home Assistant instance.
///
/// # Examples
///
/// ```
/// use appliance_sync::source::HomeAssistantConfig;
/// use std::time::Duration;
///
/// let config = HomeAssistantConfig::new("192.168.1.20:8123")
///     .with_token("long-lived-access-token")
///     .with_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.base_url(), "http://192.168.1.20:8123");
/// ```
#[derive(Clone)]
pub struct HomeAssistantConfig {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HomeAssistantConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for the instance at `base_url`.
    ///
    /// A URL without a scheme is assumed to be plain HTTP.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the long-lived access token sent as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the normalized base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        }
    }

    /// Creates a [`HomeAssistantSource`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidAddress` if no host is configured, or
    /// `SourceError::Http` if the HTTP client cannot be created.
    pub fn into_source(self) -> Result<HomeAssistantSource, SourceError> {
        let base_url = self.base_url();
        let host = base_url
            .split_once("://")
            .map_or("", |(_, rest)| rest);
        if host.is_empty() {
            return Err(SourceError::InvalidAddress(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(SourceError::Http)?;

        Ok(HomeAssistantSource {
            base_url,
            client,
            token: self.token,
            timeout: self.timeout,
        })
    }
}

impl std::fmt::Debug for HomeAssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// HomeAssistantSource
// ============================================================================

/// Reads entity state from the Home Assistant REST API.
///
/// Only `GET /api/states/{entity_id}` is ever issued.
///
/// # Examples
///
/// ```no_run
/// use appliance_sync::source::{HomeAssistantConfig, StateSource};
/// use appliance_sync::types::EntityRef;
///
/// # async fn example() -> appliance_sync::Result<()> {
/// let source = HomeAssistantConfig::new("http://homeassistant.local:8123")
///     .with_token("token")
///     .into_source()?;
///
/// let raw = source.fetch(&EntityRef::new("light.living_room_bulb")?).await?;
/// println!("{:?}", raw.state());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HomeAssistantSource {
    base_url: String,
    client: Client,
    token: Option<String>,
    timeout: Duration,
}

impl HomeAssistantSource {
    /// Returns the base URL of the instance.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the state URL for an entity.
    fn state_url(&self, entity: &EntityRef) -> String {
        format!(
            "{}/api/states/{}",
            self.base_url,
            urlencoding::encode(entity.as_str())
        )
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            SourceError::Http(err)
        }
    }
}

impl std::fmt::Debug for HomeAssistantSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantSource")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StateSource for HomeAssistantSource {
    async fn fetch(&self, entity: &EntityRef) -> Result<RawState, SourceError> {
        let url = self.state_url(entity);

        tracing::debug!(url = %url, "Fetching entity state");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::AuthenticationFailed);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::EntityUnavailable(entity.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        tracing::debug!(entity = %entity, body = %body, "Received entity state");

        let raw: RawState = serde_json::from_str(&body).map_err(ParseError::Json)?;
        if raw.state().is_none() {
            return Err(ParseError::MissingField("state".to_string()).into());
        }
        Ok(raw)
    }
}
