// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `appliance_sync` library.
//!
//! Most failures in this crate are recovered locally: an unreachable hub only
//! skips one sync cycle and an unknown upstream token falls back to a defined
//! value. The types here cover what still has to reach a caller: unknown
//! device ids, transport failures reported by a [`StateSource`], malformed
//! payloads, and strict token parsing.
//!
//! [`StateSource`]: crate::source::StateSource

use thiserror::Error;

use crate::types::DeviceId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The upstream state source could not be reached or answered badly.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Error occurred while parsing an upstream payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The device id is not part of the tracked catalogue.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),
}

/// Errors related to value validation and strict token parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An identifier was empty or whitespace only.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// A token is not one of the canonical values of its type.
    #[error("unknown {kind} token: {value}")]
    UnknownToken {
        /// The type the token was parsed as.
        kind: &'static str,
        /// The token that was provided.
        value: String,
    },
}

/// Errors raised while fetching raw state from the upstream hub.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub answered with a non-success status.
    #[error("unexpected status {code}: {reason}")]
    Status {
        /// The HTTP status code.
        code: u16,
        /// Canonical reason phrase, if known.
        reason: String,
    },

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The hub rejected the access token.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The entity is unknown to the source.
    #[error("entity not available: {0}")]
    EntityUnavailable(String),

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to decoding upstream payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
