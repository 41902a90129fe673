// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air conditioner normalization rules.

use serde_json::Value;

use crate::source::RawState;
use crate::state::AcState;
use crate::types::{AcMode, FanSpeed};

use super::{MissField, NormalizationMiss};

/// Upstream mode tokens, localized and canonical.
///
/// `auto` and `dry` have no counterpart and are folded into `Fan`.
const MODE_TOKENS: &[(&str, AcMode)] = &[
    ("制冷", AcMode::Cool),
    ("制热", AcMode::Heat),
    ("送风", AcMode::Fan),
    ("停止", AcMode::Off),
    ("cool", AcMode::Cool),
    ("heat", AcMode::Heat),
    ("fan", AcMode::Fan),
    ("fan_only", AcMode::Fan),
    ("off", AcMode::Off),
    ("auto", AcMode::Fan),
    ("dry", AcMode::Fan),
];

/// Attribute keys carrying the fan speed, in lookup order.
const FAN_SPEED_KEYS: [&str; 2] = ["fan_mode", "fan_speed"];

const TEMPERATURE_KEY: &str = "temperature";

pub(super) fn normalize(raw: &RawState, misses: &mut Vec<NormalizationMiss>) -> AcState {
    let (mode, mode_miss) = resolve_mode(raw.state());

    let fan_raw = FAN_SPEED_KEYS.iter().find_map(|key| raw.attribute(key));
    let (fan_speed, fan_miss) = resolve_fan_speed(fan_raw);

    let (temperature, temperature_miss) = resolve_temperature(raw.attribute(TEMPERATURE_KEY));

    let mut state = AcState::new(mode, fan_speed, temperature);
    if let Some(miss) = &fan_miss {
        state = state.with_unmapped_fan_speed(miss.raw.clone());
    }

    misses.extend([mode_miss, fan_miss, temperature_miss].into_iter().flatten());
    state
}

fn lookup_mode(token: &str) -> Option<AcMode> {
    MODE_TOKENS
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(_, mode)| *mode)
}

/// Resolves the operating mode from the entity state token.
///
/// The token is matched case-insensitively first, then verbatim, with no
/// whitespace trimming. A missing or empty token means the unit reports
/// nothing and resolves to `Off` without a miss; an unknown token resolves
/// to `Off` with a miss carrying the token exactly as received.
#[must_use]
pub fn resolve_mode(state: Option<&str>) -> (AcMode, Option<NormalizationMiss>) {
    let Some(raw) = state.filter(|s| !s.is_empty()) else {
        return (AcMode::Off, None);
    };

    match lookup_mode(&raw.to_lowercase()).or_else(|| lookup_mode(raw)) {
        Some(mode) => (mode, None),
        None => (AcMode::Off, Some(NormalizationMiss::new(MissField::Mode, raw))),
    }
}

/// Resolves the fan speed from its attribute value.
///
/// Localized labels are tried first, then canonical tokens. Anything else
/// falls back to `Medium`; the returned miss carries the raw text, which is
/// kept as the display label. A missing attribute means `Medium`.
#[must_use]
pub fn resolve_fan_speed(value: Option<&Value>) -> (FanSpeed, Option<NormalizationMiss>) {
    let raw = match value {
        None => return (FanSpeed::Medium, None),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    if let Some(speed) = FanSpeed::from_display(&raw) {
        return (speed, None);
    }
    if let Ok(speed) = raw.to_lowercase().parse::<FanSpeed>() {
        return (speed, None);
    }

    (
        FanSpeed::Medium,
        Some(NormalizationMiss::new(MissField::FanSpeed, raw)),
    )
}

/// Resolves the target temperature from its attribute value.
///
/// Integers, floats (truncated toward zero) and numeric strings are
/// accepted. A missing attribute yields the default silently; a present but
/// unusable one yields the default with a miss.
#[must_use]
pub fn resolve_temperature(value: Option<&Value>) -> (i32, Option<NormalizationMiss>) {
    let Some(value) = value else {
        return (AcState::DEFAULT_TEMPERATURE, None);
    };

    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .or_else(|| n.as_f64().and_then(truncate_degrees)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_degrees))
        }
        _ => None,
    };

    match parsed {
        Some(degrees) => (degrees, None),
        None => {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (
                AcState::DEFAULT_TEMPERATURE,
                Some(NormalizationMiss::new(MissField::Temperature, raw)),
            )
        }
    }
}

fn truncate_degrees(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return None;
    }
    // Range checked above.
    #[allow(clippy::cast_possible_truncation)]
    let degrees = truncated as i32;
    Some(degrees)
}
