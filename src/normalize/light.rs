// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light normalization rules.

use crate::source::RawState;
use crate::state::LightState;

use super::{MissField, NormalizationMiss};

const LIGHT_ON: &str = "light_on";
const LIGHT_OFF: &str = "light_off";

pub(super) fn normalize(raw: &RawState, misses: &mut Vec<NormalizationMiss>) -> LightState {
    let (state, miss) = resolve_light(raw.state());
    misses.extend(miss);
    state
}

/// Resolves a light's on/off state.
///
/// Only `light_on` turns the light on. Every other value, recognized or not,
/// reads as off; values other than `light_off` additionally produce a miss.
#[must_use]
pub fn resolve_light(state: Option<&str>) -> (LightState, Option<NormalizationMiss>) {
    match state {
        Some(LIGHT_ON) => (LightState::new(true), None),
        None | Some("" | LIGHT_OFF) => (LightState::new(false), None),
        Some(other) => (
            LightState::new(false),
            Some(NormalizationMiss::new(MissField::LightState, other)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list() {
        assert_eq!(resolve_light(Some("light_on")), (LightState::new(true), None));
        assert_eq!(resolve_light(Some("light_off")), (LightState::new(false), None));
    }

    #[test]
    fn anything_else_is_off() {
        for raw in ["on", "ON", "Light_On", "unknown_state", "unavailable"] {
            let (state, miss) = resolve_light(Some(raw));
            assert!(!state.is_on(), "{raw} must read as off");
            assert_eq!(miss.unwrap().raw, raw);
        }
    }

    #[test]
    fn missing_state_is_off() {
        assert_eq!(resolve_light(None), (LightState::new(false), None));
    }
}
