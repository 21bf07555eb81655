//! Kind behavior registry.
//!
//! One immutable table built on first use, mapping every property kind to its
//! static behavior instance. Dispatch goes through here so properties never
//! hold behavior state of their own.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::behavior::PropertyBehavior;
use crate::kind::PropertyKind;
use crate::kinds::{alarm, binary, camera, color, lock, mode, playback, range, thermostat};

static REGISTRY: Lazy<HashMap<PropertyKind, &'static dyn PropertyBehavior>> = Lazy::new(|| {
    let behaviors: &[&'static dyn PropertyBehavior] = &[
        &alarm::ARM_STATE,
        &alarm::BURGLARY_ALARM,
        &alarm::CARBON_MONOXIDE_ALARM,
        &alarm::FIRE_ALARM,
        &alarm::WATER_ALARM,
        &binary::CONNECTIVITY,
        &binary::CONTACT_DETECTION,
        &binary::MOTION_DETECTION,
        &binary::MUTE_STATE,
        &binary::NETWORK_ACCESS,
        &binary::OPEN_STATE,
        &binary::POWER_STATE,
        &binary::SCENE,
        &binary::TOGGLE_STATE,
        &camera::CAMERA_STREAM,
        &color::COLOR,
        &color::COLOR_TEMPERATURE,
        &lock::LOCK_STATE,
        &mode::CHANNEL,
        &mode::EQUALIZER_MODE,
        &mode::INPUT,
        &mode::MODE,
        &playback::PLAYBACK_ACTION,
        &playback::PLAYBACK_STATE,
        &range::BRIGHTNESS,
        &range::EQUALIZER_BANDS,
        &range::PERCENTAGE,
        &range::POWER_LEVEL,
        &range::RANGE_VALUE,
        &range::VOLUME_LEVEL,
        &thermostat::HUMIDITY,
        &thermostat::LOWER_SETPOINT,
        &thermostat::TARGET_SETPOINT,
        &thermostat::TEMPERATURE,
        &thermostat::THERMOSTAT_HOLD,
        &thermostat::THERMOSTAT_MODE,
        &thermostat::UPPER_SETPOINT,
    ];
    behaviors.iter().map(|b| (b.kind(), *b)).collect()
});

/// Behavior for a property kind.
pub fn behavior(kind: PropertyKind) -> &'static dyn PropertyBehavior {
    REGISTRY[&kind]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_registered() {
        for kind in PropertyKind::ALL {
            assert_eq!(behavior(*kind).kind(), *kind, "{}", kind);
        }
        assert_eq!(REGISTRY.len(), PropertyKind::ALL.len());
    }
}
