//! Property kind enumeration.
//!
//! Each kind identifies one external protocol property. The kind name doubles
//! as the property name in serialized capability records, so the string forms
//! here are wire-stable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// All property kinds the engine can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PropertyKind {
    ArmState,
    Brightness,
    BurglaryAlarm,
    CameraStream,
    CarbonMonoxideAlarm,
    Channel,
    Color,
    ColorTemperature,
    Connectivity,
    ContactDetection,
    EqualizerBands,
    EqualizerMode,
    FireAlarm,
    Humidity,
    Input,
    LockState,
    LowerSetpoint,
    Mode,
    MotionDetection,
    MuteState,
    NetworkAccess,
    OpenState,
    Percentage,
    PlaybackAction,
    PlaybackState,
    PowerLevel,
    PowerState,
    RangeValue,
    Scene,
    TargetSetpoint,
    Temperature,
    ThermostatHold,
    ThermostatMode,
    ToggleState,
    UpperSetpoint,
    VolumeLevel,
    WaterAlarm,
}

impl PropertyKind {
    /// Every kind, in registry order.
    pub const ALL: &'static [PropertyKind] = &[
        Self::ArmState,
        Self::Brightness,
        Self::BurglaryAlarm,
        Self::CameraStream,
        Self::CarbonMonoxideAlarm,
        Self::Channel,
        Self::Color,
        Self::ColorTemperature,
        Self::Connectivity,
        Self::ContactDetection,
        Self::EqualizerBands,
        Self::EqualizerMode,
        Self::FireAlarm,
        Self::Humidity,
        Self::Input,
        Self::LockState,
        Self::LowerSetpoint,
        Self::Mode,
        Self::MotionDetection,
        Self::MuteState,
        Self::NetworkAccess,
        Self::OpenState,
        Self::Percentage,
        Self::PlaybackAction,
        Self::PlaybackState,
        Self::PowerLevel,
        Self::PowerState,
        Self::RangeValue,
        Self::Scene,
        Self::TargetSetpoint,
        Self::Temperature,
        Self::ThermostatHold,
        Self::ThermostatMode,
        Self::ToggleState,
        Self::UpperSetpoint,
        Self::VolumeLevel,
        Self::WaterAlarm,
    ];

    /// Wire-stable property name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArmState => "armState",
            Self::Brightness => "brightness",
            Self::BurglaryAlarm => "burglaryAlarm",
            Self::CameraStream => "cameraStream",
            Self::CarbonMonoxideAlarm => "carbonMonoxideAlarm",
            Self::Channel => "channel",
            Self::Color => "color",
            Self::ColorTemperature => "colorTemperatureInKelvin",
            Self::Connectivity => "connectivity",
            Self::ContactDetection => "contactDetectionState",
            Self::EqualizerBands => "equalizerBands",
            Self::EqualizerMode => "equalizerMode",
            Self::FireAlarm => "fireAlarm",
            Self::Humidity => "relativeHumidity",
            Self::Input => "input",
            Self::LockState => "lockState",
            Self::LowerSetpoint => "lowerSetpoint",
            Self::Mode => "mode",
            Self::MotionDetection => "motionDetectionState",
            Self::MuteState => "muteState",
            Self::NetworkAccess => "networkAccess",
            Self::OpenState => "openState",
            Self::Percentage => "percentage",
            Self::PlaybackAction => "playbackAction",
            Self::PlaybackState => "playbackState",
            Self::PowerLevel => "powerLevel",
            Self::PowerState => "powerState",
            Self::RangeValue => "rangeValue",
            Self::Scene => "sceneActivation",
            Self::TargetSetpoint => "targetSetpoint",
            Self::Temperature => "temperature",
            Self::ThermostatHold => "thermostatHold",
            Self::ThermostatMode => "thermostatMode",
            Self::ToggleState => "toggleState",
            Self::UpperSetpoint => "upperSetpoint",
            Self::VolumeLevel => "volumeLevel",
            Self::WaterAlarm => "waterAlarm",
        }
    }
}

impl FromStr for PropertyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or(())
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PropertyKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| format!("Unknown property kind: {}", value))
    }
}

impl From<PropertyKind> for String {
    fn from(kind: PropertyKind) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in PropertyKind::ALL {
            assert_eq!(kind.as_str().parse::<PropertyKind>().as_ref(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!("noSuchProperty".parse::<PropertyKind>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let serialized = serde_json::to_string(&PropertyKind::ColorTemperature).unwrap();
        assert_eq!(serialized, "\"colorTemperatureInKelvin\"");
        let parsed: PropertyKind = serde_json::from_str("\"powerState\"").unwrap();
        assert_eq!(parsed, PropertyKind::PowerState);
    }
}
