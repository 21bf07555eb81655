//! Lock state, with an optional decoupled sensor reading.

use serde_json::Value;

use voicelink_core::ParameterType;

use crate::behavior::PropertyBehavior;
use crate::kind::PropertyKind;
use crate::param;
use crate::property::{Property, ValueMap};

const PARAMETERS: &[(&str, ParameterType)] = &[
    (param::INVERTED, ParameterType::Boolean),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

const LOCK_VALUES: &[&str] = &["LOCKED", "UNLOCKED", "JAMMED"];

/// Lock state. A `#sensor`-tagged instance provides the authoritative
/// reading for a lock whose actuator does not report reliably; the tagged
/// instance never issues commands.
pub struct LockState;

pub static LOCK_STATE: LockState = LockState;

impl PropertyBehavior for LockState {
    fn kind(&self) -> PropertyKind {
        PropertyKind::LockState
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Switch", "Contact", "String", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        LOCK_VALUES
    }

    fn supported_tags(&self) -> &'static [&'static str] {
        &["sensor"]
    }

    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        property.value_map().keys().map(str::to_string).collect()
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        let inverted = property.is_inverted(false);
        let mut map = match property.item().item_type.base_name() {
            "Switch" => ValueMap::from_iter([("LOCKED", "ON"), ("UNLOCKED", "OFF")]),
            "Contact" => ValueMap::from_iter([("LOCKED", "CLOSED"), ("UNLOCKED", "OPEN")]),
            "Number" => {
                ValueMap::from_iter([("LOCKED", "1"), ("UNLOCKED", "0"), ("JAMMED", "2")])
            }
            _ => ValueMap::from_iter([
                ("LOCKED", "locked"),
                ("UNLOCKED", "unlocked"),
                ("JAMMED", "jammed"),
            ]),
        };
        if inverted {
            let locked = map.command("LOCKED").map(str::to_string);
            let unlocked = map.command("UNLOCKED").map(str::to_string);
            if let (Some(locked), Some(unlocked)) = (locked, unlocked) {
                let mut swapped = ValueMap::new();
                swapped.insert("LOCKED", unlocked);
                swapped.insert("UNLOCKED", locked);
                if let Some(jammed) = map.command("JAMMED") {
                    swapped.insert("JAMMED", jammed.to_string());
                }
                map = swapped;
            }
        }
        map
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        // Sensor-tagged instances only read.
        if property.tag().is_some() {
            return None;
        }
        let value = value.as_str()?;
        if value == "JAMMED" {
            return None;
        }
        property.value_map().command(value).map(str::to_string)
    }
}
