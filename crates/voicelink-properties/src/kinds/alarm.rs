//! Security kinds: arm state and alarm sensors.

use serde_json::{json, Value};

use voicelink_core::convert::ParameterValue;
use voicelink_core::item::Item;
use voicelink_core::ParameterType;

use crate::behavior::{PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::kinds::binary::BinaryState;
use crate::param;
use crate::property::{Property, ValueMap};

/// Alarm sensors are plain read-only binary states.
pub static BURGLARY_ALARM: BinaryState = BinaryState::alarm(PropertyKind::BurglaryAlarm);
pub static CARBON_MONOXIDE_ALARM: BinaryState = BinaryState::alarm(PropertyKind::CarbonMonoxideAlarm);
pub static FIRE_ALARM: BinaryState = BinaryState::alarm(PropertyKind::FireAlarm);
pub static WATER_ALARM: BinaryState = BinaryState::alarm(PropertyKind::WaterAlarm);

const ARM_STATE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::EXIT_DELAY, ParameterType::Integer),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

/// Security panel arm state: a multi-valued enumerated kind whose value map
/// may cover only a subset of the full vocabulary.
pub struct ArmState;

pub static ARM_STATE: ArmState = ArmState;

const ARM_VALUES: &[&str] = &["ARMED_AWAY", "ARMED_STAY", "ARMED_NIGHT", "DISARMED"];

/// Exit delay is clamped to the protocol's supported window.
const EXIT_DELAY_MAX: i64 = 255;

impl PropertyBehavior for ArmState {
    fn kind(&self) -> PropertyKind {
        PropertyKind::ArmState
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["String", "Number", "Switch"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        ARM_STATE_PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        ARM_VALUES
    }

    /// The effective vocabulary is whatever the composed map covers.
    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        property.value_map().keys().map(str::to_string).collect()
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        match property.item().item_type.base_name() {
            "Number" => ValueMap::from_iter([
                ("ARMED_AWAY", "1"),
                ("ARMED_STAY", "2"),
                ("ARMED_NIGHT", "3"),
                ("DISARMED", "0"),
            ]),
            "Switch" => ValueMap::from_iter([("ARMED_AWAY", "ON"), ("DISARMED", "OFF")]),
            _ => ARM_VALUES.iter().map(|v| (*v, *v)).collect(),
        }
    }

    /// An arm state needs at least two reachable states.
    fn is_valid(&self, property: &Property) -> bool {
        property.value_map().len() >= 2
    }

    fn derive_parameters(&self, property: &mut Property, _item: &Item, _ctx: &PropertyContext<'_>) {
        if let Some(delay) = property
            .parameter(param::EXIT_DELAY)
            .and_then(ParameterValue::as_i64)
        {
            property.set_parameter(
                param::EXIT_DELAY,
                ParameterValue::Integer(delay.clamp(0, EXIT_DELAY_MAX)),
            );
        }
    }

    fn configuration(&self, property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        let delay = property
            .parameter(param::EXIT_DELAY)
            .and_then(ParameterValue::as_i64)?;
        Some(json!({ "exitDelay": delay }))
    }
}
