//! Thermostat kinds: setpoints, ambient sensors, operating mode and hold.

use serde_json::{json, Value};

use voicelink_core::convert::{ParameterValue, RangeParam};
use voicelink_core::item::{Dimension, Item};
use voicelink_core::{units, ParameterType};

use crate::behavior::{PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::kinds::{format_number, json_number, number_from_value};
use crate::param;
use crate::property::{Property, ValueMap};

const SETPOINT_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SCALE, ParameterType::String),
    (param::SETPOINT_RANGE, ParameterType::Range),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

const CELSIUS: &str = "Temperature.Celsius";
const FAHRENHEIT: &str = "Temperature.Fahrenheit";

/// A temperature setpoint. Dual-setpoint thermostats declare the upper and
/// lower bound as a linked pair.
pub struct Setpoint {
    kind: PropertyKind,
    linked: &'static [PropertyKind],
}

pub static TARGET_SETPOINT: Setpoint = Setpoint {
    kind: PropertyKind::TargetSetpoint,
    linked: &[],
};

pub static UPPER_SETPOINT: Setpoint = Setpoint {
    kind: PropertyKind::UpperSetpoint,
    linked: &[PropertyKind::LowerSetpoint],
};

pub static LOWER_SETPOINT: Setpoint = Setpoint {
    kind: PropertyKind::LowerSetpoint,
    linked: &[PropertyKind::UpperSetpoint],
};

/// Resolve the temperature scale for an item, stored as a unit identifier.
fn derive_scale(property: &mut Property, item: &Item, ctx: &PropertyContext<'_>) {
    if property.parameter(param::SCALE).is_some() {
        return;
    }
    let pattern = item
        .state_description
        .as_ref()
        .and_then(|sd| sd.pattern.as_deref());
    if let Some(entry) = units::resolve(
        item.unit.as_deref(),
        pattern,
        Dimension::Temperature,
        ctx.settings.regional.measurement_system,
    ) {
        property.set_parameter(param::SCALE, ParameterValue::String(entry.unit_id.into()));
    }
}

fn scale(property: &Property) -> &str {
    property
        .parameter(param::SCALE)
        .and_then(ParameterValue::as_str)
        .unwrap_or(CELSIUS)
}

impl Setpoint {
    /// Usable setpoint window: the configured range, or a conventional
    /// comfort window for the scale.
    fn range(property: &Property) -> RangeParam {
        property
            .parameter(param::SETPOINT_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid)
            .unwrap_or_else(|| {
                if scale(property) == FAHRENHEIT {
                    RangeParam::new(40.0, 90.0)
                } else {
                    RangeParam::new(4.0, 32.0)
                }
            })
    }
}

impl PropertyBehavior for Setpoint {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Number:Temperature", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SETPOINT_PARAMETERS
    }

    fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("range", param::SETPOINT_RANGE)]
    }

    fn required_linked_properties(&self) -> &'static [PropertyKind] {
        self.linked
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, ctx: &PropertyContext<'_>) {
        derive_scale(property, item, ctx);
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let target = Self::range(property).clamp(number_from_value(value)?);
        Some(format_number(target))
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        let current = property.item().numeric_state()?;
        Some(format_number(Self::range(property).clamp(current + delta)))
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        let value: f64 = raw.split_whitespace().next()?.parse().ok()?;
        Some(json!({
            "value": json_number(value),
            "scale": scale_name(scale(property)),
        }))
    }
}

/// Protocol scale name for a unit identifier.
fn scale_name(unit_id: &str) -> &'static str {
    match unit_id {
        FAHRENHEIT => "FAHRENHEIT",
        "Temperature.Kelvin" => "KELVIN",
        _ => "CELSIUS",
    }
}

/// Ambient temperature sensor, read-only.
pub struct TemperatureSensor;

pub static TEMPERATURE: TemperatureSensor = TemperatureSensor;

impl PropertyBehavior for TemperatureSensor {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Temperature
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Number:Temperature", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SETPOINT_PARAMETERS
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, ctx: &PropertyContext<'_>) {
        derive_scale(property, item, ctx);
    }

    fn command_for(&self, _property: &Property, _value: &Value) -> Option<String> {
        None
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        let value: f64 = raw.split_whitespace().next()?.parse().ok()?;
        Some(json!({
            "value": json_number(value),
            "scale": scale_name(scale(property)),
        }))
    }
}

const SENSOR_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

/// Relative humidity sensor, read-only percent.
pub struct HumiditySensor;

pub static HUMIDITY: HumiditySensor = HumiditySensor;

impl PropertyBehavior for HumiditySensor {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Humidity
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Number:Dimensionless", "Number", "Dimmer"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SENSOR_PARAMETERS
    }

    fn command_for(&self, _property: &Property, _value: &Value) -> Option<String> {
        None
    }

    fn state_for(&self, _property: &Property, raw: &str) -> Option<Value> {
        let value: f64 = raw.split_whitespace().next()?.parse().ok()?;
        Some(json_number(value.clamp(0.0, 100.0).round()))
    }
}

const MODE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::BINDING, ParameterType::String),
    (param::SUPPORTED_MODES, ParameterType::List),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

const THERMOSTAT_MODES: &[&str] = &["AUTO", "COOL", "ECO", "HEAT", "OFF"];

/// Thermostat operating mode with binding-specific raw vocabularies.
pub struct ThermostatMode;

pub static THERMOSTAT_MODE: ThermostatMode = ThermostatMode;

impl PropertyBehavior for ThermostatMode {
    fn kind(&self) -> PropertyKind {
        PropertyKind::ThermostatMode
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Number", "String", "Switch"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        MODE_PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        THERMOSTAT_MODES
    }

    /// The advertised modes are the mapped ones, optionally narrowed by an
    /// explicit `supportedModes` list.
    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        let mapped: Vec<String> = property.value_map().keys().map(str::to_string).collect();
        match property
            .parameter(param::SUPPORTED_MODES)
            .and_then(ParameterValue::as_list)
        {
            Some(listed) => mapped
                .into_iter()
                .filter(|mode| listed.iter().any(|l| l.eq_ignore_ascii_case(mode)))
                .collect(),
            None => mapped,
        }
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        let binding = property
            .parameter(param::BINDING)
            .and_then(ParameterValue::as_str)
            .unwrap_or("");
        match binding {
            "broadlinkthermostat" => ValueMap::from_iter([("AUTO", "auto"), ("HEAT", "manual")]),
            "daikin" => ValueMap::from_iter([("AUTO", "0"), ("COOL", "3"), ("HEAT", "4")]),
            "nest" => ValueMap::from_iter([
                ("AUTO", "HEAT_COOL"),
                ("COOL", "COOL"),
                ("ECO", "ECO"),
                ("HEAT", "HEAT"),
                ("OFF", "OFF"),
            ]),
            "zwave" => ValueMap::from_iter([
                ("AUTO", "3"),
                ("COOL", "2"),
                ("HEAT", "1"),
                ("OFF", "0"),
            ]),
            _ => match property.item().item_type.base_name() {
                "Number" => ValueMap::from_iter([
                    ("AUTO", "3"),
                    ("COOL", "2"),
                    ("HEAT", "1"),
                    ("OFF", "0"),
                ]),
                "Switch" => ValueMap::from_iter([("HEAT", "ON"), ("OFF", "OFF")]),
                _ => ValueMap::from_iter([
                    ("AUTO", "auto"),
                    ("COOL", "cool"),
                    ("ECO", "eco"),
                    ("HEAT", "heat"),
                    ("OFF", "off"),
                ]),
            },
        }
    }

    /// A mode selector needs at least two reachable modes.
    fn is_valid(&self, property: &Property) -> bool {
        self.supported_values_for(property).len() >= 2
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, _ctx: &PropertyContext<'_>) {
        if property.parameter(param::BINDING).is_none() {
            let binding = item
                .metadata("channel")
                .and_then(|entry| entry.value.split(':').next())
                .filter(|b| !b.is_empty())
                .map(str::to_string);
            if let Some(binding) = binding {
                property.set_parameter(param::BINDING, ParameterValue::String(binding));
            }
        }
    }

    fn configuration(&self, property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        let modes = self.supported_values_for(property);
        (!modes.is_empty()).then(|| json!({ "supportedModes": modes }))
    }
}

/// Thermostat hold, pinning the schedule to the current setpoints.
pub struct ThermostatHold;

pub static THERMOSTAT_HOLD: ThermostatHold = ThermostatHold;

impl PropertyBehavior for ThermostatHold {
    fn kind(&self) -> PropertyKind {
        PropertyKind::ThermostatHold
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Switch", "String", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SENSOR_PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        &["ON", "OFF"]
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        match property.item().item_type.base_name() {
            "String" => ValueMap::from_iter([("ON", "hold"), ("OFF", "schedule")]),
            "Number" => ValueMap::from_iter([("ON", "1"), ("OFF", "0")]),
            _ => ValueMap::from_iter([("ON", "ON"), ("OFF", "OFF")]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicelink_core::item::{ItemType, MetadataEntry};
    use voicelink_core::units::UnitSystem;
    use voicelink_core::{AssetCatalog, Settings};

    fn derive_in(
        kind: PropertyKind,
        item: &Item,
        config: serde_json::Value,
        settings: &Settings,
    ) -> Property {
        let catalog = AssetCatalog::new();
        let ctx = PropertyContext::new(settings, &catalog);
        let mut metadata = MetadataEntry::new(kind.as_str());
        if let Value::Object(map) = config {
            metadata.config = map;
        }
        Property::derive(kind, item, &metadata, None, None, &ctx).unwrap()
    }

    fn derive(kind: PropertyKind, item: &Item, config: serde_json::Value) -> Property {
        derive_in(kind, item, config, &Settings::default())
    }

    #[test]
    fn test_setpoint_scale_from_unit() {
        let mut item = Item::new("setpoint", ItemType::Number(Some(Dimension::Temperature)));
        item.unit = Some("°F".into());
        let property = derive(PropertyKind::TargetSetpoint, &item, json!({}));
        assert_eq!(
            property.parameter(param::SCALE),
            Some(&ParameterValue::String(FAHRENHEIT.into()))
        );
        assert_eq!(
            property.get_state("72"),
            Some(json!({"value": 72, "scale": "FAHRENHEIT"}))
        );
    }

    #[test]
    fn test_setpoint_scale_regional_default() {
        let item = Item::new("setpoint", ItemType::Number(Some(Dimension::Temperature)));
        let imperial = Settings::new("en", UnitSystem::Imperial);
        let property = derive_in(PropertyKind::TargetSetpoint, &item, json!({}), &imperial);
        assert_eq!(
            property.parameter(param::SCALE),
            Some(&ParameterValue::String(FAHRENHEIT.into()))
        );
    }

    #[test]
    fn test_setpoint_clamps_to_comfort_window() {
        let item = Item::new("setpoint", ItemType::Number(Some(Dimension::Temperature)));
        let property = derive(PropertyKind::TargetSetpoint, &item, json!({}));
        assert_eq!(property.get_command(&json!(50)), Some("32".into()));
        assert_eq!(property.get_command(&json!(21.5)), Some("21.5".into()));

        let custom = derive(PropertyKind::TargetSetpoint, &item, json!({"range": "10:25"}));
        assert_eq!(custom.get_command(&json!(50)), Some("25".into()));
    }

    #[test]
    fn test_setpoint_pair_requires_both_bounds() {
        let item = Item::new("upper", ItemType::Number(Some(Dimension::Temperature)));
        let upper = derive(PropertyKind::UpperSetpoint, &item, json!({}));
        assert!(!upper.has_required_linked_properties(&[]));

        let lower_item = Item::new("lower", ItemType::Number(Some(Dimension::Temperature)));
        let lower = derive(PropertyKind::LowerSetpoint, &lower_item, json!({}));
        assert!(upper.has_required_linked_properties(std::slice::from_ref(&lower)));
    }

    #[test]
    fn test_temperature_sensor_is_read_only() {
        let mut item = Item::new("ambient", ItemType::Number(Some(Dimension::Temperature)));
        item.unit = Some("°C".into());
        let property = derive(PropertyKind::Temperature, &item, json!({}));
        assert_eq!(property.get_command(&json!(20)), None);
        assert_eq!(
            property.get_state("21.5 °C"),
            Some(json!({"value": 21.5, "scale": "CELSIUS"}))
        );
    }

    #[test]
    fn test_humidity_clamps_and_rounds() {
        let item = Item::new("humidity", ItemType::Number(None));
        let property = derive(PropertyKind::Humidity, &item, json!({}));
        assert_eq!(property.get_state("57.4"), Some(json!(57)));
        assert_eq!(property.get_state("130"), Some(json!(100)));
        assert_eq!(property.get_command(&json!(50)), None);
    }

    #[test]
    fn test_mode_binding_vocabulary() {
        let mut item = Item::new("mode", ItemType::String);
        item.metadata
            .insert("channel".into(), MetadataEntry::new("nest:thermostat:mode"));
        let property = derive(PropertyKind::ThermostatMode, &item, json!({}));
        assert_eq!(property.get_command(&json!("AUTO")), Some("HEAT_COOL".into()));
        assert_eq!(property.get_state("ECO"), Some(json!("ECO")));
        assert!(property.is_valid());
    }

    #[test]
    fn test_mode_narrowed_by_supported_list() {
        let item = Item::new("mode", ItemType::Number(None));
        let property = derive(
            PropertyKind::ThermostatMode,
            &item,
            json!({"supportedModes": "HEAT,COOL"}),
        );
        assert_eq!(property.supported_values(), ["COOL", "HEAT"]);
        assert_eq!(
            property.configuration(&PropertyContext::new(
                &Settings::default(),
                &AssetCatalog::new()
            )),
            Some(json!({"supportedModes": ["COOL", "HEAT"]}))
        );
    }

    #[test]
    fn test_mode_switch_has_two_modes() {
        let item = Item::new("heater", ItemType::Switch);
        let property = derive(PropertyKind::ThermostatMode, &item, json!({}));
        assert_eq!(property.get_command(&json!("HEAT")), Some("ON".into()));
        assert_eq!(property.get_state("OFF"), Some(json!("OFF")));
        assert!(property.is_valid());
    }

    #[test]
    fn test_hold_string_vocabulary() {
        let item = Item::new("hold", ItemType::String);
        let property = derive(PropertyKind::ThermostatHold, &item, json!({}));
        assert_eq!(property.get_command(&json!("ON")), Some("hold".into()));
        assert_eq!(property.get_state("schedule"), Some(json!("OFF")));
    }
}
