//! Color kinds.
//!
//! Full color maps an HSB triple to the hub's `hue,saturation,brightness`
//! state. Color temperature is Kelvin-valued on numeric items and rides the
//! percent scale on dimmer-backed white channels, where 0% is the coldest
//! point of the binding's white range.

use serde_json::{json, Value};

use voicelink_core::convert::{ParameterValue, RangeParam};
use voicelink_core::item::Item;
use voicelink_core::ParameterType;

use crate::behavior::{PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::kinds::{format_number, json_number, number_from_value};
use crate::param;
use crate::property::Property;

const COLOR_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

/// Full HSB color on a color item.
pub struct ColorValue;

pub static COLOR: ColorValue = ColorValue;

impl PropertyBehavior for ColorValue {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Color
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Color"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        COLOR_PARAMETERS
    }

    /// External color objects carry saturation and brightness as 0..1
    /// fractions; the hub expects 0..100 percent components.
    fn command_for(&self, _property: &Property, value: &Value) -> Option<String> {
        let hue = value.get("hue").and_then(Value::as_f64)?;
        let saturation = value.get("saturation").and_then(Value::as_f64)?;
        let brightness = value.get("brightness").and_then(Value::as_f64)?;
        Some(format!(
            "{},{},{}",
            format_number(hue.clamp(0.0, 360.0)),
            format_number((saturation * 100.0).clamp(0.0, 100.0).round()),
            format_number((brightness * 100.0).clamp(0.0, 100.0).round()),
        ))
    }

    fn state_for(&self, _property: &Property, raw: &str) -> Option<Value> {
        let mut components = raw.split(',');
        let hue: f64 = components.next()?.trim().parse().ok()?;
        let saturation: f64 = components.next()?.trim().parse().ok()?;
        let brightness: f64 = components.next()?.trim().parse().ok()?;
        Some(json!({
            "hue": hue,
            "saturation": saturation / 100.0,
            "brightness": brightness / 100.0,
        }))
    }
}

const COLOR_TEMPERATURE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTED_RANGE, ParameterType::Range),
    (param::BINDING, ParameterType::String),
    (param::COLOR_COMPANION, ParameterType::Boolean),
    (param::INCREMENT, ParameterType::Float),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

const COLOR_TEMPERATURE_DEFAULT_RANGE: RangeParam = RangeParam {
    minimum: 2200.0,
    maximum: 6500.0,
    precision: None,
};

const DEFAULT_INCREMENT: f64 = 500.0;

/// Known binding-specific color temperature ranges, in Kelvin.
///
/// Dimmer-backed channels only drive the white range; color-capable bulbs
/// reach further on their dedicated channel.
fn binding_range(binding: Option<&str>, white_only: bool) -> RangeParam {
    match binding {
        Some("hue") if !white_only => RangeParam::new(2000.0, 6500.0),
        Some("hue") => RangeParam::new(2200.0, 6500.0),
        Some("lifx") => RangeParam::new(2500.0, 9000.0),
        Some("milight") | Some("easybulb") => RangeParam::new(2700.0, 6500.0),
        Some("tplinksmarthome") => RangeParam::new(2500.0, 9000.0),
        Some("tradfri") if !white_only => RangeParam::new(1780.0, 6000.0),
        Some("tradfri") => RangeParam::new(2200.0, 4000.0),
        Some("yeelight") => RangeParam::new(1700.0, 6500.0),
        _ => COLOR_TEMPERATURE_DEFAULT_RANGE,
    }
}

/// Color temperature in Kelvin.
pub struct ColorTemperature;

pub static COLOR_TEMPERATURE: ColorTemperature = ColorTemperature;

impl ColorTemperature {
    fn range(property: &Property) -> RangeParam {
        property
            .parameter(param::SUPPORTED_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid)
            .unwrap_or(COLOR_TEMPERATURE_DEFAULT_RANGE)
    }

    fn is_percent_based(property: &Property) -> bool {
        property.item().item_type.base_name() == "Dimmer"
    }

    /// Kelvin reading of a raw hub state. On percent channels 0% is the
    /// coldest (highest Kelvin) point of the range.
    fn kelvin_state(property: &Property, raw: &str) -> Option<f64> {
        let range = Self::range(property);
        let value: f64 = raw.split_whitespace().next()?.parse().ok()?;
        if Self::is_percent_based(property) {
            Some(range.maximum - value.clamp(0.0, 100.0) / 100.0 * range.span())
        } else {
            Some(range.clamp(value))
        }
    }

    fn kelvin_command(property: &Property, kelvin: f64) -> String {
        let range = Self::range(property);
        let kelvin = range.clamp(kelvin);
        if Self::is_percent_based(property) {
            format_number(((range.maximum - kelvin) / range.span() * 100.0).round())
        } else {
            format_number(kelvin)
        }
    }
}

impl PropertyBehavior for ColorTemperature {
    fn kind(&self) -> PropertyKind {
        PropertyKind::ColorTemperature
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Dimmer", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        COLOR_TEMPERATURE_PARAMETERS
    }

    fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("range", param::SUPPORTED_RANGE)]
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, ctx: &PropertyContext<'_>) {
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

        let explicit = property
            .parameter(param::SUPPORTED_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid);
        let range = explicit.unwrap_or_else(|| {
            let binding = property
                .parameter(param::BINDING)
                .and_then(ParameterValue::as_str)
                .map(str::to_string);
            binding_range(binding.as_deref(), Self::is_percent_based(property))
        });
        property.set_parameter(param::SUPPORTED_RANGE, ParameterValue::Range(range));

        if ctx.sibling(PropertyKind::Color).is_some() {
            property.set_parameter(param::COLOR_COMPANION, ParameterValue::Boolean(true));
        }
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let kelvin = number_from_value(value)?;
        Some(Self::kelvin_command(property, kelvin))
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        let step = property
            .parameter(param::INCREMENT)
            .and_then(ParameterValue::as_f64)
            .unwrap_or(DEFAULT_INCREMENT);
        let state = property.item().state.as_deref()?;
        let current = Self::kelvin_state(property, state)?;
        let target = Self::range(property).clamp(current + delta.signum() * step.abs());
        Some(Self::kelvin_command(property, target))
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        Self::kelvin_state(property, raw).map(|k| json_number(k.round()))
    }
}

/// Whether a color temperature channel is currently overridden by color.
///
/// A saturated companion color item means the bulb renders color, so the
/// temperature reading is not meaningful. Some bindings idle at mid
/// saturation, so the threshold is binding-specific. The zero-level sentinel
/// applies only to standalone percent channels: when a companion color item
/// was recorded at derivation, color mode is its to signal, not the level's.
pub fn in_color_mode(property: &Property, companion_state: Option<&str>) -> bool {
    if let Some(state) = companion_state {
        let saturation: Option<f64> = state
            .split(',')
            .nth(1)
            .and_then(|s| s.trim().parse().ok());
        let binding = property
            .parameter(param::BINDING)
            .and_then(ParameterValue::as_str);
        let threshold = match binding {
            Some("milight") | Some("easybulb") => 50.0,
            _ => 0.0,
        };
        return saturation.map(|s| s > threshold).unwrap_or(false);
    }
    if property.bool_parameter(param::COLOR_COMPANION, false) {
        return false;
    }
    if ColorTemperature::is_percent_based(property) {
        return property
            .item()
            .state
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .map(|level| level == 0.0)
            .unwrap_or(false);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicelink_core::item::{ItemType, MetadataEntry};
    use voicelink_core::{AssetCatalog, Settings};

    fn derive(kind: PropertyKind, item: &Item, config: serde_json::Value) -> Property {
        let settings = Settings::default();
        let catalog = AssetCatalog::new();
        let ctx = PropertyContext::new(&settings, &catalog);
        let mut metadata = MetadataEntry::new(kind.as_str());
        if let Value::Object(map) = config {
            metadata.config = map;
        }
        Property::derive(kind, item, &metadata, None, None, &ctx).unwrap()
    }

    #[test]
    fn test_color_round_trip() {
        let item = Item::new("bulb", ItemType::Color);
        let property = derive(PropertyKind::Color, &item, json!({}));
        let command = property
            .get_command(&json!({"hue": 120.0, "saturation": 0.5, "brightness": 0.75}))
            .unwrap();
        assert_eq!(command, "120,50,75");
        assert_eq!(
            property.get_state("120,50,75"),
            Some(json!({"hue": 120.0, "saturation": 0.5, "brightness": 0.75}))
        );
    }

    #[test]
    fn test_color_rejects_partial_objects() {
        let item = Item::new("bulb", ItemType::Color);
        let property = derive(PropertyKind::Color, &item, json!({}));
        assert_eq!(property.get_command(&json!({"hue": 120.0})), None);
    }

    #[test]
    fn test_temperature_percent_scale_endpoints() {
        let mut item = Item::new("white", ItemType::Dimmer);
        item.metadata
            .insert("channel".into(), MetadataEntry::new("hue:whiteBulb:ct"));
        let property = derive(PropertyKind::ColorTemperature, &item, json!({"range": "2000:6500"}));
        assert_eq!(property.get_state("0"), Some(json!(6500)));
        assert_eq!(property.get_state("100"), Some(json!(2000)));
        assert_eq!(property.get_command(&json!(6500)), Some("0".into()));
        assert_eq!(property.get_command(&json!(2000)), Some("100".into()));
    }

    #[test]
    fn test_temperature_binding_defaults() {
        let mut item = Item::new("bulb", ItemType::Number(None));
        item.metadata
            .insert("channel".into(), MetadataEntry::new("lifx:colorLight:ct"));
        let property = derive(PropertyKind::ColorTemperature, &item, json!({}));
        assert_eq!(
            property.parameter(param::SUPPORTED_RANGE),
            Some(&ParameterValue::Range(RangeParam::new(2500.0, 9000.0)))
        );
        assert_eq!(
            property.parameter(param::BINDING),
            Some(&ParameterValue::String("lifx".into()))
        );
    }

    #[test]
    fn test_temperature_number_clamps_to_range() {
        let item = Item::new("bulb", ItemType::Number(None));
        let property = derive(PropertyKind::ColorTemperature, &item, json!({}));
        assert_eq!(property.get_command(&json!(10000)), Some("6500".into()));
        assert_eq!(property.get_state("1000"), Some(json!(2200)));
    }

    #[test]
    fn test_temperature_adjusts_by_increment() {
        let mut item = Item::new("bulb", ItemType::Number(None));
        item.state = Some("3000".into());
        let property = derive(PropertyKind::ColorTemperature, &item, json!({}));
        assert_eq!(property.get_adjust_command(1.0), Some("3500".into()));
        assert_eq!(property.get_adjust_command(-1.0), Some("2500".into()));
    }

    #[test]
    fn test_color_mode_detection() {
        let item = Item::new("bulb", ItemType::Number(None));
        let property = derive(PropertyKind::ColorTemperature, &item, json!({}));
        assert!(in_color_mode(&property, Some("120,80,50")));
        assert!(!in_color_mode(&property, Some("120,0,50")));

        let mut white = Item::new("white", ItemType::Dimmer);
        white.state = Some("0".into());
        let percent = derive(PropertyKind::ColorTemperature, &white, json!({}));
        assert!(in_color_mode(&percent, None));
    }

    #[test]
    fn test_companion_disables_zero_level_sentinel() {
        let settings = Settings::default();
        let catalog = AssetCatalog::new();
        let color_item = Item::new("bulbColor", ItemType::Color);
        let color = Property::derive(
            PropertyKind::Color,
            &color_item,
            &MetadataEntry::new("color"),
            None,
            None,
            &PropertyContext::new(&settings, &catalog),
        )
        .unwrap();

        let siblings = [color];
        let ctx = PropertyContext::new(&settings, &catalog).with_siblings(&siblings);
        let mut white = Item::new("bulbWhite", ItemType::Dimmer);
        white.state = Some("0".into());
        let property = Property::derive(
            PropertyKind::ColorTemperature,
            &white,
            &MetadataEntry::new("colorTemperature"),
            None,
            None,
            &ctx,
        )
        .unwrap();

        assert_eq!(
            property.parameter(param::COLOR_COMPANION),
            Some(&ParameterValue::Boolean(true))
        );
        // The recorded companion takes over color-mode signaling.
        assert!(!in_color_mode(&property, None));
        assert!(in_color_mode(&property, Some("120,80,50")));
    }
}
