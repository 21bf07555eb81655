//! Numeric level kinds.
//!
//! Percent levels share one behavior clamped to 0..100 with optional
//! inversion; the generic range value carries its own bounds, unit and preset
//! configuration and scales to percent for percent-based items.

use serde_json::{json, Value};
use tracing::warn;

use voicelink_core::catalog::{self, ResourceType};
use voicelink_core::convert::{ParameterValue, RangeParam};
use voicelink_core::item::{Item, ItemType};
use voicelink_core::semantics::{DirectiveSpec, Semantics, SemanticsBuilder};
use voicelink_core::{units, ParameterType};

use crate::behavior::{resource_language, PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::kinds::{format_number, json_number, number_from_value, parse_delta, resolve_labeled_entries};
use crate::param;
use crate::property::Property;

const LEVEL_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

const INVERTIBLE_LEVEL_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::INVERTED, ParameterType::Boolean),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

const VOLUME_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::INCREMENT, ParameterType::Float),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

/// Shared behavior for 0..100 percent levels.
pub struct PercentLevel {
    kind: PropertyKind,
    item_types: &'static [&'static str],
    parameters: &'static [(&'static str, ParameterType)],
    invertible: bool,
}

pub static BRIGHTNESS: PercentLevel = PercentLevel {
    kind: PropertyKind::Brightness,
    item_types: &["Dimmer", "Color"],
    parameters: LEVEL_PARAMETERS,
    invertible: false,
};

pub static POWER_LEVEL: PercentLevel = PercentLevel {
    kind: PropertyKind::PowerLevel,
    item_types: &["Dimmer"],
    parameters: LEVEL_PARAMETERS,
    invertible: false,
};

pub static PERCENTAGE: PercentLevel = PercentLevel {
    kind: PropertyKind::Percentage,
    item_types: &["Dimmer", "Rollershutter"],
    parameters: INVERTIBLE_LEVEL_PARAMETERS,
    invertible: true,
};

pub static VOLUME_LEVEL: PercentLevel = PercentLevel {
    kind: PropertyKind::VolumeLevel,
    item_types: &["Dimmer", "Number"],
    parameters: VOLUME_PARAMETERS,
    invertible: false,
};

impl PercentLevel {
    /// Rollershutters report 0 when fully open, so invertible levels flip by
    /// default on them.
    fn default_inverted(&self, property: &Property) -> bool {
        self.invertible && property.item().item_type.base_name() == "Rollershutter"
    }

    /// External percent level read from a raw hub state.
    fn state_value(&self, property: &Property, raw: &str) -> Option<f64> {
        // Color items report "hue,saturation,brightness"; the level is last.
        let level: f64 = raw.rsplit(',').next()?.trim().parse().ok()?;
        let level = level.clamp(0.0, 100.0).round();
        if property.is_inverted(self.default_inverted(property)) {
            Some(100.0 - level)
        } else {
            Some(level)
        }
    }

    /// Raw hub command for an external percent level.
    fn command_value(&self, property: &Property, level: f64) -> String {
        let level = level.clamp(0.0, 100.0).round();
        if property.is_inverted(self.default_inverted(property)) {
            format_number(100.0 - level)
        } else {
            format_number(level)
        }
    }
}

impl PropertyBehavior for PercentLevel {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        self.item_types
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        self.parameters
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let level = number_from_value(value)?;
        Some(self.command_value(property, level))
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        let delta = match property
            .parameter(param::INCREMENT)
            .and_then(ParameterValue::as_f64)
        {
            Some(step) => delta.signum() * step.abs(),
            None => delta,
        };
        let state = property.item().state.as_deref()?;
        let current = self.state_value(property, state)?;
        Some(self.command_value(property, (current + delta).clamp(0.0, 100.0)))
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        self.state_value(property, raw).map(json_number)
    }
}

const EQUALIZER_DEFAULT_RANGE: RangeParam = RangeParam {
    minimum: -10.0,
    maximum: 10.0,
    precision: None,
};

const EQUALIZER_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTED_RANGE, ParameterType::Range),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

/// One equalizer band level (bass, midrange or treble) on a numeric item.
pub struct EqualizerBands;

pub static EQUALIZER_BANDS: EqualizerBands = EqualizerBands;

impl EqualizerBands {
    fn range(property: &Property) -> RangeParam {
        property
            .parameter(param::SUPPORTED_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid)
            .unwrap_or(EQUALIZER_DEFAULT_RANGE)
    }
}

impl PropertyBehavior for EqualizerBands {
    fn kind(&self) -> PropertyKind {
        PropertyKind::EqualizerBands
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Number", "Dimmer"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        EQUALIZER_PARAMETERS
    }

    fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("range", param::SUPPORTED_RANGE)]
    }

    fn required_components(&self) -> &'static [&'static str] {
        &["bass", "midrange", "treble"]
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, _ctx: &PropertyContext<'_>) {
        let explicit = property
            .parameter(param::SUPPORTED_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid);
        let range = explicit
            .or_else(|| range_from_state_description(item))
            .unwrap_or(EQUALIZER_DEFAULT_RANGE);
        property.set_parameter(param::SUPPORTED_RANGE, ParameterValue::Range(range));
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let level = Self::range(property).clamp(number_from_value(value)?);
        Some(format_number(level))
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        let current = property.item().numeric_state()?;
        Some(format_number(Self::range(property).clamp(current + delta)))
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        let level: f64 = raw.split_whitespace().next()?.parse().ok()?;
        Some(json_number(Self::range(property).clamp(level)))
    }

    fn configuration(&self, property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        let range = Self::range(property);
        Some(json!({
            "range": {
                "minimum": json_number(range.minimum),
                "maximum": json_number(range.maximum),
            }
        }))
    }
}

const RANGE_VALUE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTED_RANGE, ParameterType::Range),
    (param::PRESETS, ParameterType::Map),
    (param::UNIT_OF_MEASURE, ParameterType::String),
    (param::INVERTED, ParameterType::Boolean),
    (param::ACTION_MAPPINGS, ParameterType::Map),
    (param::STATE_MAPPINGS, ParameterType::Map),
    (param::NON_CONTROLLABLE, ParameterType::Boolean),
    (param::LANGUAGE, ParameterType::String),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

/// Action identifiers usable in range action mappings.
const RANGE_ACTIONS: &[&str] = &["Close", "Open", "Lower", "Raise", "Stop"];

/// State identifiers usable in range state mappings.
const RANGE_STATES: &[&str] = &["Closed", "Open", "High", "Low", "Done"];

const RANGE_DEFAULT: RangeParam = RangeParam {
    minimum: 0.0,
    maximum: 100.0,
    precision: Some(1.0),
};

/// Generic numeric range value with configurable bounds, unit, presets and
/// semantic mappings.
pub struct RangeValue;

pub static RANGE_VALUE: RangeValue = RangeValue;

impl RangeValue {
    fn range(property: &Property) -> RangeParam {
        property
            .parameter(param::SUPPORTED_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid)
            .unwrap_or(RANGE_DEFAULT)
    }

    fn default_inverted(property: &Property) -> bool {
        property.item().item_type.base_name() == "Rollershutter"
    }

    /// Raw hub value for an external range value: inversion first, then
    /// percent scaling for percent-based items.
    fn raw_value(property: &Property, value: f64) -> f64 {
        let range = Self::range(property);
        let value = range.clamp(value);
        let value = if property.is_inverted(Self::default_inverted(property)) {
            range.minimum + range.maximum - value
        } else {
            value
        };
        if property.item().item_type.is_percent_based() {
            (value - range.minimum) / range.span() * 100.0
        } else {
            value
        }
    }

    /// External range value for a raw hub state, inverse of [`raw_value`].
    fn external_value(property: &Property, raw: f64) -> f64 {
        let range = Self::range(property);
        let value = if property.item().item_type.is_percent_based() {
            range.minimum + raw.clamp(0.0, 100.0) / 100.0 * range.span()
        } else {
            range.clamp(raw)
        };
        if property.is_inverted(Self::default_inverted(property)) {
            range.minimum + range.maximum - value
        } else {
            value
        }
    }
}

impl PropertyBehavior for RangeValue {
    fn kind(&self) -> PropertyKind {
        PropertyKind::RangeValue
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Dimmer", "Number", "Rollershutter"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        RANGE_VALUE_PARAMETERS
    }

    fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("range", param::SUPPORTED_RANGE)]
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, ctx: &PropertyContext<'_>) {
        let explicit = property
            .parameter(param::SUPPORTED_RANGE)
            .and_then(ParameterValue::as_range)
            .copied()
            .filter(RangeParam::is_valid);
        let range = explicit
            .or_else(|| range_from_state_description(item))
            .unwrap_or(RANGE_DEFAULT);
        property.set_parameter(param::SUPPORTED_RANGE, ParameterValue::Range(range));

        match property
            .parameter(param::UNIT_OF_MEASURE)
            .and_then(ParameterValue::as_str)
        {
            Some(unit_id) => {
                if !units::UNIT_TABLE.iter().any(|entry| entry.unit_id == unit_id) {
                    warn!(item = %item.name, unit = unit_id, "Dropping unknown unit of measure");
                    property.remove_parameter(param::UNIT_OF_MEASURE);
                }
            }
            None => {
                if let ItemType::Number(Some(dimension)) = item.effective_type() {
                    let pattern = item
                        .state_description
                        .as_ref()
                        .and_then(|sd| sd.pattern.as_deref());
                    if let Some(entry) = units::resolve(
                        item.unit.as_deref(),
                        pattern,
                        *dimension,
                        ctx.settings.regional.measurement_system,
                    ) {
                        property.set_parameter(
                            param::UNIT_OF_MEASURE,
                            ParameterValue::String(entry.unit_id.to_string()),
                        );
                    }
                }
            }
        }
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        if property.bool_parameter(param::NON_CONTROLLABLE, false) {
            return None;
        }
        let value = number_from_value(value)?;
        Some(format_number(Self::raw_value(property, value)))
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        if property.bool_parameter(param::NON_CONTROLLABLE, false) {
            return None;
        }
        let raw = property.item().numeric_state()?;
        let current = Self::external_value(property, raw);
        let target = Self::range(property).clamp(current + delta);
        Some(format_number(Self::raw_value(property, target)))
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        let raw: f64 = raw.split_whitespace().next()?.parse().ok()?;
        Some(json_number(Self::external_value(property, raw)))
    }

    fn configuration(&self, property: &Property, ctx: &PropertyContext<'_>) -> Option<Value> {
        let range = Self::range(property);
        let mut configuration = json!({
            "supportedRange": {
                "minimum": json_number(range.minimum),
                "maximum": json_number(range.maximum),
                "precision": json_number(range.precision.unwrap_or(1.0)),
            }
        });

        if let Some(unit_id) = property
            .parameter(param::UNIT_OF_MEASURE)
            .and_then(ParameterValue::as_str)
        {
            configuration["unitOfMeasure"] = Value::String(unit_id.to_string());
        }

        if let Some(map) = property
            .parameter(param::PRESETS)
            .and_then(ParameterValue::as_map)
        {
            let mut presets = Vec::new();
            for (key, labels) in
                resolve_labeled_entries(map, ResourceType::Preset, ctx.catalog)
            {
                let Ok(value) = key.parse::<f64>() else {
                    warn!(preset = %key, "Dropping non-numeric preset");
                    continue;
                };
                if !range.contains(value) {
                    warn!(preset = %key, "Dropping out-of-range preset");
                    continue;
                }
                let resources = catalog::resources(
                    &labels,
                    resource_language(property, ctx),
                    ResourceType::Preset,
                    ctx.catalog,
                );
                if resources.is_empty() {
                    continue;
                }
                presets.push(json!({
                    "rangeValue": json_number(value),
                    "presetResources": serde_json::to_value(resources).ok()?,
                }));
            }
            if !presets.is_empty() {
                configuration["presets"] = Value::Array(presets);
            }
        }

        Some(configuration)
    }

    fn semantics(&self, property: &Property) -> Option<Semantics> {
        let mut builder = SemanticsBuilder::new();

        if let Some(map) = property
            .parameter(param::ACTION_MAPPINGS)
            .and_then(ParameterValue::as_map)
        {
            for (action, value) in map.iter() {
                if !RANGE_ACTIONS.contains(&action) {
                    warn!(action, "Skipping unsupported action mapping");
                    continue;
                }
                let Some(value) = value else { continue };
                let directive = if let Some(delta) = parse_delta(value) {
                    DirectiveSpec::new("AdjustRangeValue").with_payload(json!({
                        "rangeValueDelta": json_number(delta),
                        "rangeValueDeltaDefault": false,
                    }))
                } else if let Ok(target) = value.parse::<f64>() {
                    DirectiveSpec::new("SetRangeValue")
                        .with_payload(json!({ "rangeValue": json_number(target) }))
                } else {
                    warn!(action, value, "Skipping malformed action mapping");
                    continue;
                };
                builder.add_action(format!("Actions.{}", action), directive);
            }
        }

        if let Some(map) = property
            .parameter(param::STATE_MAPPINGS)
            .and_then(ParameterValue::as_map)
        {
            for (state, value) in map.iter() {
                if !RANGE_STATES.contains(&state) {
                    warn!(state, "Skipping unsupported state mapping");
                    continue;
                }
                let Some(value) = value else { continue };
                let identifier = format!("States.{}", state);
                if let Some((low, high)) = value.split_once(':') {
                    let (Ok(low), Ok(high)) = (low.parse::<f64>(), high.parse::<f64>()) else {
                        warn!(state, value, "Skipping malformed state mapping");
                        continue;
                    };
                    builder.add_state_range(identifier, low, high);
                } else if let Ok(target) = value.parse::<f64>() {
                    builder.add_state_value(identifier, json_number(target));
                } else {
                    warn!(state, value, "Skipping malformed state mapping");
                }
            }
        }

        builder.build()
    }
}

/// Range carried by an item's state description, when complete and usable.
fn range_from_state_description(item: &Item) -> Option<RangeParam> {
    let description = item.state_description.as_ref()?;
    let mut range = RangeParam::new(description.minimum?, description.maximum?);
    if let Some(step) = description.step {
        range = range.with_precision(step);
    }
    Some(range).filter(RangeParam::is_valid)
}
