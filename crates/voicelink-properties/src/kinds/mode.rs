//! Enumerated selector kinds: generic modes, equalizer modes, inputs and
//! channels.

use serde_json::{json, Value};
use tracing::warn;

use voicelink_core::catalog::{self, ResourceType};
use voicelink_core::convert::{OrderedMap, ParameterValue};
use voicelink_core::item::Item;
use voicelink_core::semantics::{DirectiveSpec, Semantics, SemanticsBuilder};
use voicelink_core::ParameterType;

use crate::behavior::{resource_language, PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::kinds::{number_from_value, parse_delta, resolve_labeled_entries};
use crate::param;
use crate::property::{Property, ValueMap};

const MODE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTED_MODES, ParameterType::Map),
    (param::SUPPORTED_COMMANDS, ParameterType::List),
    (param::ORDERED, ParameterType::Boolean),
    (param::ACTION_MAPPINGS, ParameterType::Map),
    (param::STATE_MAPPINGS, ParameterType::Map),
    (param::NON_CONTROLLABLE, ParameterType::Boolean),
    (param::LANGUAGE, ParameterType::String),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

/// Spoken command vocabulary for command-shaped mode channels, with the
/// default friendly-name asset each command resolves to.
const COMMAND_VOCABULARY: &[(&str, &str)] = &[
    ("INCREASE", "@Value.Increase"),
    ("DECREASE", "@Value.Decrease"),
    ("UP", "@Value.Up"),
    ("DOWN", "@Value.Down"),
    ("STOP", "@Value.Stop"),
    ("OPEN", "@Value.Open"),
    ("CLOSE", "@Value.Close"),
];

/// Action identifiers usable in mode action mappings.
const MODE_ACTIONS: &[&str] = &["Close", "Open", "Lower", "Raise", "Stop"];

/// State identifiers usable in mode state mappings.
const MODE_STATES: &[&str] = &["Closed", "Open"];

/// Generic named-mode selector.
pub struct Mode;

pub static MODE: Mode = Mode;

impl Mode {
    fn modes(property: &Property) -> Option<OrderedMap> {
        property
            .parameter(param::SUPPORTED_MODES)
            .and_then(ParameterValue::as_map)
            .cloned()
    }
}

impl PropertyBehavior for Mode {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Mode
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["String", "Number", "Dimmer", "Rollershutter"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        MODE_PARAMETERS
    }

    fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("modes", param::SUPPORTED_MODES)]
    }

    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        Self::modes(property)
            .map(|modes| modes.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        let mut map = ValueMap::new();
        if let Some(modes) = Self::modes(property) {
            for key in modes.keys() {
                map.insert(key, key);
            }
        }
        map
    }

    /// A selector needs at least two modes; a command channel needs one.
    fn is_valid(&self, property: &Property) -> bool {
        let modes = self.supported_values_for(property).len();
        if property.parameter(param::SUPPORTED_COMMANDS).is_some() {
            modes >= 1
        } else {
            modes >= 2
        }
    }

    fn derive_parameters(&self, property: &mut Property, item: &Item, _ctx: &PropertyContext<'_>) {
        if let Some(commands) = property
            .parameter(param::SUPPORTED_COMMANDS)
            .and_then(ParameterValue::as_list)
            .map(<[String]>::to_vec)
        {
            // Command channels are stateless: each mode is a spoken command
            // sent verbatim, nothing to read back.
            let mut modes = OrderedMap::new();
            for entry in commands {
                let (command, labels) = match entry.split_once('=') {
                    Some((command, labels)) => (command.trim(), Some(labels.trim())),
                    None => (entry.trim(), None),
                };
                let command = command.to_uppercase();
                let Some((_, default_label)) = COMMAND_VOCABULARY
                    .iter()
                    .find(|(name, _)| *name == command)
                else {
                    warn!(command = %entry, "Skipping unsupported mode command");
                    continue;
                };
                let labels = labels
                    .filter(|l| !l.is_empty())
                    .unwrap_or(default_label)
                    .to_string();
                modes.insert(command, Some(labels));
            }
            if !modes.is_empty() {
                property.set_parameter(param::SUPPORTED_MODES, ParameterValue::Map(modes));
                property.set_parameter(param::RETRIEVABLE, ParameterValue::Boolean(false));
            }
            return;
        }

        if property.parameter(param::SUPPORTED_MODES).is_none() {
            // Fall back to the options advertised by the item itself.
            let options: OrderedMap = item
                .state_description
                .as_ref()
                .map(|sd| {
                    sd.options
                        .iter()
                        .map(|option| (option.value.clone(), option.label.clone()))
                        .collect()
                })
                .unwrap_or_default();
            if !options.is_empty() {
                property.set_parameter(param::SUPPORTED_MODES, ParameterValue::Map(options));
            }
        }
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        if property.bool_parameter(param::NON_CONTROLLABLE, false) {
            return None;
        }
        let value = value.as_str()?;
        property.value_map().command(value).map(str::to_string)
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        if !property.bool_parameter(param::ORDERED, false) {
            return None;
        }
        let modes = Self::modes(property)?;
        let current = property.item().state.as_deref()?;
        let keys: Vec<&str> = modes.keys().collect();
        let position = keys.iter().position(|k| {
            property
                .value_map()
                .command(k)
                .map(|raw| raw == current)
                .unwrap_or(*k == current)
        })?;
        let target = (position as i64 + delta.round() as i64)
            .clamp(0, keys.len() as i64 - 1) as usize;
        property.value_map().command(keys[target]).map(str::to_string)
    }

    fn configuration(&self, property: &Property, ctx: &PropertyContext<'_>) -> Option<Value> {
        let modes = Self::modes(property)?;
        let mut supported = Vec::new();
        for (value, labels) in resolve_labeled_entries(&modes, ResourceType::Mode, ctx.catalog) {
            let resources = catalog::resources(
                &labels,
                resource_language(property, ctx),
                ResourceType::Mode,
                ctx.catalog,
            );
            if resources.is_empty() {
                continue;
            }
            supported.push(json!({
                "value": value,
                "modeResources": serde_json::to_value(resources).ok()?,
            }));
        }
        if supported.is_empty() {
            return None;
        }
        Some(json!({
            "ordered": property.bool_parameter(param::ORDERED, false),
            "supportedModes": supported,
        }))
    }

    fn semantics(&self, property: &Property) -> Option<Semantics> {
        let mut builder = SemanticsBuilder::new();

        if let Some(map) = property
            .parameter(param::ACTION_MAPPINGS)
            .and_then(ParameterValue::as_map)
        {
            for (action, value) in map.iter() {
                if !MODE_ACTIONS.contains(&action) {
                    warn!(action, "Skipping unsupported action mapping");
                    continue;
                }
                let Some(value) = value else { continue };
                let directive = if let Some(delta) = parse_delta(value) {
                    DirectiveSpec::new("AdjustMode")
                        .with_payload(json!({ "modeDelta": delta.round() as i64 }))
                } else {
                    DirectiveSpec::new("SetMode").with_payload(json!({ "mode": value }))
                };
                builder.add_action(format!("Actions.{}", action), directive);
            }
        }

        if let Some(map) = property
            .parameter(param::STATE_MAPPINGS)
            .and_then(ParameterValue::as_map)
        {
            for (state, value) in map.iter() {
                if !MODE_STATES.contains(&state) {
                    warn!(state, "Skipping unsupported state mapping");
                    continue;
                }
                let Some(value) = value else { continue };
                builder.add_state_value(format!("States.{}", state), json!(value));
            }
        }

        builder.build()
    }
}

const SELECTOR_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

const EQUALIZER_MODES: &[&str] = &["MOVIE", "MUSIC", "NIGHT", "SPORT", "TV"];

/// Preset equalizer mode.
pub struct EqualizerMode;

pub static EQUALIZER_MODE: EqualizerMode = EqualizerMode;

impl PropertyBehavior for EqualizerMode {
    fn kind(&self) -> PropertyKind {
        PropertyKind::EqualizerMode
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["String", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SELECTOR_PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        EQUALIZER_MODES
    }

    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        property.value_map().keys().map(str::to_string).collect()
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        match property.item().item_type.base_name() {
            "Number" => ValueMap::from_iter([
                ("MOVIE", "1"),
                ("MUSIC", "2"),
                ("NIGHT", "3"),
                ("SPORT", "4"),
                ("TV", "5"),
            ]),
            _ => ValueMap::from_iter([
                ("MOVIE", "movie"),
                ("MUSIC", "music"),
                ("NIGHT", "night"),
                ("SPORT", "sport"),
                ("TV", "tv"),
            ]),
        }
    }

    fn is_valid(&self, property: &Property) -> bool {
        property.value_map().len() >= 2
    }

    fn configuration(&self, property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        let modes = self.supported_values_for(property);
        (!modes.is_empty()).then(|| json!({ "modes": modes }))
    }
}

const INPUT_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTED_INPUTS, ParameterType::List),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

/// External input names are case- and whitespace-insensitive.
fn normalize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Media source input selector.
pub struct Input;

pub static INPUT: Input = Input;

impl Input {
    fn inputs(property: &Property) -> Vec<String> {
        property
            .parameter(param::SUPPORTED_INPUTS)
            .and_then(ParameterValue::as_list)
            .map(|list| list.iter().map(|i| normalize_input(i)).collect())
            .unwrap_or_default()
    }
}

impl PropertyBehavior for Input {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Input
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["String", "Number"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        INPUT_PARAMETERS
    }

    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        Self::inputs(property)
    }

    fn is_valid(&self, property: &Property) -> bool {
        !Self::inputs(property).is_empty()
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let requested = normalize_input(value.as_str()?);
        Self::inputs(property).into_iter().find(|i| *i == requested)
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        let current = normalize_input(raw);
        Self::inputs(property)
            .into_iter()
            .find(|i| *i == current)
            .map(Value::String)
    }

    fn configuration(&self, property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        let inputs: Vec<Value> = Self::inputs(property)
            .into_iter()
            .map(|name| json!({ "name": name }))
            .collect();
        (!inputs.is_empty()).then(|| json!({ "inputs": inputs }))
    }
}

const CHANNEL_RANGE: (f64, f64) = (1.0, 9999.0);

/// Numeric television channel.
pub struct Channel;

pub static CHANNEL: Channel = Channel;

impl PropertyBehavior for Channel {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Channel
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Number", "String"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SELECTOR_PARAMETERS
    }

    fn command_for(&self, _property: &Property, value: &Value) -> Option<String> {
        let number = value
            .get("number")
            .and_then(number_from_value)
            .or_else(|| number_from_value(value))?;
        let number = number.clamp(CHANNEL_RANGE.0, CHANNEL_RANGE.1).round();
        Some(format!("{}", number as i64))
    }

    fn adjust_for(&self, property: &Property, delta: f64) -> Option<String> {
        let current = property.item().numeric_state()?;
        let target = (current + delta).clamp(CHANNEL_RANGE.0, CHANNEL_RANGE.1).round();
        Some(format!("{}", target as i64))
    }

    fn state_for(&self, _property: &Property, raw: &str) -> Option<Value> {
        let number: f64 = raw.trim().parse().ok()?;
        Some(json!({ "number": format!("{}", number as i64) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicelink_core::item::{ItemType, MetadataEntry, StateDescription, StateOption};
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
    fn test_mode_from_explicit_map() {
        let item = Item::new("washer", ItemType::String);
        let property = derive(
            PropertyKind::Mode,
            &item,
            json!({"supportedModes": "Normal=Normal:Cottons,Whites=Whites"}),
        );
        assert_eq!(property.supported_values(), ["Normal", "Whites"]);
        assert_eq!(property.get_command(&json!("Normal")), Some("Normal".into()));
        assert!(property.is_valid());
    }

    #[test]
    fn test_mode_from_state_description_options() {
        let mut item = Item::new("fan", ItemType::String);
        item.state_description = Some(StateDescription {
            options: vec![
                StateOption { value: "low".into(), label: Some("Low".into()) },
                StateOption { value: "high".into(), label: Some("High".into()) },
            ],
            ..Default::default()
        });
        let property = derive(PropertyKind::Mode, &item, json!({}));
        assert_eq!(property.supported_values(), ["low", "high"]);
    }

    #[test]
    fn test_mode_command_channel() {
        let item = Item::new("blind", ItemType::Rollershutter);
        let property = derive(
            PropertyKind::Mode,
            &item,
            json!({"supportedCommands": "UP,DOWN,STOP,SPIN"}),
        );
        assert_eq!(property.supported_values(), ["UP", "DOWN", "STOP"]);
        assert!(!property.is_retrievable());
        assert!(property.is_valid());
        assert_eq!(property.get_command(&json!("STOP")), Some("STOP".into()));
    }

    #[test]
    fn test_mode_single_mode_is_invalid() {
        let item = Item::new("washer", ItemType::String);
        let property = derive(PropertyKind::Mode, &item, json!({"supportedModes": "Normal"}));
        assert!(!property.is_valid());
    }

    #[test]
    fn test_mode_ordered_adjustment() {
        let mut item = Item::new("speed", ItemType::String);
        item.state = Some("medium".into());
        let property = derive(
            PropertyKind::Mode,
            &item,
            json!({"supportedModes": "low,medium,high", "ordered": true}),
        );
        assert_eq!(property.get_adjust_command(1.0), Some("high".into()));
        assert_eq!(property.get_adjust_command(-1.0), Some("low".into()));
        assert_eq!(property.get_adjust_command(5.0), Some("high".into()));
    }

    #[test]
    fn test_mode_configuration_resources() {
        let item = Item::new("washer", ItemType::String);
        let property = derive(
            PropertyKind::Mode,
            &item,
            json!({"supportedModes": "Normal=Normal:Cottons,Whites=Whites"}),
        );
        let settings = Settings::default();
        let catalog = AssetCatalog::new();
        let ctx = PropertyContext::new(&settings, &catalog);
        let configuration = property.configuration(&ctx).unwrap();
        assert_eq!(configuration["ordered"], json!(false));
        let modes = configuration["supportedModes"].as_array().unwrap();
        assert_eq!(modes.len(), 2);
        assert_eq!(modes[0]["value"], json!("Normal"));
    }

    #[test]
    fn test_mode_semantics() {
        let item = Item::new("blind", ItemType::String);
        let property = derive(
            PropertyKind::Mode,
            &item,
            json!({
                "supportedModes": "Up,Down",
                "actionMappings": "Close=Down,Open=Up,Lower=(+1)",
                "stateMappings": "Closed=Down,Open=Up",
            }),
        );
        let semantics = property.semantics().unwrap();
        assert_eq!(semantics.action_mappings.len(), 3);
        assert_eq!(semantics.action_mappings[2].directive.name, "AdjustMode");
        assert_eq!(semantics.state_mappings.len(), 2);
    }

    #[test]
    fn test_equalizer_mode_numeric() {
        let item = Item::new("eq", ItemType::Number(None));
        let property = derive(PropertyKind::EqualizerMode, &item, json!({}));
        assert_eq!(property.get_command(&json!("MOVIE")), Some("1".into()));
        assert_eq!(property.get_state("2"), Some(json!("MUSIC")));
    }

    #[test]
    fn test_input_normalization() {
        let item = Item::new("tv", ItemType::String);
        let property = derive(
            PropertyKind::Input,
            &item,
            json!({"supportedInputs": "HDMI 1,hdmi2,AUX"}),
        );
        assert_eq!(property.supported_values(), ["HDMI1", "HDMI2", "AUX"]);
        assert_eq!(property.get_command(&json!("hdmi 1")), Some("HDMI1".into()));
        assert_eq!(property.get_state("aux"), Some(json!("AUX")));
        assert_eq!(property.get_command(&json!("DVD")), None);
    }

    #[test]
    fn test_input_requires_list() {
        let item = Item::new("tv", ItemType::String);
        let property = derive(PropertyKind::Input, &item, json!({}));
        assert!(!property.is_valid());
    }

    #[test]
    fn test_channel_clamps() {
        let mut item = Item::new("tv", ItemType::Number(None));
        item.state = Some("7".into());
        let property = derive(PropertyKind::Channel, &item, json!({}));
        assert_eq!(property.get_command(&json!({"number": "12"})), Some("12".into()));
        assert_eq!(property.get_command(&json!(0)), Some("1".into()));
        assert_eq!(property.get_adjust_command(-10.0), Some("1".into()));
        assert_eq!(property.get_state("42"), Some(json!({"number": "42"})));
    }
}
