//! Binary state kinds.
//!
//! Two-valued kinds sharing one behavior: a fixed pair of external symbols
//! mapped onto the bound item's natural on/off vocabulary, with the
//! `inverted` parameter flipping the mapping at both read and write time.
//! Percent-oriented items report state numerically, so reads go through a
//! threshold instead of the map.

use serde_json::Value;

use voicelink_core::convert::ParameterValue;
use voicelink_core::item::Item;
use voicelink_core::ParameterType;

use crate::kind::PropertyKind;
use crate::param;
use crate::behavior::{PropertyBehavior, PropertyContext};
use crate::property::{Property, ValueMap};

const PARAMETERS: &[(&str, ParameterType)] = &[
    (param::INVERTED, ParameterType::Boolean),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

/// Shared behavior for two-valued kinds.
pub struct BinaryState {
    kind: PropertyKind,
    values: &'static [&'static str],
    item_types: &'static [&'static str],
    tags: &'static [&'static str],
    read_only: bool,
}

pub static POWER_STATE: BinaryState = BinaryState {
    kind: PropertyKind::PowerState,
    values: &["ON", "OFF"],
    item_types: &["Switch", "Dimmer", "Color"],
    tags: &[],
    read_only: false,
};

pub static TOGGLE_STATE: BinaryState = BinaryState {
    kind: PropertyKind::ToggleState,
    values: &["ON", "OFF"],
    item_types: &["Switch", "Number", "String"],
    tags: &[],
    read_only: false,
};

pub static MUTE_STATE: BinaryState = BinaryState {
    kind: PropertyKind::MuteState,
    values: &["MUTED", "UNMUTED"],
    item_types: &["Switch", "Dimmer"],
    tags: &[],
    read_only: false,
};

pub static NETWORK_ACCESS: BinaryState = BinaryState {
    kind: PropertyKind::NetworkAccess,
    values: &["ALLOWED", "BLOCKED"],
    item_types: &["Switch"],
    tags: &[],
    read_only: false,
};

pub static OPEN_STATE: BinaryState = BinaryState {
    kind: PropertyKind::OpenState,
    values: &["OPEN", "CLOSED"],
    item_types: &["Switch", "Contact", "Rollershutter", "String"],
    tags: &["sensor"],
    read_only: false,
};

pub static CONNECTIVITY: BinaryState = BinaryState {
    kind: PropertyKind::Connectivity,
    values: &["CONNECTED", "DISCONNECTED"],
    item_types: &["Switch", "Contact"],
    tags: &[],
    read_only: true,
};

pub static CONTACT_DETECTION: BinaryState = BinaryState {
    kind: PropertyKind::ContactDetection,
    values: &["DETECTED", "NOT_DETECTED"],
    item_types: &["Contact", "Switch"],
    tags: &[],
    read_only: true,
};

pub static MOTION_DETECTION: BinaryState = BinaryState {
    kind: PropertyKind::MotionDetection,
    values: &["DETECTED", "NOT_DETECTED"],
    item_types: &["Contact", "Switch"],
    tags: &[],
    read_only: true,
};

const SCENE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTS_DEACTIVATION, ParameterType::Boolean),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
    (param::CAPABILITY_NAMES, ParameterType::List),
];

/// Scene activation on a switch: command-shaped and stateless by default,
/// with deactivation optionally disabled.
pub struct SceneActivation;

pub static SCENE: SceneActivation = SceneActivation;

impl PropertyBehavior for SceneActivation {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Scene
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Switch"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        SCENE_PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        &["ACTIVATE", "DEACTIVATE"]
    }

    fn default_value_map(&self, _property: &Property) -> ValueMap {
        ValueMap::from_iter([("ACTIVATE", "ON"), ("DEACTIVATE", "OFF")])
    }

    fn derive_parameters(
        &self,
        property: &mut Property,
        _item: &Item,
        _ctx: &PropertyContext<'_>,
    ) {
        // Activating a scene leaves nothing to read back.
        if property.parameter(param::RETRIEVABLE).is_none() {
            property.set_parameter(param::RETRIEVABLE, ParameterValue::Boolean(false));
        }
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let value = value.as_str()?;
        if value == "DEACTIVATE" && !property.bool_parameter(param::SUPPORTS_DEACTIVATION, true) {
            return None;
        }
        property.value_map().command(value).map(str::to_string)
    }
}

impl BinaryState {
    /// Read-only ALARM/OK sensor over a contact or switch.
    pub(crate) const fn alarm(kind: PropertyKind) -> Self {
        BinaryState {
            kind,
            values: &["ALARM", "OK"],
            item_types: &["Contact", "Switch"],
            tags: &[],
            read_only: true,
        }
    }

    /// Raw hub vocabulary for the bound item type, before inversion.
    fn raw_pair(&self, property: &Property) -> (&'static str, &'static str) {
        match property.item().item_type.base_name() {
            "Switch" | "Dimmer" | "Color" => ("ON", "OFF"),
            "Contact" => ("OPEN", "CLOSED"),
            "Rollershutter" => ("UP:0", "DOWN:100"),
            "Number" => ("1", "0"),
            // String items map onto the external symbols themselves.
            _ => (self.values[0], self.values[1]),
        }
    }

    /// Threshold read for items reporting numeric state.
    fn numeric_state(&self, property: &Property, raw: &str) -> Option<Value> {
        let base = property.item().item_type.base_name();
        if !matches!(base, "Dimmer" | "Color" | "Rollershutter") {
            return None;
        }
        // Color items report "hue,saturation,brightness"; the level is last.
        let level: f64 = raw.rsplit(',').next()?.trim().parse().ok()?;
        let active = match base {
            "Rollershutter" => level == 0.0,
            _ => level > 0.0,
        };
        let active = active != property.is_inverted(false);
        let value = if active { self.values[0] } else { self.values[1] };
        Some(Value::String(value.to_string()))
    }
}

impl PropertyBehavior for BinaryState {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        self.item_types
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        self.values
    }

    fn supported_tags(&self) -> &'static [&'static str] {
        self.tags
    }

    fn default_value_map(&self, property: &Property) -> ValueMap {
        let (first, second) = self.raw_pair(property);
        let mut map = ValueMap::new();
        if property.is_inverted(false) {
            map.insert(self.values[0], second);
            map.insert(self.values[1], first);
        } else {
            map.insert(self.values[0], first);
            map.insert(self.values[1], second);
        }
        map
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        if self.read_only {
            return None;
        }
        let value = value.as_str()?;
        property.value_map().command(value).map(str::to_string)
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        self.numeric_state(property, raw).or_else(|| {
            property
                .value_map()
                .state(raw)
                .map(|v| Value::String(v.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voicelink_core::item::{Item, ItemType, MetadataEntry};
    use voicelink_core::{AssetCatalog, Settings};

    use crate::behavior::PropertyContext;

    fn derive(kind: PropertyKind, item_type: ItemType, config: serde_json::Value) -> Property {
        let settings = Settings::default();
        let catalog = AssetCatalog::new();
        let ctx = PropertyContext::new(&settings, &catalog);
        let item = Item::new("item1", item_type);
        let mut metadata = MetadataEntry::new(kind.as_str());
        if let Value::Object(map) = config {
            metadata.config = map;
        }
        Property::derive(kind, &item, &metadata, None, None, &ctx).unwrap()
    }

    #[test]
    fn test_switch_round_trip() {
        let property = derive(PropertyKind::PowerState, ItemType::Switch, json!({}));
        assert_eq!(property.get_command(&json!("ON")), Some("ON".into()));
        assert_eq!(property.get_state("OFF"), Some(json!("OFF")));
    }

    #[test]
    fn test_inverted_flips_both_directions() {
        let property = derive(
            PropertyKind::OpenState,
            ItemType::Switch,
            json!({"inverted": true}),
        );
        assert_eq!(property.get_command(&json!("OPEN")), Some("OFF".into()));
        assert_eq!(property.get_state("OFF"), Some(json!("OPEN")));
        // Inversion symmetry: command(state(x)) == x for raw values.
        for raw in ["ON", "OFF"] {
            let external = property.get_state(raw).unwrap();
            assert_eq!(property.get_command(&external), Some(raw.into()));
        }
    }

    #[test]
    fn test_contact_vocabulary() {
        let property = derive(PropertyKind::ContactDetection, ItemType::Contact, json!({}));
        assert_eq!(property.get_state("OPEN"), Some(json!("DETECTED")));
        assert_eq!(property.get_state("CLOSED"), Some(json!("NOT_DETECTED")));
    }

    #[test]
    fn test_read_only_kind_has_no_commands() {
        let property = derive(PropertyKind::ContactDetection, ItemType::Contact, json!({}));
        assert_eq!(property.get_command(&json!("DETECTED")), None);
    }

    #[test]
    fn test_dimmer_reads_through_threshold() {
        let property = derive(PropertyKind::PowerState, ItemType::Dimmer, json!({}));
        assert_eq!(property.get_state("40"), Some(json!("ON")));
        assert_eq!(property.get_state("0"), Some(json!("OFF")));
        assert_eq!(property.get_command(&json!("ON")), Some("ON".into()));
    }

    #[test]
    fn test_color_reads_brightness_component() {
        let property = derive(PropertyKind::PowerState, ItemType::Color, json!({}));
        assert_eq!(property.get_state("120,50,75"), Some(json!("ON")));
        assert_eq!(property.get_state("120,50,0"), Some(json!("OFF")));
    }

    #[test]
    fn test_scene_deactivation_gate() {
        let property = derive(PropertyKind::Scene, ItemType::Switch, json!({}));
        assert_eq!(property.get_command(&json!("ACTIVATE")), Some("ON".into()));
        assert!(!property.is_retrievable());

        let gated = derive(
            PropertyKind::Scene,
            ItemType::Switch,
            json!({"supportsDeactivation": false}),
        );
        assert_eq!(gated.get_command(&json!("DEACTIVATE")), None);
        assert_eq!(gated.get_command(&json!("ACTIVATE")), Some("ON".into()));
    }

    #[test]
    fn test_rollershutter_alternates() {
        let property = derive(PropertyKind::OpenState, ItemType::Rollershutter, json!({}));
        assert_eq!(property.get_command(&json!("OPEN")), Some("UP".into()));
        assert_eq!(property.get_command(&json!("CLOSED")), Some("DOWN".into()));
        assert_eq!(property.get_state("0"), Some(json!("OPEN")));
        assert_eq!(property.get_state("100"), Some(json!("CLOSED")));
        assert_eq!(property.get_state("35"), Some(json!("CLOSED")));
    }
}
