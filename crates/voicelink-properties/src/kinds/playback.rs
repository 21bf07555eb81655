//! Media playback kinds on player items.

use serde_json::Value;

use voicelink_core::convert::ParameterValue;
use voicelink_core::item::Item;
use voicelink_core::ParameterType;

use crate::behavior::{PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::param;
use crate::property::{Property, ValueMap};

const STATE_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

/// Reported playback state, read-only.
pub struct PlaybackState;

pub static PLAYBACK_STATE: PlaybackState = PlaybackState;

impl PropertyBehavior for PlaybackState {
    fn kind(&self) -> PropertyKind {
        PropertyKind::PlaybackState
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Player"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        STATE_PARAMETERS
    }

    fn supported_values(&self) -> &'static [&'static str] {
        &["PLAYING", "PAUSED", "STOPPED"]
    }

    /// Player items report PLAY or PAUSE only; a stopped player still reads
    /// back as paused.
    fn default_value_map(&self, _property: &Property) -> ValueMap {
        ValueMap::from_iter([("PLAYING", "PLAY"), ("PAUSED", "PAUSE"), ("STOPPED", "PAUSE")])
    }

    fn command_for(&self, _property: &Property, _value: &Value) -> Option<String> {
        None
    }
}

const ACTION_PARAMETERS: &[(&str, ParameterType)] = &[
    (param::SUPPORTED_OPERATIONS, ParameterType::List),
    (param::RETRIEVABLE, ParameterType::Boolean),
    (param::PROACTIVELY_REPORTED, ParameterType::Boolean),
];

/// External playback operations and the player command each one issues.
const OPERATIONS: &[(&str, &str)] = &[
    ("Play", "PLAY"),
    ("Pause", "PAUSE"),
    ("Stop", "PAUSE"),
    ("Next", "NEXT"),
    ("Previous", "PREVIOUS"),
    ("FastForward", "FASTFORWARD"),
    ("Rewind", "REWIND"),
];

const DEFAULT_OPERATIONS: &[&str] =
    &["Play", "Pause", "Next", "Previous", "FastForward", "Rewind"];

/// Playback transport control, command-only.
pub struct PlaybackAction;

pub static PLAYBACK_ACTION: PlaybackAction = PlaybackAction;

impl PlaybackAction {
    fn operations(property: &Property) -> Vec<String> {
        property
            .parameter(param::SUPPORTED_OPERATIONS)
            .and_then(ParameterValue::as_list)
            .map(|listed| {
                OPERATIONS
                    .iter()
                    .filter(|(name, _)| listed.iter().any(|l| l.eq_ignore_ascii_case(name)))
                    .map(|(name, _)| (*name).to_string())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_OPERATIONS.iter().map(|o| (*o).to_string()).collect())
    }
}

impl PropertyBehavior for PlaybackAction {
    fn kind(&self) -> PropertyKind {
        PropertyKind::PlaybackAction
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["Player"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        ACTION_PARAMETERS
    }

    fn supported_values_for(&self, property: &Property) -> Vec<String> {
        Self::operations(property)
    }

    fn derive_parameters(&self, property: &mut Property, _item: &Item, _ctx: &PropertyContext<'_>) {
        // Transport commands have no readable state of their own.
        property.set_parameter(param::RETRIEVABLE, ParameterValue::Boolean(false));
    }

    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        let operation = value.as_str()?;
        if !Self::operations(property)
            .iter()
            .any(|o| o.eq_ignore_ascii_case(operation))
        {
            return None;
        }
        OPERATIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(operation))
            .map(|(_, command)| (*command).to_string())
    }

    fn state_for(&self, _property: &Property, _raw: &str) -> Option<Value> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voicelink_core::item::{ItemType, MetadataEntry};
    use voicelink_core::{AssetCatalog, Settings};

    fn derive(kind: PropertyKind, config: serde_json::Value) -> Property {
        let settings = Settings::default();
        let catalog = AssetCatalog::new();
        let ctx = PropertyContext::new(&settings, &catalog);
        let item = Item::new("player", ItemType::Player);
        let mut metadata = MetadataEntry::new(kind.as_str());
        if let Value::Object(map) = config {
            metadata.config = map;
        }
        Property::derive(kind, &item, &metadata, None, None, &ctx).unwrap()
    }

    #[test]
    fn test_state_reads_play_pause() {
        let property = derive(PropertyKind::PlaybackState, json!({}));
        assert_eq!(property.get_state("PLAY"), Some(json!("PLAYING")));
        assert_eq!(property.get_state("PAUSE"), Some(json!("PAUSED")));
        assert_eq!(property.get_command(&json!("PLAYING")), None);
    }

    #[test]
    fn test_action_default_operations() {
        let property = derive(PropertyKind::PlaybackAction, json!({}));
        assert_eq!(property.get_command(&json!("Play")), Some("PLAY".into()));
        assert_eq!(property.get_command(&json!("Rewind")), Some("REWIND".into()));
        assert_eq!(property.get_command(&json!("Stop")), None);
        assert!(!property.is_retrievable());
    }

    #[test]
    fn test_action_restricted_operations() {
        let property = derive(
            PropertyKind::PlaybackAction,
            json!({"supportedOperations": "Play,Pause,Stop"}),
        );
        assert_eq!(property.supported_values(), ["Play", "Pause", "Stop"]);
        assert_eq!(property.get_command(&json!("Stop")), Some("PAUSE".into()));
        assert_eq!(property.get_command(&json!("Next")), None);
    }
}
