//! Hub item model.
//!
//! An item is one data point exposed by the home-automation hub: a typed value
//! with a free-form metadata bag attached by the user. The engine only ever
//! sees a point-in-time snapshot of an item; nothing here is live.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State values the hub reports when an item has no usable state.
pub const STATE_NULL: &str = "NULL";
pub const STATE_UNDEF: &str = "UNDEF";

/// Physical dimension attached to numeric item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Angle,
    Dimensionless,
    Energy,
    Length,
    Mass,
    Power,
    Pressure,
    Speed,
    Temperature,
    Volume,
}

impl FromStr for Dimension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Angle" => Ok(Self::Angle),
            "Dimensionless" => Ok(Self::Dimensionless),
            "Energy" => Ok(Self::Energy),
            "Length" => Ok(Self::Length),
            "Mass" => Ok(Self::Mass),
            "Power" => Ok(Self::Power),
            "Pressure" => Ok(Self::Pressure),
            "Speed" => Ok(Self::Speed),
            "Temperature" => Ok(Self::Temperature),
            "Volume" => Ok(Self::Volume),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Angle => "Angle",
            Self::Dimensionless => "Dimensionless",
            Self::Energy => "Energy",
            Self::Length => "Length",
            Self::Mass => "Mass",
            Self::Power => "Power",
            Self::Pressure => "Pressure",
            Self::Speed => "Speed",
            Self::Temperature => "Temperature",
            Self::Volume => "Volume",
        };
        write!(f, "{}", name)
    }
}

/// Item type classification.
///
/// Numeric items optionally carry a physical dimension (`Number:Temperature`),
/// group items optionally carry a member type (`Group:Dimmer`). Serializes as
/// the hub's type declaration string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemType {
    Color,
    Contact,
    DateTime,
    Dimmer,
    Group(Option<Box<ItemType>>),
    Location,
    Number(Option<Dimension>),
    Player,
    Rollershutter,
    String,
    Switch,
}

impl ItemType {
    /// Parse a hub type declaration such as `"Switch"`, `"Number:Temperature"`
    /// or `"Group:Dimmer"`. Unknown declarations yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let (base, qualifier) = match s.split_once(':') {
            Some((b, q)) => (b, Some(q)),
            None => (s, None),
        };
        match base {
            "Color" => Some(Self::Color),
            "Contact" => Some(Self::Contact),
            "DateTime" => Some(Self::DateTime),
            "Dimmer" => Some(Self::Dimmer),
            "Location" => Some(Self::Location),
            "Player" => Some(Self::Player),
            "Rollershutter" => Some(Self::Rollershutter),
            "String" => Some(Self::String),
            "Switch" => Some(Self::Switch),
            "Number" => Some(Self::Number(
                qualifier.and_then(|q| Dimension::from_str(q).ok()),
            )),
            "Group" => Some(Self::Group(
                qualifier.and_then(ItemType::parse).map(Box::new),
            )),
            _ => None,
        }
    }

    /// Base type name without dimension or member qualifier.
    pub fn base_name(&self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Contact => "Contact",
            Self::DateTime => "DateTime",
            Self::Dimmer => "Dimmer",
            Self::Group(_) => "Group",
            Self::Location => "Location",
            Self::Number(_) => "Number",
            Self::Player => "Player",
            Self::Rollershutter => "Rollershutter",
            Self::String => "String",
            Self::Switch => "Switch",
        }
    }

    /// Numeric dimension, if this is a dimensioned number type.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::Number(d) => *d,
            Self::Group(Some(member)) => member.dimension(),
            _ => None,
        }
    }

    /// Whether two types match at the base level, ignoring dimensions.
    pub fn matches(&self, other: &ItemType) -> bool {
        self.base_name() == other.base_name()
    }

    /// Whether this type reports percent-oriented numeric state.
    pub fn is_percent_based(&self) -> bool {
        matches!(self, Self::Dimmer | Self::Rollershutter)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(Some(d)) => write!(f, "Number:{}", d),
            Self::Group(Some(member)) => write!(f, "Group:{}", member),
            other => write!(f, "{}", other.base_name()),
        }
    }
}

impl Serialize for ItemType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let declaration = String::deserialize(deserializer)?;
        ItemType::parse(&declaration).ok_or_else(|| {
            serde::de::Error::custom(format!("Unknown item type: {}", declaration))
        })
    }
}

/// A selectable option advertised by an item's state description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Constraints and rendering hints the hub attaches to an item's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<StateOption>,
}

/// One metadata namespace entry on an item: a value plus nested configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, Value>,
}

impl MetadataEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            config: serde_json::Map::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Point-in-time snapshot of a hub item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier, unique within the hub.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Current state as reported by the hub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Unit symbol configured on the item, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// State constraints and rendering hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<StateDescription>,
    /// Names of groups this item belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_names: Vec<String>,
    /// Metadata bag, keyed by namespace.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, MetadataEntry>,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
            label: None,
            state: None,
            unit: None,
            state_description: None,
            group_names: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Effective type for mapping purposes: the member type for groups.
    pub fn effective_type(&self) -> &ItemType {
        match &self.item_type {
            ItemType::Group(Some(member)) => member,
            other => other,
        }
    }

    /// Defined state, filtering the hub's undefined sentinels.
    pub fn defined_state(&self) -> Option<&str> {
        match self.state.as_deref() {
            Some(STATE_NULL) | Some(STATE_UNDEF) | None => None,
            Some(s) => Some(s),
        }
    }

    /// Metadata entry for a namespace.
    pub fn metadata(&self, namespace: &str) -> Option<&MetadataEntry> {
        self.metadata.get(namespace)
    }

    /// Whether the hub auto-updates this item's state on command.
    ///
    /// Defaults to true; an explicit `autoupdate` namespace set to `"false"`
    /// disables it, which makes derived properties non-retrievable by default.
    pub fn auto_update(&self) -> bool {
        self.metadata("autoupdate")
            .map(|entry| !entry.value.eq_ignore_ascii_case("false"))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_parsing() {
        assert_eq!(ItemType::parse("Switch"), Some(ItemType::Switch));
        assert_eq!(
            ItemType::parse("Number:Temperature"),
            Some(ItemType::Number(Some(Dimension::Temperature)))
        );
        assert_eq!(ItemType::parse("Number"), Some(ItemType::Number(None)));
        assert_eq!(
            ItemType::parse("Group:Dimmer"),
            Some(ItemType::Group(Some(Box::new(ItemType::Dimmer))))
        );
        assert_eq!(ItemType::parse("Unknown"), None);
    }

    #[test]
    fn test_item_type_display_round_trip() {
        for decl in ["Switch", "Number:Temperature", "Group:Rollershutter", "Color"] {
            let parsed = ItemType::parse(decl).unwrap();
            assert_eq!(parsed.to_string(), decl);
        }
    }

    #[test]
    fn test_effective_type_unwraps_group_member() {
        let item = Item::new(
            "gLight",
            ItemType::Group(Some(Box::new(ItemType::Dimmer))),
        );
        assert_eq!(item.effective_type(), &ItemType::Dimmer);

        let plain = Item::new("light", ItemType::Switch);
        assert_eq!(plain.effective_type(), &ItemType::Switch);
    }

    #[test]
    fn test_defined_state_filters_sentinels() {
        let mut item = Item::new("sensor", ItemType::Number(None));
        assert_eq!(item.defined_state(), None);

        item.state = Some("NULL".into());
        assert_eq!(item.defined_state(), None);

        item.state = Some("UNDEF".into());
        assert_eq!(item.defined_state(), None);

        item.state = Some("21.5".into());
        assert_eq!(item.defined_state(), Some("21.5"));
    }

    #[test]
    fn test_auto_update_flag() {
        let mut item = Item::new("lock", ItemType::Switch);
        assert!(item.auto_update());

        item.metadata
            .insert("autoupdate".into(), MetadataEntry::new("false"));
        assert!(!item.auto_update());
    }
}
