//! Kind behavior contract.
//!
//! Every property kind supplies one implementation of [`PropertyBehavior`].
//! The trait replaces the deep inheritance chains of a classic class design
//! with a flat set of capability facts and pure mapping functions dispatched
//! through the registry; kind-specific state lives in the property's
//! parameters, never in the behavior itself.

use serde_json::Value;

use voicelink_core::catalog::{self, AssetCatalog, ResourceType, Resources};
use voicelink_core::item::{Item, ItemType};
use voicelink_core::semantics::Semantics;
use voicelink_core::{ParameterType, Settings};

use crate::kind::PropertyKind;
use crate::param;
use crate::property::{Property, ValueMap};

/// Shared lookup context handed into derivation and output resolution.
///
/// `siblings` holds the properties already built for the same endpoint, in
/// original declaration order; cross-property defaults must resolve ties by
/// taking the first match.
pub struct PropertyContext<'a> {
    pub settings: &'a Settings,
    pub catalog: &'a AssetCatalog,
    pub siblings: &'a [Property],
}

impl<'a> PropertyContext<'a> {
    pub fn new(settings: &'a Settings, catalog: &'a AssetCatalog) -> Self {
        Self {
            settings,
            catalog,
            siblings: &[],
        }
    }

    pub fn with_siblings(mut self, siblings: &'a [Property]) -> Self {
        self.siblings = siblings;
        self
    }

    /// First sibling of the given kind, in declaration order.
    pub fn sibling(&self, kind: PropertyKind) -> Option<&'a Property> {
        self.siblings.iter().find(|p| p.kind() == kind)
    }
}

/// Behavior contract implemented once per property kind.
pub trait PropertyBehavior: Send + Sync {
    /// The kind this behavior implements.
    fn kind(&self) -> PropertyKind;

    /// Item type declarations this kind can bind to (`"Switch"`,
    /// `"Number:Temperature"`, ...).
    fn supported_item_types(&self) -> &'static [&'static str];

    /// Declared parameters and their conversion types.
    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)];

    /// Alternate parameter spellings, alias to canonical name.
    fn parameter_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Externally supported enumerated values, if fixed.
    fn supported_values(&self) -> &'static [&'static str] {
        &[]
    }

    /// Tags this kind accepts for decoupled sensor/target pairs.
    fn supported_tags(&self) -> &'static [&'static str] {
        &[]
    }

    /// Sub-component names this kind requires, if any.
    fn required_components(&self) -> &'static [&'static str] {
        &[]
    }

    /// Kinds that must also be declared on the same endpoint for this
    /// property to be usable.
    fn required_linked_properties(&self) -> &'static [PropertyKind] {
        &[]
    }

    /// Effective supported values for one bound property. Kinds whose value
    /// vocabulary depends on configuration override this to report the
    /// actually mapped values.
    fn supported_values_for(&self, _property: &Property) -> Vec<String> {
        self.supported_values()
            .iter()
            .map(|v| (*v).to_string())
            .collect()
    }

    /// Kind default value map for the bound item type.
    fn default_value_map(&self, _property: &Property) -> ValueMap {
        ValueMap::new()
    }

    /// Kind-specific validity gate on top of the generic eligibility checks.
    fn is_valid(&self, _property: &Property) -> bool {
        true
    }

    /// Compute derived parameter defaults from the live item snapshot.
    /// Invoked on the discovery path only, after metadata conversion.
    fn derive_parameters(
        &self,
        _property: &mut Property,
        _item: &Item,
        _ctx: &PropertyContext<'_>,
    ) {
    }

    /// Translate an external property value into a hub command.
    fn command_for(&self, property: &Property, value: &Value) -> Option<String> {
        property
            .value_map()
            .command(&value_to_string(value)?)
            .map(str::to_string)
    }

    /// Translate a relative adjustment into a hub command, for kinds that
    /// support delta directives.
    fn adjust_for(&self, _property: &Property, _delta: f64) -> Option<String> {
        None
    }

    /// Translate a raw hub state into an external property value.
    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        property
            .value_map()
            .state(raw)
            .map(|v| Value::String(v.to_string()))
    }

    /// Resolved configuration block (ranges, presets, supported values) for
    /// the discovery output.
    fn configuration(&self, _property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        None
    }

    /// Resolved friendly-name resources. The default expands the
    /// `capabilityNames` parameter with the capability reserved-word list.
    fn resources(&self, property: &Property, ctx: &PropertyContext<'_>) -> Option<Resources> {
        let labels = property.parameter(param::CAPABILITY_NAMES)?.as_list()?;
        let resolved = catalog::resources(
            labels,
            resource_language(property, ctx),
            ResourceType::Capability,
            ctx.catalog,
        );
        (!resolved.is_empty()).then_some(resolved)
    }

    /// Resolved semantics block, for kinds with action/state mapping config.
    fn semantics(&self, _property: &Property) -> Option<Semantics> {
        None
    }
}

/// Language used to resolve a property's resources: the `language` parameter
/// when configured, the regional default otherwise.
pub fn resource_language<'a>(property: &'a Property, ctx: &PropertyContext<'a>) -> &'a str {
    property
        .parameter(param::LANGUAGE)
        .and_then(|value| value.as_str())
        .unwrap_or(&ctx.settings.regional.language)
}

/// Whether an item type satisfies a supported-type declaration.
///
/// A dimensioned declaration (`Number:Temperature`) requires the same
/// dimension; a bare `Number` accepts any numeric item.
pub fn item_type_matches(declared: &str, actual: &ItemType) -> bool {
    match ItemType::parse(declared) {
        Some(ItemType::Number(Some(dimension))) => {
            matches!(actual, ItemType::Number(Some(d)) if *d == dimension)
        }
        Some(declared) => declared.matches(actual),
        None => false,
    }
}

/// Render an external scalar value the way the hub expects it in text form.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicelink_core::item::Dimension;

    #[test]
    fn test_item_type_matching() {
        assert!(item_type_matches("Switch", &ItemType::Switch));
        assert!(item_type_matches(
            "Number",
            &ItemType::Number(Some(Dimension::Temperature))
        ));
        assert!(item_type_matches(
            "Number:Temperature",
            &ItemType::Number(Some(Dimension::Temperature))
        ));
        assert!(!item_type_matches(
            "Number:Temperature",
            &ItemType::Number(None)
        ));
        assert!(!item_type_matches("Switch", &ItemType::Dimmer));
        assert!(!item_type_matches("Bogus", &ItemType::Switch));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&Value::from("ON")), Some("ON".into()));
        assert_eq!(value_to_string(&Value::from(42)), Some("42".into()));
        assert_eq!(value_to_string(&Value::Null), None);
    }
}
