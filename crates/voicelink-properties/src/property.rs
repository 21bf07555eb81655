//! Property contract.
//!
//! A property is one kind bound to one item snapshot, together with its
//! converted parameters and derived value map. Instances are built fresh per
//! request; there is no cached or shared state between invocations.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use voicelink_core::catalog::Resources;
use voicelink_core::convert::{self, ParameterValue};
use voicelink_core::item::{Item, ItemType, MetadataEntry};
use voicelink_core::semantics::Semantics;

use crate::behavior::{item_type_matches, PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::param;
use crate::registry;

/// Bidirectional dictionary between external values and raw hub values.
///
/// Raw values may carry colon-joined alternates: any alternate matches on
/// read, the first is used on write. Entry order is preserved; the first entry
/// for a key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap(Vec<(String, String)>);

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping unless the external value is already mapped.
    pub fn insert(&mut self, external: impl Into<String>, raw: impl Into<String>) -> bool {
        let external = external.into();
        if self.0.iter().any(|(k, _)| *k == external) {
            return false;
        }
        self.0.push((external, raw.into()));
        true
    }

    /// Raw hub command for an external value: the first alternate.
    pub fn command(&self, external: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == external)
            .and_then(|(_, raw)| raw.split(':').next())
    }

    /// External value for a raw hub state: the first key whose alternate list
    /// contains the state.
    pub fn state(&self, raw: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, alternates)| alternates.split(':').any(|a| a == raw))
            .map(|(k, _)| k.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Whether every listed external value is mapped.
    pub fn covers(&self, values: &[String]) -> bool {
        values.iter().all(|v| self.0.iter().any(|(k, _)| k == v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(&'static str, &'static str)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Item snapshot retained on a property: name, effective type and the state
/// observed when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRef {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(skip)]
    pub state: Option<String>,
}

impl ItemRef {
    /// Snapshot state parsed as a number, stripping a trailing unit symbol.
    pub fn numeric_state(&self) -> Option<f64> {
        self.state.as_deref()?.split_whitespace().next()?.parse().ok()
    }
}

/// One property kind bound to one item.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    name: PropertyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    parameters: BTreeMap<String, ParameterValue>,
    item: ItemRef,
}

impl Property {
    /// Instantiate and run the construction checks shared by both build
    /// paths. Returns `None` when the component or item-type gates fail;
    /// an inapplicable property is a non-value, not an error.
    fn new(
        kind: PropertyKind,
        item: ItemRef,
        component: Option<&str>,
        tag: Option<&str>,
    ) -> Option<Self> {
        let behavior = registry::behavior(kind);

        // Component and tag are retained only if the kind declares them.
        let component = component
            .filter(|c| {
                behavior
                    .required_components()
                    .iter()
                    .any(|rc| rc.eq_ignore_ascii_case(c))
            })
            .map(|c| c.to_lowercase());
        let tag = tag
            .filter(|t| {
                behavior
                    .supported_tags()
                    .iter()
                    .any(|st| st.eq_ignore_ascii_case(t))
            })
            .map(|t| t.to_lowercase());

        let property = Self {
            name: kind,
            component,
            tag,
            parameters: BTreeMap::new(),
            item,
        };
        if !property.has_required_component() || !property.has_supported_item_type() {
            debug!(kind = %kind, item = %property.item.name, "Rejecting inapplicable property");
            return None;
        }
        Some(property)
    }

    /// Build a property on the discovery path: parameters are derived from
    /// live item metadata, applying kind defaults and sibling lookups.
    pub fn derive(
        kind: PropertyKind,
        item: &Item,
        metadata: &MetadataEntry,
        component: Option<&str>,
        tag: Option<&str>,
        ctx: &PropertyContext<'_>,
    ) -> Option<Self> {
        // The undefined-state sentinels never enter the snapshot.
        let item_ref = ItemRef {
            name: item.name.clone(),
            item_type: item.effective_type().clone(),
            state: item.defined_state().map(str::to_string),
        };
        let mut property = Self::new(kind, item_ref, component, tag)?;
        property.update_parameters(item, metadata, ctx);
        Some(property)
    }

    /// Build a property on the directive path: parameters are rehydrated from
    /// a previously serialized capability record, with type coercion only.
    pub fn normalize(
        kind: PropertyKind,
        item_name: &str,
        item_type: &str,
        component: Option<&str>,
        tag: Option<&str>,
        parameters: &serde_json::Map<String, Value>,
    ) -> Option<Self> {
        let item_type = ItemType::parse(item_type)?;
        let item_ref = ItemRef {
            name: item_name.to_string(),
            item_type,
            state: None,
        };
        let mut property = Self::new(kind, item_ref, component, tag)?;
        property.normalize_parameters(parameters);
        Some(property)
    }

    pub fn kind(&self) -> PropertyKind {
        self.name
    }

    /// Wire-stable property name.
    pub fn name(&self) -> &'static str {
        self.name.as_str()
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    pub fn behavior(&self) -> &'static dyn PropertyBehavior {
        registry::behavior(self.name)
    }

    // Parameter access

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.parameters.insert(name.into(), value);
    }

    pub fn remove_parameter(&mut self, name: &str) -> Option<ParameterValue> {
        self.parameters.remove(name)
    }

    pub fn bool_parameter(&self, name: &str, default: bool) -> bool {
        self.parameter(name)
            .and_then(ParameterValue::as_bool)
            .unwrap_or(default)
    }

    /// Whether read-back through `get_state` is allowed. Defaults to true
    /// unless explicitly disabled.
    pub fn is_retrievable(&self) -> bool {
        self.bool_parameter(param::RETRIEVABLE, true)
    }

    pub fn is_proactively_reported(&self) -> bool {
        self.bool_parameter(param::PROACTIVELY_REPORTED, false)
    }

    /// Reportable means the property surfaces state at all, by push or poll.
    pub fn is_reportable(&self) -> bool {
        self.is_proactively_reported() || self.is_retrievable()
    }

    pub fn is_inverted(&self, default: bool) -> bool {
        self.bool_parameter(param::INVERTED, default)
    }

    // Eligibility predicates, combined by the discovery assembler.

    pub fn has_required_component(&self) -> bool {
        self.behavior().required_components().is_empty() || self.component.is_some()
    }

    pub fn has_supported_item_type(&self) -> bool {
        self.behavior()
            .supported_item_types()
            .iter()
            .any(|declared| item_type_matches(declared, &self.item.item_type))
    }

    pub fn has_supported_values_mapped(&self) -> bool {
        let values = self.supported_values();
        values.is_empty() || self.value_map().covers(&values)
    }

    /// Whether every linked property this one depends on is declared.
    ///
    /// A tagged (decoupled) property additionally requires its untagged
    /// counterpart of the same kind and component.
    pub fn has_required_linked_properties(&self, siblings: &[Property]) -> bool {
        let mut required: Vec<PropertyKind> =
            self.behavior().required_linked_properties().to_vec();
        if self.tag.is_some() {
            required.push(self.name);
        }
        required.iter().all(|kind| {
            siblings.iter().any(|p| {
                p.kind() == *kind && p.component() == self.component() && p.tag().is_none()
            })
        })
    }

    pub fn is_valid(&self) -> bool {
        self.behavior().is_valid(self)
    }

    // Value mapping

    /// Effective supported values for this bound property.
    pub fn supported_values(&self) -> Vec<String> {
        self.behavior().supported_values_for(self)
    }

    /// Composed value map: explicit user entries override the kind default.
    pub fn value_map(&self) -> ValueMap {
        let mut user = ValueMap::new();
        for value in self.behavior().supported_values() {
            if let Some(ParameterValue::String(raw)) = self.parameter(value) {
                user.insert(*value, raw.clone());
            }
        }
        if !user.is_empty() {
            user
        } else {
            self.behavior().default_value_map(self)
        }
    }

    /// Hub command for an external property value.
    pub fn get_command(&self, value: &Value) -> Option<String> {
        self.behavior().command_for(self, value)
    }

    /// Hub command for a relative adjustment, where the kind supports it.
    pub fn get_adjust_command(&self, delta: f64) -> Option<String> {
        self.behavior().adjust_for(self, delta)
    }

    /// External property value for a raw hub state.
    pub fn get_state(&self, raw: &str) -> Option<Value> {
        self.behavior().state_for(self, raw)
    }

    // Output artifacts

    pub fn configuration(&self, ctx: &PropertyContext<'_>) -> Option<Value> {
        self.behavior().configuration(self, ctx)
    }

    pub fn resources(&self, ctx: &PropertyContext<'_>) -> Option<Resources> {
        self.behavior().resources(self, ctx)
    }

    pub fn semantics(&self) -> Option<Semantics> {
        self.behavior().semantics(self)
    }

    // Parameter derivation

    /// Derive parameters afresh from metadata configuration: alias-resolved
    /// and type-converted entries, the retrievability default inferred from
    /// the item's auto-update setting, then kind-specific derived defaults.
    fn update_parameters(
        &mut self,
        item: &Item,
        metadata: &MetadataEntry,
        ctx: &PropertyContext<'_>,
    ) {
        for (key, raw) in &metadata.config {
            self.store_parameter(key, raw);
        }
        if !self.parameters.contains_key(param::RETRIEVABLE) && !item.auto_update() {
            self.parameters
                .insert(param::RETRIEVABLE.into(), ParameterValue::Boolean(false));
        }
        self.behavior().derive_parameters(self, item, ctx);
    }

    /// Rehydrate previously serialized parameters: alias resolution and type
    /// coercion only, no default derivation.
    fn normalize_parameters(&mut self, parameters: &serde_json::Map<String, Value>) {
        for (key, raw) in parameters {
            self.store_parameter(key, raw);
        }
    }

    /// Convert one raw configuration entry through its declared or aliased
    /// type. Unknown names and failed conversions are dropped, never errors.
    fn store_parameter(&mut self, key: &str, raw: &Value) {
        let behavior = self.behavior();
        let canonical = behavior
            .parameter_aliases()
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(key);

        let declared = behavior
            .supported_parameters()
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, ty)| *ty)
            .or_else(|| {
                behavior
                    .supported_values()
                    .contains(&canonical)
                    .then_some(voicelink_core::ParameterType::String)
            });

        let Some(declared) = declared else {
            debug!(kind = %self.name, parameter = key, "Ignoring unsupported parameter");
            return;
        };
        match convert::convert(raw, declared) {
            Some(value) => {
                self.parameters.insert(canonical.to_string(), value);
            }
            None => {
                warn!(kind = %self.name, parameter = key, "Dropping unconvertible parameter");
            }
        }
    }
}
