//! Concrete property kinds.
//!
//! Each module defines the behavior structs for one family of kinds and the
//! static instances the registry dispatches to. Shared pieces of the
//! configuration grammar (label lists, delta notation) live here.

pub mod alarm;
pub mod binary;
pub mod camera;
pub mod color;
pub mod lock;
pub mod mode;
pub mod playback;
pub mod range;
pub mod thermostat;

use voicelink_core::catalog::{self, AssetCatalog, ResourceType};
use voicelink_core::convert::OrderedMap;
use tracing::warn;

/// Parse the relative-delta notation `"(±N)"` used in action mappings.
///
/// The sign is mandatory; anything else is an absolute value.
pub(crate) fn parse_delta(value: &str) -> Option<f64> {
    let inner = value.strip_prefix('(')?.strip_suffix(')')?;
    if inner.starts_with('+') || inner.starts_with('-') {
        inner.parse().ok()
    } else {
        None
    }
}

/// Expand one `key=label1:label2` entry into its label list.
///
/// A missing or empty value means the key itself is the label; an empty label
/// before the first colon reuses the key (`"Wash=:Quick"` yields
/// `["Wash", "Quick"]`); empty labels elsewhere are dropped.
pub(crate) fn entry_labels(key: &str, value: Option<&str>) -> Vec<String> {
    match value {
        None | Some("") => vec![key.to_string()],
        Some(value) => value
            .split(':')
            .enumerate()
            .filter_map(|(position, label)| {
                if label.is_empty() {
                    (position == 0).then(|| key.to_string())
                } else {
                    Some(label.to_string())
                }
            })
            .collect(),
    }
}

/// Resolve a labeled entry map (modes, presets) into per-key label lists.
///
/// Labels are validated against the catalog and deduplicated globally across
/// all entries, first occurrence wins; entries left without labels are
/// dropped. Entry order is preserved exactly.
pub(crate) fn resolve_labeled_entries(
    map: &OrderedMap,
    resource_type: ResourceType,
    catalog: &AssetCatalog,
) -> Vec<(String, Vec<String>)> {
    let mut claimed: Vec<String> = Vec::new();
    let mut resolved = Vec::new();

    for (key, value) in map.iter() {
        let mut labels = Vec::new();
        for label in entry_labels(key, value) {
            if !catalog::is_valid_label(&label, resource_type, catalog) {
                warn!(entry = key, %label, "Dropping invalid entry label");
                continue;
            }
            if claimed.contains(&label) {
                continue;
            }
            claimed.push(label.clone());
            labels.push(label);
        }
        if labels.is_empty() {
            warn!(entry = key, "Dropping entry with no usable labels");
        } else {
            resolved.push((key.to_string(), labels));
        }
    }
    resolved
}

/// Numeric reading of an external JSON value, accepting numeric strings.
pub(crate) fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a numeric command the way the hub expects it: integral values
/// without a fraction part.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// JSON number from an f64, collapsing integral values to integers.
pub(crate) fn json_number(value: f64) -> serde_json::Value {
    if value.fract().abs() < f64::EPSILON {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Value::from(value)
    }
}
