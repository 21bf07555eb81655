//! Resource catalog resolution.
//!
//! Friendly names on a property resolve to either a fixed global asset
//! reference (`@Category.Name`), a customizable supplemental catalog entry, or
//! localized literal text bound to one of the supported locales. Reserved or
//! malformed labels are filtered out rather than rejected with an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::CatalogError;

/// Supported locales, grouped by 2-letter language code.
pub const LOCALES: &[(&str, &str)] = &[
    ("ar", "ar-SA"),
    ("de", "de-DE"),
    ("en", "en-AU"),
    ("en", "en-CA"),
    ("en", "en-GB"),
    ("en", "en-IN"),
    ("en", "en-US"),
    ("es", "es-ES"),
    ("es", "es-MX"),
    ("es", "es-US"),
    ("fr", "fr-CA"),
    ("fr", "fr-FR"),
    ("hi", "hi-IN"),
    ("it", "it-IT"),
    ("ja", "ja-JP"),
    ("pt", "pt-BR"),
];

/// Asset identifiers shipped with the external protocol.
pub const GLOBAL_ASSETS: &[&str] = &[
    "DeviceName.AirPurifier",
    "DeviceName.Camera",
    "DeviceName.Fan",
    "DeviceName.Router",
    "DeviceName.Shower",
    "DeviceName.SpaceHeater",
    "DeviceName.Washer",
    "Setting.2GGuestWiFi",
    "Setting.5GGuestWiFi",
    "Setting.Auto",
    "Setting.Direction",
    "Setting.DryCycle",
    "Setting.FanSpeed",
    "Setting.GuestWiFi",
    "Setting.Heat",
    "Setting.Mode",
    "Setting.Night",
    "Setting.Opening",
    "Setting.Oscillate",
    "Setting.Preset",
    "Setting.Quiet",
    "Setting.Temperature",
    "Setting.WashCycle",
    "Setting.WaterTemperature",
    "Shower.HandHeld",
    "Shower.RainHead",
    "Value.Close",
    "Value.Decrease",
    "Value.Delicate",
    "Value.Down",
    "Value.High",
    "Value.Increase",
    "Value.Low",
    "Value.Maximum",
    "Value.Medium",
    "Value.Minimum",
    "Value.Normal",
    "Value.Open",
    "Value.Quick",
    "Value.Stop",
    "Value.Up",
];

/// Words that may not be used as plain-text capability names.
const RESERVED_WORDS: &[&str] = &["alexa", "amazon", "computer", "echo", "skill"];

static ASSET_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+\.[A-Za-z0-9]+$").expect("asset id pattern is valid"));

/// What kind of resource a label names; controls the reserved-word list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    /// Generic capability names spoken to address the feature itself.
    Capability,
    /// Mode names.
    Mode,
    /// Preset names.
    Preset,
}

impl ResourceType {
    fn reserved_words(&self) -> &'static [&'static str] {
        match self {
            Self::Capability => RESERVED_WORDS,
            Self::Mode | Self::Preset => &[],
        }
    }
}

/// A localized text entry in the supplemental catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedText {
    pub text: String,
    pub locale: String,
}

/// Immutable supplemental asset catalog, built once at startup from an
/// already-parsed JSON document and passed by reference into resolution calls.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    entries: Vec<(String, Vec<LocalizedText>)>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a JSON object mapping asset identifiers to arrays
    /// of `{text, locale}` entries. Entries with unsupported locales or empty
    /// text are skipped with a diagnostic; structural problems are errors.
    pub fn from_json(document: &Value) -> Result<Self, CatalogError> {
        let object = document
            .as_object()
            .ok_or(CatalogError::InvalidDocument(type_name(document)))?;

        let mut entries = Vec::new();
        for (asset_id, labels) in object {
            if !ASSET_ID_PATTERN.is_match(asset_id) {
                return Err(CatalogError::InvalidAssetId(asset_id.clone()));
            }
            let labels = labels
                .as_array()
                .ok_or_else(|| CatalogError::InvalidAssetEntries(asset_id.clone()))?;

            let mut texts = Vec::new();
            for label in labels {
                let text = label.get("text").and_then(Value::as_str).unwrap_or("");
                let locale = label.get("locale").and_then(Value::as_str).unwrap_or("");
                if text.trim().is_empty() || !is_supported_locale(locale) {
                    warn!(asset_id = %asset_id, %locale, "Skipping invalid catalog entry");
                    continue;
                }
                texts.push(LocalizedText {
                    text: text.trim().to_string(),
                    locale: locale.to_string(),
                });
            }
            if !texts.is_empty() {
                entries.push((asset_id.clone(), texts));
            }
        }
        Ok(Self { entries })
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == asset_id)
    }

    pub fn labels(&self, asset_id: &str) -> Option<&[LocalizedText]> {
        self.entries
            .iter()
            .find(|(id, _)| id == asset_id)
            .map(|(_, texts)| texts.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One resolved friendly-name entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceLabel {
    #[serde(rename_all = "camelCase")]
    Asset { asset_id: String },
    Text { text: String, locale: String },
}

/// Resolved friendly-name set for one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub friendly_names: Vec<ResourceLabel>,
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        self.friendly_names.is_empty()
    }
}

fn is_supported_locale(locale: &str) -> bool {
    LOCALES.iter().any(|(_, l)| *l == locale)
}

/// Locales matching a requested language, by 2-letter prefix.
fn matching_locales(language: &str) -> Vec<&'static str> {
    let prefix = language.split(['-', '_']).next().unwrap_or(language);
    LOCALES
        .iter()
        .filter(|(lang, _)| lang.eq_ignore_ascii_case(prefix))
        .map(|(_, locale)| *locale)
        .collect()
}

/// Whether a friendly-name label is usable.
///
/// Asset-prefixed labels must exist in the global assets or the supplemental
/// catalog; plain-text labels must be non-empty and outside the reserved-word
/// list for the resource type.
pub fn is_valid_label(label: &str, resource_type: ResourceType, catalog: &AssetCatalog) -> bool {
    match label.strip_prefix('@') {
        Some(asset_id) => {
            GLOBAL_ASSETS.contains(&asset_id) || catalog.contains(asset_id)
        }
        None => {
            let text = label.trim();
            !text.is_empty()
                && !resource_type
                    .reserved_words()
                    .iter()
                    .any(|word| text.eq_ignore_ascii_case(word))
        }
    }
}

/// Resolve a friendly-name list into a deduplicated, order-preserving set of
/// resource labels for the requested language.
pub fn resources(
    labels: &[String],
    language: &str,
    resource_type: ResourceType,
    catalog: &AssetCatalog,
) -> Resources {
    let locales = matching_locales(language);
    let mut friendly_names: Vec<ResourceLabel> = Vec::new();

    for label in labels {
        if !is_valid_label(label, resource_type, catalog) {
            warn!(%label, "Dropping invalid friendly-name label");
            continue;
        }
        let expanded: Vec<ResourceLabel> = match label.strip_prefix('@') {
            Some(asset_id) => vec![ResourceLabel::Asset {
                asset_id: asset_id.to_string(),
            }],
            None => locales
                .iter()
                .map(|locale| ResourceLabel::Text {
                    text: label.trim().to_string(),
                    locale: (*locale).to_string(),
                })
                .collect(),
        };
        for entry in expanded {
            if !friendly_names.contains(&entry) {
                friendly_names.push(entry);
            }
        }
    }

    Resources { friendly_names }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn custom_catalog() -> AssetCatalog {
        AssetCatalog::from_json(&json!({
            "MyAssets.Sprinkler": [
                {"text": "Sprinkler", "locale": "en-US"},
                {"text": "Rasensprenger", "locale": "de-DE"},
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_global_asset_label_is_valid() {
        let catalog = AssetCatalog::new();
        assert!(is_valid_label("@Setting.Temperature", ResourceType::Capability, &catalog));
    }

    #[test]
    fn test_unknown_asset_label_is_rejected() {
        let catalog = custom_catalog();
        assert!(!is_valid_label("@Setting.Bogus", ResourceType::Capability, &catalog));
        assert!(is_valid_label("@MyAssets.Sprinkler", ResourceType::Capability, &catalog));
    }

    #[test]
    fn test_reserved_words_apply_to_capabilities_only() {
        let catalog = AssetCatalog::new();
        assert!(!is_valid_label("Alexa", ResourceType::Capability, &catalog));
        assert!(is_valid_label("Alexa", ResourceType::Mode, &catalog));
        assert!(is_valid_label("Alexa", ResourceType::Preset, &catalog));
        assert!(!is_valid_label("  ", ResourceType::Mode, &catalog));
    }

    #[test]
    fn test_text_label_expands_per_matching_locale() {
        let catalog = AssetCatalog::new();
        let resolved = resources(
            &["Position".to_string()],
            "fr-FR",
            ResourceType::Capability,
            &catalog,
        );
        assert_eq!(
            resolved.friendly_names,
            vec![
                ResourceLabel::Text { text: "Position".into(), locale: "fr-CA".into() },
                ResourceLabel::Text { text: "Position".into(), locale: "fr-FR".into() },
            ]
        );
    }

    #[test]
    fn test_resources_dedup_preserves_order() {
        let catalog = AssetCatalog::new();
        let labels = vec![
            "@Setting.FanSpeed".to_string(),
            "Speed".to_string(),
            "@Setting.FanSpeed".to_string(),
        ];
        let resolved = resources(&labels, "ja", ResourceType::Capability, &catalog);
        assert_eq!(resolved.friendly_names.len(), 2);
        assert_eq!(
            resolved.friendly_names[0],
            ResourceLabel::Asset { asset_id: "Setting.FanSpeed".into() }
        );
    }

    #[test]
    fn test_invalid_labels_are_dropped_not_fatal() {
        let catalog = AssetCatalog::new();
        let labels = vec!["@No.Such".to_string(), "Light".to_string()];
        let resolved = resources(&labels, "en-US", ResourceType::Capability, &catalog);
        assert!(resolved
            .friendly_names
            .iter()
            .all(|l| matches!(l, ResourceLabel::Text { .. })));
    }

    #[test]
    fn test_catalog_rejects_malformed_documents() {
        assert!(AssetCatalog::from_json(&json!([])).is_err());
        assert!(AssetCatalog::from_json(&json!({"bad id": []})).is_err());
        assert!(AssetCatalog::from_json(&json!({"Ok.Id": {"not": "array"}})).is_err());
    }

    #[test]
    fn test_catalog_skips_unsupported_locales() {
        let catalog = AssetCatalog::from_json(&json!({
            "MyAssets.Thing": [
                {"text": "Thing", "locale": "xx-XX"},
                {"text": "Thing", "locale": "en-GB"},
            ]
        }))
        .unwrap();
        assert_eq!(catalog.labels("MyAssets.Thing").unwrap().len(), 1);
    }

    #[test]
    fn test_locale_table_has_sixteen_entries() {
        assert_eq!(LOCALES.len(), 16);
    }
}
