//! Per-invocation settings.
//!
//! Carries the regional preferences the host resolves before invoking the
//! engine. Settings are plain data; nothing here is read from the process
//! environment.

use serde::{Deserialize, Serialize};

use crate::units::UnitSystem;

/// Regional preferences of the requesting account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionalSettings {
    /// Requested language, as a locale (`en-US`) or bare language code (`en`).
    pub language: String,
    /// Measurement system used for unit defaults.
    pub measurement_system: UnitSystem,
}

impl Default for RegionalSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            measurement_system: UnitSystem::Metric,
        }
    }
}

/// Settings snapshot passed into every engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub regional: RegionalSettings,
}

impl Settings {
    pub fn new(language: impl Into<String>, measurement_system: UnitSystem) -> Self {
        Self {
            regional: RegionalSettings {
                language: language.into(),
                measurement_system,
            },
        }
    }
}
