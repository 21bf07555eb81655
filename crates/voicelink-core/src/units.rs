//! Unit-of-measure resolution.
//!
//! A property's physical unit is inferred from the item's configured unit
//! symbol or its state rendering pattern, with a regional-system fallback
//! when neither yields a known symbol.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::item::Dimension;

/// Regional measurement system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    /// Metric (SI) units.
    #[default]
    #[serde(alias = "SI")]
    Metric,
    /// United States customary units.
    #[serde(alias = "US")]
    Imperial,
}

/// One entry of the fixed unit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitEntry {
    /// Hub-side unit symbol.
    pub symbol: &'static str,
    /// Physical dimension the symbol belongs to.
    pub dimension: Dimension,
    /// External protocol canonical unit identifier.
    pub unit_id: &'static str,
    /// Regional system this entry is the default for, if any.
    pub default_for: &'static [UnitSystem],
}

const BOTH: &[UnitSystem] = &[UnitSystem::Metric, UnitSystem::Imperial];
const METRIC: &[UnitSystem] = &[UnitSystem::Metric];
const IMPERIAL: &[UnitSystem] = &[UnitSystem::Imperial];
const NONE: &[UnitSystem] = &[];

/// Known unit symbols and their external identifiers.
pub const UNIT_TABLE: &[UnitEntry] = &[
    UnitEntry { symbol: "°C", dimension: Dimension::Temperature, unit_id: "Temperature.Celsius", default_for: METRIC },
    UnitEntry { symbol: "°F", dimension: Dimension::Temperature, unit_id: "Temperature.Fahrenheit", default_for: IMPERIAL },
    UnitEntry { symbol: "K", dimension: Dimension::Temperature, unit_id: "Temperature.Kelvin", default_for: NONE },
    UnitEntry { symbol: "°", dimension: Dimension::Angle, unit_id: "Angle.Degrees", default_for: BOTH },
    UnitEntry { symbol: "rad", dimension: Dimension::Angle, unit_id: "Angle.Radians", default_for: NONE },
    UnitEntry { symbol: "%", dimension: Dimension::Dimensionless, unit_id: "Percent", default_for: BOTH },
    UnitEntry { symbol: "m", dimension: Dimension::Length, unit_id: "Distance.Meters", default_for: METRIC },
    UnitEntry { symbol: "km", dimension: Dimension::Length, unit_id: "Distance.Kilometers", default_for: NONE },
    UnitEntry { symbol: "mi", dimension: Dimension::Length, unit_id: "Distance.Miles", default_for: IMPERIAL },
    UnitEntry { symbol: "in", dimension: Dimension::Length, unit_id: "Distance.Inches", default_for: NONE },
    UnitEntry { symbol: "ft", dimension: Dimension::Length, unit_id: "Distance.Feet", default_for: NONE },
    UnitEntry { symbol: "yd", dimension: Dimension::Length, unit_id: "Distance.Yards", default_for: NONE },
    UnitEntry { symbol: "kg", dimension: Dimension::Mass, unit_id: "Mass.Kilograms", default_for: METRIC },
    UnitEntry { symbol: "g", dimension: Dimension::Mass, unit_id: "Mass.Grams", default_for: NONE },
    UnitEntry { symbol: "lb", dimension: Dimension::Mass, unit_id: "Weight.Pounds", default_for: IMPERIAL },
    UnitEntry { symbol: "oz", dimension: Dimension::Mass, unit_id: "Weight.Ounces", default_for: NONE },
    UnitEntry { symbol: "l", dimension: Dimension::Volume, unit_id: "Volume.Liters", default_for: METRIC },
    UnitEntry { symbol: "m³", dimension: Dimension::Volume, unit_id: "Volume.CubicMeters", default_for: NONE },
    UnitEntry { symbol: "gal", dimension: Dimension::Volume, unit_id: "Volume.Gallons", default_for: IMPERIAL },
    UnitEntry { symbol: "ft³", dimension: Dimension::Volume, unit_id: "Volume.CubicFeet", default_for: NONE },
    UnitEntry { symbol: "pt", dimension: Dimension::Volume, unit_id: "Volume.Pints", default_for: NONE },
    UnitEntry { symbol: "qt", dimension: Dimension::Volume, unit_id: "Volume.Quarts", default_for: NONE },
];

static FORMAT_SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%[0-9.,+\- #]*[a-zA-Z]").expect("format specifier pattern is valid")
});

/// Derive a unit symbol from a state rendering pattern.
///
/// The pattern is rendered with a sentinel numeric value (every printf-style
/// specifier collapses to a digit), then the trailing text is matched against
/// the known symbol vocabulary. The hub's `%unit%` placeholder carries no
/// symbol of its own and is removed first.
pub fn symbol_from_pattern(pattern: &str) -> Option<&'static str> {
    let rendered = pattern.replace("%unit%", "");
    let rendered = rendered.replace("%%", "%");
    let rendered = FORMAT_SPECIFIER.replace_all(&rendered, "1");
    let rendered = rendered.trim();

    UNIT_TABLE
        .iter()
        .filter(|entry| rendered.ends_with(entry.symbol))
        .max_by_key(|entry| entry.symbol.len())
        .map(|entry| entry.symbol)
}

/// Resolve the unit for a property.
///
/// The item's configured symbol wins over the rendering pattern; when neither
/// produces a symbol known for the dimension, the table's default entry for
/// `(dimension, system)` applies.
pub fn resolve(
    symbol: Option<&str>,
    pattern: Option<&str>,
    dimension: Dimension,
    system: UnitSystem,
) -> Option<&'static UnitEntry> {
    let symbol = symbol
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| pattern.and_then(symbol_from_pattern));

    if let Some(symbol) = symbol {
        if let Some(entry) = UNIT_TABLE
            .iter()
            .find(|entry| entry.symbol == symbol && entry.dimension == dimension)
        {
            return Some(entry);
        }
    }

    UNIT_TABLE
        .iter()
        .find(|entry| entry.dimension == dimension && entry.default_for.contains(&system))
}
