//! Core types for the VoiceLink bridge engine.
//!
//! This crate holds the pieces every property kind builds on: the hub item
//! model, free-form parameter conversion, the resource catalog resolver, the
//! unit-of-measure resolver, the semantics builder and the per-invocation
//! settings. The property contract itself lives in `voicelink-properties`.

pub mod catalog;
pub mod convert;
pub mod error;
pub mod item;
pub mod semantics;
pub mod settings;
pub mod units;

pub use catalog::{AssetCatalog, ResourceLabel, ResourceType, Resources};
pub use convert::{
    convert, parse_capability_name, parse_group_endpoint, CapabilityName, OrderedMap,
    ParameterType, ParameterValue, RangeParam,
};
pub use error::CatalogError;
pub use item::{Dimension, Item, ItemType, MetadataEntry, StateDescription, StateOption};
pub use semantics::{DirectiveSpec, Semantics, SemanticsBuilder};
pub use settings::{RegionalSettings, Settings};
pub use units::{UnitEntry, UnitSystem};
