//! Property kinds and the property contract.
//!
//! A property binds one kind to one hub item. The discovery path derives its
//! parameters from live item metadata; the directive path rehydrates them
//! from a serialized capability record. Kind-specific mapping logic lives in
//! [`kinds`] and is dispatched through the immutable [`registry`].

pub mod behavior;
pub mod kind;
pub mod kinds;
pub mod param;
pub mod property;
pub mod registry;

pub use behavior::{item_type_matches, PropertyBehavior, PropertyContext};
pub use kind::PropertyKind;
pub use property::{ItemRef, Property, ValueMap};
pub use registry::behavior;
