//! Error types for the few fallible boundaries of the engine.
//!
//! Mapping paths are tolerant and report absence, never errors; only catalog
//! ingestion, which consumes host-provided rather than user-provided data,
//! fails loudly.

/// Errors raised while ingesting a supplemental asset catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog document is not a JSON object.
    #[error("Catalog must be a JSON object, got {0}")]
    InvalidDocument(&'static str),

    /// An asset entry is not an array of label objects.
    #[error("Invalid entries for asset '{0}'")]
    InvalidAssetEntries(String),

    /// An asset identifier does not follow the `Category.Name` form.
    #[error("Invalid asset identifier: {0}")]
    InvalidAssetId(String),
}
