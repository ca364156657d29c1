//! Error types for model building
//!
//! The document build itself never fails: malformed subtrees degrade and
//! are reported through [`crate::Diagnostics`]. Hard errors exist only at
//! the edges, for loading a document and for strict lookups made by
//! collaborators that refuse degraded input.

use thiserror::Error;

/// Result type for model-building operations
pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("document root is not a JSON object")]
    InvalidDocument,

    #[error("unresolvable reference: {pointer}")]
    UnresolvableReference { pointer: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
