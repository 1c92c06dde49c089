//! Error types for item and recipe data loading.

use thiserror::Error;

/// Errors that can occur when loading item or recipe data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// A recipe references an item that is not in the catalog.
    #[error("Unknown item '{item}' referenced by '{referenced_by}'")]
    UnknownItem { item: String, referenced_by: String },

    /// Definition parsed but breaks an item invariant.
    #[error("Invalid definition '{id}': {reason}")]
    InvalidDefinition { id: String, reason: String },
}
