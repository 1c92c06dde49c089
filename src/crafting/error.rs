//! Crafting errors.

use thiserror::Error;

/// Why a craft was refused. Nothing was deducted in either case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CraftError {
    #[error("Need {required} {item} but only have {available}")]
    MissingResources {
        item: String,
        required: u32,
        available: u32,
    },

    #[error("No recipe named '{0}'")]
    UnknownRecipe(String),
}
