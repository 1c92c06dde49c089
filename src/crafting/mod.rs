//! Crafting module - recipes and atomic crafting.

mod engine;
mod error;
mod plugin;
mod recipe;

pub use engine::{Crafted, CraftingEngine};
pub use error::CraftError;
pub use plugin::{CraftRequest, CraftingPlugin};
pub use recipe::{Recipe, RecipeBook, RecipeCost, RecipeDefinition};
