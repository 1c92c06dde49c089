//! Items module - immutable item definitions and the catalog.

mod data;
mod error;
mod plugin;

pub use data::{
    BuildingSpec, ConsumableEffect, EquipSpec, ItemCatalog, ItemCategory, ItemDefinition,
    ItemId, ItemKind, ItemRef, NeedKind,
};
pub use error::DataLoadError;
pub use plugin::ItemsPlugin;

pub(crate) use data::load_item_definitions;
