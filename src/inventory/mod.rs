//! Inventory module - slot storage, quick slots, selection and containers.

mod components;
mod container;
mod error;
mod interaction;
mod plugin;
mod slot;
mod store;
mod systems;

pub use components::*;
pub use container::{deposit, stash, withdraw, ContainerKind, StorageContainer, TransferOutcome};
pub use error::InventoryError;
pub use interaction::{spawn_bag, spawn_world_item, DropAssets};
pub use plugin::InventoryPlugin;
pub use slot::{ItemSlot, ItemStack, MoveOutcome, Reduction, SlotArray, SlotId};
pub use store::{QuickSlot, Selection, SelectionNotice, SlotStore};

#[cfg(test)]
pub(crate) use slot::test_items;
