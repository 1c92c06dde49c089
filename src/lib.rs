//! Outpost - a first-person survival builder in Bevy.
//!
//! Gather resources, craft tools and place snapping structures.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, frame phases, global events, config
//! - **Items**: Item definitions and the catalog
//! - **Player**: Input snapshot, first-person movement, needs, held items
//! - **Inventory**: Slots, quick slots, selection, containers, drops
//! - **Crafting**: Recipes and atomic crafting
//! - **Building**: Sockets, snapping and the placement state machine
//! - **World**: The starting site
//! - **UI**: HUD, inventory window, pause menu
//!
//! The inventory, crafting and building cores are plain Rust types that
//! only use `Entity` handles and math types, so they run without an `App`.

pub mod building;
pub mod core;
pub mod crafting;
pub mod inventory;
pub mod items;
pub mod player;
pub mod ui;
pub mod world;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
pub struct OutpostPlugin;

impl Plugin for OutpostPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            .add_plugins(items::ItemsPlugin)
            .add_plugins(player::PlayerPlugin)
            .add_plugins(inventory::InventoryPlugin)
            .add_plugins(crafting::CraftingPlugin)
            .add_plugins(building::BuildingPlugin)
            .add_plugins(world::WorldPlugin)
            .add_plugins(ui::UiPlugin);
    }
}
