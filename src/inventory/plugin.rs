//! Inventory plugin - player slots, containers, drops and pickups.

use bevy::prelude::*;

use super::systems;

/// Inventory plugin - selection, item use, drops and container interaction.
pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        systems::setup_inventory_systems(app);
    }
}
