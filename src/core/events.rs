//! Global events used for cross-system communication.
//!
//! Areas talk to each other through these instead of reaching into each
//! other's components: placement announces new structures, the inventory
//! asks the world to drop items it cannot hold, and so on.

use bevy::prelude::*;

use crate::inventory::ItemStack;
use crate::items::ItemRef;

/// A structure was committed by building placement.
#[derive(Event)]
pub struct StructurePlaced {
    pub structure: Entity,
    pub item: ItemRef,
    pub player: Entity,
}

/// A placed structure was demolished.
#[derive(Event)]
pub struct StructureRemoved {
    pub structure: Entity,
}

/// Spawn a stack as a loose pickup in the world.
#[derive(Event)]
pub struct WorldDropRequest {
    pub stack: ItemStack,
    pub position: Vec3,
}

/// Put a player's slot into a dropped bag near them.
#[derive(Event)]
pub struct BagDropRequest {
    pub player: Entity,
    pub slot: usize,
}

/// Sent when the player picks up an item.
#[derive(Event)]
pub struct ItemPickupEvent {
    pub player: Entity,
    pub item: ItemRef,
    pub quantity: u32,
}
