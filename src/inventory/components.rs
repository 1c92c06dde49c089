//! ECS-facing inventory components and events.

use bevy::prelude::*;

use super::slot::ItemStack;
use super::store::SelectionNotice;
use crate::items::ConsumableEffect;

/// A selection side effect for one player, forwarded from their store.
#[derive(Event, Clone, Debug)]
pub struct SelectionChanged {
    pub player: Entity,
    pub notice: SelectionNotice,
}

/// A consumable was used; the effects still have to be applied.
#[derive(Event, Clone, Debug)]
pub struct ItemConsumed {
    pub player: Entity,
    pub effects: Vec<ConsumableEffect>,
}

/// A loose stack lying in the world that can be picked up.
#[derive(Component, Clone, Debug)]
pub struct WorldItem {
    pub stack: ItemStack,
}

/// Container the player currently has open in the inventory window.
#[derive(Resource, Default, Debug)]
pub struct OpenContainer(pub Option<Entity>);
