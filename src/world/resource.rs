//! Gatherable resource nodes and contact hazards.

use bevy::prelude::*;

use crate::inventory::{ItemStack, SlotStore};
use crate::items::ItemRef;

/// A tree, rock or bush that yields an item when struck with a gathering tool.
#[derive(Component, Clone, Debug)]
pub struct ResourceNode {
    pub item: ItemRef,
    /// Units taken from the node per hit
    pub per_hit: u32,
    /// Units left before the node is used up
    pub capacity: u32,
}

/// What one hit produced.
#[derive(Debug, Default)]
pub struct GatherYield {
    /// Units that went into the inventory
    pub added: u32,
    /// Units that did not fit, split into stacks the world can hold
    pub overflow: Vec<ItemStack>,
}

impl GatherYield {
    pub fn total(&self) -> u32 {
        self.added + self.overflow.iter().map(|stack| stack.quantity).sum::<u32>()
    }
}

impl ResourceNode {
    pub fn new(item: ItemRef, per_hit: u32, capacity: u32) -> Self {
        Self {
            item,
            per_hit,
            capacity,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.capacity == 0
    }

    /// Take one hit's worth of units, adding them to `store` one at a time.
    /// Units taken from the node are never lost: what does not fit comes back
    /// as overflow.
    pub fn gather(&mut self, store: &mut SlotStore) -> GatherYield {
        let taken = self.per_hit.min(self.capacity);
        self.capacity -= taken;

        let added = (0..taken).take_while(|_| store.add_item(&self.item)).count() as u32;
        GatherYield {
            added,
            overflow: ItemStack::split(&self.item, taken - added),
        }
    }
}

/// Hurts players standing against it, once per interval.
#[derive(Component, Clone, Debug)]
pub struct Hazard {
    pub damage: f32,
    pub interval: f32,
    /// Distance from the hazard's origin at which a player counts as touching
    pub reach: f32,
    cooldown: f32,
}

impl Hazard {
    pub fn new(damage: f32, interval: f32, reach: f32) -> Self {
        Self {
            damage,
            interval,
            reach,
            cooldown: 0.0,
        }
    }

    /// Advance by `dt`. Returns the damage dealt this tick, if any.
    pub fn tick(&mut self, touching: bool, dt: f32) -> Option<f32> {
        self.cooldown = (self.cooldown - dt).max(0.0);
        if !touching || self.cooldown > 0.0 {
            return None;
        }
        self.cooldown = self.interval;
        Some(self.damage)
    }
}
