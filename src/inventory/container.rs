//! Storage containers (chests, dropped bags) and transfers between a
//! container and the player's slot store.
//!
//! A container owns its own [`SlotArray`] and exposes the same add, remove
//! and swap surface as the player inventory, so the window can drive
//! either one the same way. Transfers validate both ends before touching
//! anything: an item is either fully moved or left where it was.

use bevy::prelude::*;

use super::error::InventoryError;
use super::slot::{ItemSlot, ItemStack, MoveOutcome, SlotArray};
use super::store::SlotStore;
use crate::items::ItemRef;

/// What kind of container this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    /// Persists regardless of contents
    Chest,
    /// Despawns once emptied
    Bag,
}

/// A slotted storage container in the world.
#[derive(Component, Clone, Debug)]
pub struct StorageContainer {
    kind: ContainerKind,
    slots: SlotArray,
    /// Player currently interacting with the container
    user: Option<Entity>,
}

impl StorageContainer {
    pub fn new(kind: ContainerKind, size: usize) -> Self {
        Self {
            kind,
            slots: SlotArray::new(size),
            user: None,
        }
    }

    pub fn chest(size: usize) -> Self {
        Self::new(ContainerKind::Chest, size)
    }

    pub fn bag(size: usize) -> Self {
        Self::new(ContainerKind::Bag, size)
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn slots(&self) -> &SlotArray {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Result<&ItemSlot, InventoryError> {
        self.slots.get(index)
    }

    /// Associate the container with a player and show it.
    pub fn open(&mut self, user: Entity) {
        self.user = Some(user);
    }

    pub fn close(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<Entity> {
        self.user
    }

    pub fn is_open(&self) -> bool {
        self.user.is_some()
    }

    /// A bag with nothing left in it should be removed from the world.
    pub fn is_spent(&self) -> bool {
        self.kind == ContainerKind::Bag && self.slots.is_empty()
    }

    pub fn add_item(&mut self, item: &ItemRef) -> bool {
        self.slots.add_one(item).is_some()
    }

    /// Add a whole stack. Returns whatever did not fit.
    pub fn insert_stack(&mut self, stack: ItemStack) -> Option<ItemStack> {
        self.slots.insert_stack(stack).1
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Option<ItemStack>, InventoryError> {
        self.slots.remove_at(index)
    }

    pub fn swap_or_stack(&mut self, from: usize, to: usize) -> Result<MoveOutcome, InventoryError> {
        self.slots.swap_or_stack(from, to)
    }
}

/// Result of moving an item across the store/container boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The whole stack moved into an empty slot
    Moved { quantity: u32 },
    /// Units were merged into a matching stack; the rest stayed behind
    Stacked { moved: u32 },
    /// The two slots traded contents
    Swapped,
    /// Source was empty or the target stack was full
    Unchanged,
}

/// What should happen to the target slot, decided before anything changes.
enum Plan {
    Move(ItemStack),
    Stack(u32),
    Swap(ItemStack, ItemStack),
    Nothing,
}

fn plan(source: Option<&ItemStack>, target: Option<&ItemStack>) -> Plan {
    match (source, target) {
        (None, _) => Plan::Nothing,
        (Some(source), None) => Plan::Move(source.clone()),
        (Some(source), Some(target)) if source.item.stackable && target.is_item(&source.item) => {
            match target.room_left().min(source.quantity) {
                0 => Plan::Nothing,
                moved => Plan::Stack(moved),
            }
        }
        (Some(source), Some(target)) => Plan::Swap(source.clone(), target.clone()),
    }
}

/// Move a player slot into a container slot.
pub fn deposit(
    store: &mut SlotStore,
    from: usize,
    container: &mut StorageContainer,
    to: usize,
) -> Result<TransferOutcome, InventoryError> {
    let source = store.slot(from)?.stack().cloned();
    let target = container.slot(to)?.stack().cloned();

    let outcome = match plan(source.as_ref(), target.as_ref()) {
        Plan::Nothing => TransferOutcome::Unchanged,
        Plan::Move(stack) => {
            let quantity = stack.quantity;
            container.slots.replace_at(to, Some(stack))?;
            store.replace_at(from, None)?;
            TransferOutcome::Moved { quantity }
        }
        Plan::Stack(moved) => {
            container.slots.grow(to, moved)?;
            store.reduce_quantity(from, moved)?;
            TransferOutcome::Stacked { moved }
        }
        Plan::Swap(source, target) => {
            container.slots.replace_at(to, Some(source))?;
            store.replace_at(from, Some(target))?;
            TransferOutcome::Swapped
        }
    };

    debug!("Deposit slot {} -> container slot {}: {:?}", from, to, outcome);
    Ok(outcome)
}

/// Move a container slot into a player slot.
pub fn withdraw(
    container: &mut StorageContainer,
    from: usize,
    store: &mut SlotStore,
    to: usize,
) -> Result<TransferOutcome, InventoryError> {
    let source = container.slot(from)?.stack().cloned();
    let target = store.slot(to)?.stack().cloned();

    let outcome = match plan(source.as_ref(), target.as_ref()) {
        Plan::Nothing => TransferOutcome::Unchanged,
        Plan::Move(stack) => {
            let quantity = stack.quantity;
            store.replace_at(to, Some(stack))?;
            container.slots.replace_at(from, None)?;
            TransferOutcome::Moved { quantity }
        }
        Plan::Stack(moved) => {
            store.grow(to, moved)?;
            container.slots.reduce(from, moved)?;
            TransferOutcome::Stacked { moved }
        }
        Plan::Swap(source, target) => {
            store.replace_at(to, Some(source))?;
            container.slots.replace_at(from, Some(target))?;
            TransferOutcome::Swapped
        }
    };

    debug!("Withdraw container slot {} -> slot {}: {:?}", from, to, outcome);
    Ok(outcome)
}

/// Move a player slot into the first place that takes it in a container
/// (stacking first). Used when dropping into a bag.
pub fn stash(
    store: &mut SlotStore,
    from: usize,
    container: &mut StorageContainer,
) -> Result<TransferOutcome, InventoryError> {
    let Some(stack) = store.slot(from)?.stack().cloned() else {
        return Ok(TransferOutcome::Unchanged);
    };

    let quantity = stack.quantity;
    match container.insert_stack(stack) {
        None => {
            store.replace_at(from, None)?;
            Ok(TransferOutcome::Moved { quantity })
        }
        Some(leftover) if leftover.quantity < quantity => {
            let moved = quantity - leftover.quantity;
            store.reduce_quantity(from, moved)?;
            Ok(TransferOutcome::Stacked { moved })
        }
        Some(_) => Ok(TransferOutcome::Unchanged),
    }
}
