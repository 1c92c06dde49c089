//! The player's slot store: main slots, quick slots and the current selection.
//!
//! Quick slots never own anything. Each one caches a copy of the main slot it
//! points at, and every mutation of a main slot goes through
//! [`SlotStore::after_change`] so the copies stay in step.
//!
//! Selection side effects (equip, start placement, ...) are not performed
//! here. They are queued as [`SelectionNotice`]s and drained by the plugin,
//! which forwards them to whoever reacts to them.

use bevy::log::debug;
use bevy::prelude::Component;

use super::error::InventoryError;
use super::slot::{ItemSlot, ItemStack, MoveOutcome, Reduction, SlotArray};
use crate::items::{ConsumableEffect, ItemCategory, ItemDefinition, ItemRef};

/// A fast-access mirror of one main slot.
#[derive(Clone, Debug, Default)]
pub struct QuickSlot {
    cached: ItemSlot,
    link: Option<usize>,
}

impl QuickSlot {
    /// Index of the main slot this quick slot mirrors.
    pub fn link(&self) -> Option<usize> {
        self.link
    }

    pub fn stack(&self) -> Option<&ItemStack> {
        self.cached.stack()
    }

    pub fn is_empty(&self) -> bool {
        self.link.is_none()
    }

    fn mirror(&mut self, index: usize, stack: &ItemStack) {
        self.cached.set(Some(stack.clone()));
        self.link = Some(index);
    }

    fn clear(&mut self) {
        self.cached.set(None);
        self.link = None;
    }
}

/// The currently selected slot (at most one).
#[derive(Clone, Debug)]
pub struct Selection {
    pub slot: usize,
    /// Set when the selection was made through a quick slot
    pub quick: Option<usize>,
    pub item: ItemRef,
}

/// Side effect requested by a selection change.
#[derive(Clone, Debug)]
pub enum SelectionNotice {
    Equip { slot: usize, item: ItemRef },
    Unequip { slot: usize, item: ItemRef },
    StartPlacement { slot: usize, item: ItemRef },
    CancelPlacement { slot: usize, item: ItemRef },
    /// Consumables and resources do nothing until used
    Hold { slot: usize, item: ItemRef },
    Release { slot: usize, item: ItemRef },
}

impl SelectionNotice {
    fn selected(slot: usize, item: ItemRef) -> Self {
        match item.category() {
            ItemCategory::Equipable => Self::Equip { slot, item },
            ItemCategory::Building => Self::StartPlacement { slot, item },
            ItemCategory::Consumable | ItemCategory::Resource => Self::Hold { slot, item },
        }
    }

    fn deselected(slot: usize, item: ItemRef) -> Self {
        match item.category() {
            ItemCategory::Equipable => Self::Unequip { slot, item },
            ItemCategory::Building => Self::CancelPlacement { slot, item },
            ItemCategory::Consumable | ItemCategory::Resource => Self::Release { slot, item },
        }
    }

    pub fn is_deselection(&self) -> bool {
        matches!(
            self,
            Self::Unequip { .. } | Self::CancelPlacement { .. } | Self::Release { .. }
        )
    }

    pub fn slot(&self) -> usize {
        match self {
            Self::Equip { slot, .. }
            | Self::Unequip { slot, .. }
            | Self::StartPlacement { slot, .. }
            | Self::CancelPlacement { slot, .. }
            | Self::Hold { slot, .. }
            | Self::Release { slot, .. } => *slot,
        }
    }

    pub fn item(&self) -> &ItemRef {
        match self {
            Self::Equip { item, .. }
            | Self::Unequip { item, .. }
            | Self::StartPlacement { item, .. }
            | Self::CancelPlacement { item, .. }
            | Self::Hold { item, .. }
            | Self::Release { item, .. } => item,
        }
    }
}

/// Player inventory component.
#[derive(Component, Clone, Debug)]
pub struct SlotStore {
    slots: SlotArray,
    quick: Vec<QuickSlot>,
    selection: Option<Selection>,
    notices: Vec<SelectionNotice>,
}

fn swapped(index: usize, a: usize, b: usize) -> usize {
    if index == a {
        b
    } else if index == b {
        a
    } else {
        index
    }
}

impl SlotStore {
    pub fn new(slot_count: usize, quick_slot_count: usize) -> Self {
        Self {
            slots: SlotArray::new(slot_count),
            quick: vec![QuickSlot::default(); quick_slot_count],
            selection: None,
            notices: Vec::new(),
        }
    }

    pub fn slots(&self) -> &SlotArray {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Result<&ItemSlot, InventoryError> {
        self.slots.get(index)
    }

    pub fn quick_slots(&self) -> &[QuickSlot] {
        &self.quick
    }

    pub fn quick_slot(&self, quick: usize) -> Result<&QuickSlot, InventoryError> {
        self.quick.get(quick).ok_or(InventoryError::QuickSlotOutOfBounds {
            index: quick,
            len: self.quick.len(),
        })
    }

    /// Quick slot currently linked to a main slot, if any.
    pub fn quick_link_of(&self, index: usize) -> Option<usize> {
        self.quick.iter().position(|q| q.link == Some(index))
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_stack(&self) -> Option<&ItemStack> {
        let selection = self.selection.as_ref()?;
        self.slots.get(selection.slot).ok()?.stack()
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    /// Drain queued selection side effects, oldest first.
    pub fn take_notices(&mut self) -> Vec<SelectionNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Add one unit of `item`. Returns false when there was no room; the
    /// caller decides what to do with the item then.
    pub fn add_item(&mut self, item: &ItemRef) -> bool {
        match self.slots.add_one(item) {
            Some(index) => {
                self.after_change(&[index]);
                true
            }
            None => false,
        }
    }

    /// Add a whole stack. Returns whatever did not fit.
    pub fn insert_stack(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let (touched, leftover) = self.slots.insert_stack(stack);
        self.after_change(&touched);
        leftover
    }

    /// Clear a slot, cascading to its quick slot and the selection.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<ItemStack>, InventoryError> {
        let removed = self.slots.remove_at(index)?;
        self.after_change(&[index]);
        Ok(removed)
    }

    /// Remove up to `amount` units from a slot; clears it at 0 exactly like
    /// [`SlotStore::remove_at`].
    pub fn reduce_quantity(
        &mut self,
        index: usize,
        amount: u32,
    ) -> Result<Reduction, InventoryError> {
        let reduction = self.slots.reduce(index, amount)?;
        self.after_change(&[index]);
        Ok(reduction)
    }

    /// Merge or swap two main slots, keeping quick-slot links and the
    /// selection attached to the item that moved.
    pub fn swap_or_stack(&mut self, from: usize, to: usize) -> Result<MoveOutcome, InventoryError> {
        let outcome = self.slots.swap_or_stack(from, to)?;

        if outcome == MoveOutcome::Swapped {
            for quick in self.quick.iter_mut() {
                if let Some(link) = quick.link {
                    quick.link = Some(swapped(link, from, to));
                }
            }
            if let Some(selection) = self.selection.as_mut() {
                selection.slot = swapped(selection.slot, from, to);
            }
        }

        self.after_change(&[from, to]);
        Ok(outcome)
    }

    pub fn count(&self, item: &ItemDefinition) -> u32 {
        self.slots.count(item)
    }

    pub fn has_at_least(&self, item: &ItemDefinition, quantity: u32) -> bool {
        self.slots.has_at_least(item, quantity)
    }

    /// Remove `quantity` units of `item` across slots, oldest first.
    /// Returns false (and changes nothing) if not enough is held.
    pub fn deduct_cost(&mut self, item: &ItemDefinition, quantity: u32) -> bool {
        if !self.slots.has_at_least(item, quantity) {
            debug!("Cannot deduct {} x{}: not enough held", item.id, quantity);
            return false;
        }
        let touched = self.slots.deduct(item, quantity);
        self.after_change(&touched);
        true
    }

    /// Point a quick slot at a main slot. Resources are never quick-equippable.
    pub fn link_to_quick_slot(&mut self, index: usize, quick: usize) -> Result<(), InventoryError> {
        self.quick_slot(quick)?;
        let stack = self
            .slots
            .get(index)?
            .stack()
            .cloned()
            .ok_or(InventoryError::EmptySlot(index))?;

        if stack.item.category() == ItemCategory::Resource {
            return Err(InventoryError::NotQuickEquippable(stack.item.id.clone()));
        }

        let relinking_selected = self
            .selection
            .as_ref()
            .is_some_and(|s| s.quick == Some(quick) && s.slot != index);
        if relinking_selected {
            self.deselect();
        }

        // One quick slot per main slot
        for (other, slot) in self.quick.iter_mut().enumerate() {
            if other != quick && slot.link == Some(index) {
                slot.clear();
                if let Some(selection) = self.selection.as_mut() {
                    if selection.quick == Some(other) {
                        selection.quick = Some(quick);
                    }
                }
            }
        }

        self.quick[quick].mirror(index, &stack);
        Ok(())
    }

    /// Remove a quick slot's link; the main slot is untouched.
    pub fn unlink_quick_slot(&mut self, quick: usize) -> Result<(), InventoryError> {
        self.quick_slot(quick)?;
        if self.selection.as_ref().is_some_and(|s| s.quick == Some(quick)) {
            self.deselect();
        }
        self.quick[quick].clear();
        Ok(())
    }

    /// Select a main slot. Selecting the already selected slot deselects it.
    /// Returns whether a slot is selected afterwards.
    pub fn select_slot(&mut self, index: usize) -> Result<bool, InventoryError> {
        self.slots.check_index(index)?;
        self.select(index, self.quick_link_of(index))
    }

    /// Select through a quick slot. Empty quick slots are ignored.
    pub fn select_quick_slot(&mut self, quick: usize) -> Result<bool, InventoryError> {
        let Some(index) = self.quick_slot(quick)?.link else {
            return Ok(self.selection.is_some());
        };
        self.select(index, Some(quick))
    }

    fn select(&mut self, index: usize, quick: Option<usize>) -> Result<bool, InventoryError> {
        let Some(item) = self.slots.get(index)?.item().cloned() else {
            return Ok(self.selection.is_some());
        };

        let toggled_off = self.selection.as_ref().is_some_and(|s| s.slot == index);
        self.deselect();
        if toggled_off {
            return Ok(false);
        }

        self.notices.push(SelectionNotice::selected(index, item.clone()));
        self.selection = Some(Selection { slot: index, quick, item });
        Ok(true)
    }

    /// Clear the selection, queueing the matching release notice.
    /// Returns whether anything was selected.
    pub fn deselect(&mut self) -> bool {
        match self.selection.take() {
            Some(selection) => {
                self.notices
                    .push(SelectionNotice::deselected(selection.slot, selection.item));
                true
            }
            None => false,
        }
    }

    /// Remove units from the selected slot. Returns whether it emptied
    /// (which also clears the selection).
    pub fn reduce_selected(&mut self, amount: u32) -> Result<bool, InventoryError> {
        let index = self
            .selection
            .as_ref()
            .map(|s| s.slot)
            .ok_or(InventoryError::NothingSelected)?;
        Ok(self.reduce_quantity(index, amount)?.emptied)
    }

    /// Use one unit of a consumable, returning its effects. Other categories
    /// are left untouched and yield no effects.
    pub fn consume(&mut self, index: usize) -> Result<Vec<ConsumableEffect>, InventoryError> {
        let item = self
            .slots
            .get(index)?
            .item()
            .cloned()
            .ok_or(InventoryError::EmptySlot(index))?;

        if item.category() != ItemCategory::Consumable {
            return Ok(Vec::new());
        }

        self.reduce_quantity(index, 1)?;
        Ok(item.consumable_effects().to_vec())
    }

    /// Overwrite a main slot. Used by container transfers.
    pub(crate) fn replace_at(
        &mut self,
        index: usize,
        stack: Option<ItemStack>,
    ) -> Result<Option<ItemStack>, InventoryError> {
        let previous = self.slots.replace_at(index, stack)?;
        self.after_change(&[index]);
        Ok(previous)
    }

    /// Add units to an occupied main slot. Used by container transfers.
    pub(crate) fn grow(&mut self, index: usize, amount: u32) -> Result<u32, InventoryError> {
        let added = self.slots.grow(index, amount)?;
        self.after_change(&[index]);
        Ok(added)
    }

    /// Check that every quick slot mirrors its main slot.
    pub fn verify_mirrors(&self) -> Result<(), InventoryError> {
        for (quick, slot) in self.quick.iter().enumerate() {
            let Some(index) = slot.link else {
                if slot.stack().is_some() {
                    return Err(InventoryError::MirrorMismatch { quick, slot: usize::MAX });
                }
                continue;
            };
            let matches = match (self.slots.get(index)?.stack(), slot.stack()) {
                (Some(main), Some(cached)) => main.same_contents(cached),
                _ => false,
            };
            if !matches {
                return Err(InventoryError::MirrorMismatch { quick, slot: index });
            }
        }
        Ok(())
    }

    fn after_change(&mut self, touched: &[usize]) {
        for &index in touched {
            self.refresh_mirrors(index);
        }
        self.check_selection();
    }

    fn refresh_mirrors(&mut self, index: usize) {
        let stack = self.slots.get(index).ok().and_then(ItemSlot::stack).cloned();
        for quick in self.quick.iter_mut().filter(|q| q.link == Some(index)) {
            match &stack {
                Some(stack) if stack.item.category() != ItemCategory::Resource => {
                    quick.mirror(index, stack)
                }
                _ => quick.clear(),
            }
        }
    }

    /// Drop the selection when its slot no longer holds the selected item.
    fn check_selection(&mut self) {
        let stale = self.selection.as_ref().is_some_and(|selection| {
            self.slots
                .get(selection.slot)
                .map_or(true, |slot| !slot.holds(&selection.item))
        });
        if stale {
            self.deselect();
        }
    }
}
