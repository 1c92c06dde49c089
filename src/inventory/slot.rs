//! Slot primitives shared by the player inventory and storage containers.
//!
//! A [`SlotArray`] is a fixed-size arena: slots are created once and never
//! move, only their contents change. Indices into it stay valid for its
//! whole lifetime, which is what quick-slot back-references rely on.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::InventoryError;
use crate::items::{ItemDefinition, ItemRef};

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a slot, used by UI drag operations to find it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    fn next() -> Self {
        Self(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An item together with how many units of it a slot holds.
///
/// `quantity` is always in `1..=item.stack_limit()`.
#[derive(Clone, Debug)]
pub struct ItemStack {
    pub item: ItemRef,
    pub quantity: u32,
}

impl ItemStack {
    /// Create a stack, clamping the quantity to the item's limits.
    pub fn new(item: ItemRef, quantity: u32) -> Self {
        let quantity = quantity.clamp(1, item.stack_limit());
        Self { item, quantity }
    }

    pub fn single(item: ItemRef) -> Self {
        Self::new(item, 1)
    }

    /// Split `quantity` units into as many full stacks as needed, the last
    /// one holding the remainder.
    pub fn split(item: &ItemRef, quantity: u32) -> Vec<ItemStack> {
        let limit = item.stack_limit();
        let mut stacks = Vec::new();
        let mut left = quantity;
        while left > 0 {
            let size = left.min(limit);
            stacks.push(ItemStack::new(item.clone(), size));
            left -= size;
        }
        stacks
    }

    pub fn is_item(&self, item: &ItemDefinition) -> bool {
        self.item.id == item.id
    }

    /// Units that can still be added before the stack is full.
    pub fn room_left(&self) -> u32 {
        self.item.stack_limit().saturating_sub(self.quantity)
    }

    /// Whether `other` could be merged into this stack at all.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.item.stackable && self.is_item(&other.item) && self.room_left() > 0
    }

    pub fn same_contents(&self, other: &ItemStack) -> bool {
        self.is_item(&other.item) && self.quantity == other.quantity
    }
}

/// A single storage unit holding zero or one stack.
#[derive(Clone, Debug)]
pub struct ItemSlot {
    id: SlotId,
    stack: Option<ItemStack>,
}

impl Default for ItemSlot {
    fn default() -> Self {
        Self::empty()
    }
}

impl ItemSlot {
    pub fn empty() -> Self {
        Self {
            id: SlotId::next(),
            stack: None,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn stack(&self) -> Option<&ItemStack> {
        self.stack.as_ref()
    }

    pub fn item(&self) -> Option<&ItemRef> {
        self.stack.as_ref().map(|s| &s.item)
    }

    /// Quantity held, 0 for an empty slot.
    pub fn quantity(&self) -> u32 {
        self.stack.as_ref().map_or(0, |s| s.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_none()
    }

    pub fn holds(&self, item: &ItemDefinition) -> bool {
        self.stack.as_ref().is_some_and(|s| s.is_item(item))
    }

    pub(crate) fn set(&mut self, stack: Option<ItemStack>) -> Option<ItemStack> {
        std::mem::replace(&mut self.stack, stack)
    }

    pub(crate) fn take(&mut self) -> Option<ItemStack> {
        self.stack.take()
    }

    /// Add up to `amount` units, returning how many were added.
    pub(crate) fn add_quantity(&mut self, amount: u32) -> u32 {
        let Some(stack) = self.stack.as_mut() else {
            return 0;
        };
        let added = amount.min(stack.room_left());
        stack.quantity += added;
        added
    }

    /// Remove up to `amount` units, clearing the slot when it reaches 0.
    /// Returns how many were removed.
    pub(crate) fn remove_quantity(&mut self, amount: u32) -> u32 {
        let Some(stack) = self.stack.as_mut() else {
            return 0;
        };
        let removed = amount.min(stack.quantity);
        stack.quantity -= removed;
        if stack.quantity == 0 {
            self.stack = None;
        }
        removed
    }
}

/// Result of [`SlotArray::swap_or_stack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Units were merged into the target stack.
    Stacked { moved: u32, source_emptied: bool },
    /// The two slot payloads traded places.
    Swapped,
    /// Nothing to move (empty source, same index, or full target stack).
    Unchanged,
}

/// Result of [`SlotArray::reduce`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Reduction {
    pub removed: u32,
    pub emptied: bool,
}

/// Fixed-size array of slots with the add/remove/stack/swap primitives.
#[derive(Clone, Debug)]
pub struct SlotArray {
    slots: Vec<ItemSlot>,
}

impl SlotArray {
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| ItemSlot::empty()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(ItemSlot::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemSlot> {
        self.slots.iter()
    }

    pub fn get(&self, index: usize) -> Result<&ItemSlot, InventoryError> {
        self.slots.get(index).ok_or(InventoryError::SlotOutOfBounds {
            index,
            len: self.slots.len(),
        })
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut ItemSlot, InventoryError> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(InventoryError::SlotOutOfBounds { index, len })
    }

    pub fn check_index(&self, index: usize) -> Result<(), InventoryError> {
        self.get(index).map(|_| ())
    }

    pub fn position_of(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|s| s.id() == id)
    }

    /// First slot holding `item` with room left in its stack.
    pub fn find_stack(&self, item: &ItemDefinition) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.stack().is_some_and(|st| st.is_item(item) && st.room_left() > 0))
    }

    pub fn find_empty(&self) -> Option<usize> {
        self.slots.iter().position(ItemSlot::is_empty)
    }

    /// Add a single unit, stacking onto an existing slot first when the item
    /// is stackable. Returns the index that absorbed it.
    pub fn add_one(&mut self, item: &ItemRef) -> Option<usize> {
        if item.stackable {
            if let Some(index) = self.find_stack(item) {
                self.slots[index].add_quantity(1);
                return Some(index);
            }
        }

        let index = self.find_empty()?;
        self.slots[index].set(Some(ItemStack::single(item.clone())));
        Some(index)
    }

    /// Insert a whole stack, topping up existing stacks before using empty
    /// slots. Returns the touched indices and whatever did not fit.
    pub fn insert_stack(&mut self, stack: ItemStack) -> (Vec<usize>, Option<ItemStack>) {
        let mut touched = Vec::new();
        let mut remaining = stack.quantity;

        if stack.item.stackable {
            for (index, slot) in self.slots.iter_mut().enumerate() {
                if remaining == 0 {
                    break;
                }
                if slot.holds(&stack.item) {
                    let added = slot.add_quantity(remaining);
                    if added > 0 {
                        remaining -= added;
                        touched.push(index);
                    }
                }
            }
        }

        while remaining > 0 {
            let Some(index) = self.find_empty() else {
                break;
            };
            let placed = remaining.min(stack.item.stack_limit());
            self.slots[index].set(Some(ItemStack::new(stack.item.clone(), placed)));
            remaining -= placed;
            touched.push(index);
        }

        let leftover = (remaining > 0).then(|| ItemStack {
            item: stack.item,
            quantity: remaining,
        });
        (touched, leftover)
    }

    /// Clear a slot, returning what it held.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<ItemStack>, InventoryError> {
        Ok(self.get_mut(index)?.take())
    }

    /// Overwrite a slot's contents, returning the previous contents.
    pub fn replace_at(
        &mut self,
        index: usize,
        stack: Option<ItemStack>,
    ) -> Result<Option<ItemStack>, InventoryError> {
        Ok(self.get_mut(index)?.set(stack))
    }

    /// Remove up to `amount` units from one slot; the slot clears at 0.
    pub fn reduce(&mut self, index: usize, amount: u32) -> Result<Reduction, InventoryError> {
        let slot = self.get_mut(index)?;
        let was_full = !slot.is_empty();
        let removed = slot.remove_quantity(amount);
        Ok(Reduction {
            removed,
            emptied: was_full && slot.is_empty(),
        })
    }

    /// Add up to `amount` units to an occupied slot. Returns units added.
    pub fn grow(&mut self, index: usize, amount: u32) -> Result<u32, InventoryError> {
        Ok(self.get_mut(index)?.add_quantity(amount))
    }

    /// Merge `from` into `to` when both hold the same stackable item,
    /// otherwise swap their payloads.
    pub fn swap_or_stack(&mut self, from: usize, to: usize) -> Result<MoveOutcome, InventoryError> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to || self.slots[from].is_empty() {
            return Ok(MoveOutcome::Unchanged);
        }

        let mergeable = match (self.slots[from].stack(), self.slots[to].stack()) {
            (Some(source), Some(target)) => source.item.stackable && target.is_item(&source.item),
            _ => false,
        };

        if mergeable {
            let room = self.slots[to].stack().map_or(0, ItemStack::room_left);
            let moved = room.min(self.slots[from].quantity());
            if moved == 0 {
                return Ok(MoveOutcome::Unchanged);
            }
            self.slots[to].add_quantity(moved);
            self.slots[from].remove_quantity(moved);
            return Ok(MoveOutcome::Stacked {
                moved,
                source_emptied: self.slots[from].is_empty(),
            });
        }

        let source = self.slots[from].take();
        let target = self.slots[to].set(source);
        self.slots[from].set(target);
        Ok(MoveOutcome::Swapped)
    }

    /// Total units of `item` across all slots.
    pub fn count(&self, item: &ItemDefinition) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.holds(item))
            .map(ItemSlot::quantity)
            .sum()
    }

    /// Whether at least `quantity` units of `item` are held, stopping early.
    pub fn has_at_least(&self, item: &ItemDefinition, quantity: u32) -> bool {
        let mut total = 0;
        for slot in self.slots.iter().filter(|s| s.holds(item)) {
            total += slot.quantity();
            if total >= quantity {
                return true;
            }
        }
        quantity == 0
    }

    /// Remove `quantity` units of `item`, lowest index first, possibly
    /// spanning several slots. Does nothing when not enough is held.
    /// Returns the touched indices.
    pub fn deduct(&mut self, item: &ItemDefinition, quantity: u32) -> Vec<usize> {
        if !self.has_at_least(item, quantity) {
            return Vec::new();
        }

        let mut touched = Vec::new();
        let mut remaining = quantity;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if slot.holds(item) {
                remaining -= slot.remove_quantity(remaining);
                touched.push(index);
            }
        }
        touched
    }
}


#[cfg(test)]
mod tests {
    use super::test_items::*;
    use super::*;

    #[test]
    fn add_one_stacks_before_using_empty_slot() {
        let wood = resource("wood", 10);
        let mut slots = SlotArray::new(3);
        slots.replace_at(1, Some(ItemStack::new(wood.clone(), 3))).unwrap();

        assert_eq!(slots.add_one(&wood), Some(1));
        assert_eq!(slots.get(1).unwrap().quantity(), 4);
        assert!(slots.get(0).unwrap().is_empty());
    }

    #[test]
    fn add_one_fails_when_full() {
        let wood = resource("wood", 2);
        let mut slots = SlotArray::new(1);
        slots.replace_at(0, Some(ItemStack::new(wood.clone(), 2))).unwrap();

        assert_eq!(slots.add_one(&wood), None);
        assert_eq!(slots.count(&wood), 2);
    }

    #[test]
    fn swap_or_stack_merges_only_what_fits() {
        let wood = resource("wood", 10);
        let mut slots = SlotArray::new(2);
        slots.replace_at(0, Some(ItemStack::new(wood.clone(), 6))).unwrap();
        slots.replace_at(1, Some(ItemStack::new(wood.clone(), 7))).unwrap();

        let outcome = slots.swap_or_stack(0, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Stacked { moved: 3, source_emptied: false });
        assert_eq!(slots.get(0).unwrap().quantity(), 3);
        assert_eq!(slots.get(1).unwrap().quantity(), 10);
    }

    #[test]
    fn swap_or_stack_swaps_different_items() {
        let wood = resource("wood", 10);
        let stone = resource("stone", 10);
        let mut slots = SlotArray::new(2);
        slots.replace_at(0, Some(ItemStack::new(wood.clone(), 2))).unwrap();
        slots.replace_at(1, Some(ItemStack::new(stone.clone(), 5))).unwrap();

        assert_eq!(slots.swap_or_stack(0, 1).unwrap(), MoveOutcome::Swapped);
        assert!(slots.get(0).unwrap().holds(&stone));
        assert!(slots.get(1).unwrap().holds(&wood));
    }

    #[test]
    fn swap_or_stack_rejects_out_of_bounds() {
        let mut slots = SlotArray::new(2);
        let result = slots.swap_or_stack(0, 5);
        assert!(matches!(result, Err(InventoryError::SlotOutOfBounds { index: 5, len: 2 })));
    }

    #[test]
    fn deduct_spans_slots_oldest_first() {
        let wood = resource("wood", 10);
        let mut slots = SlotArray::new(3);
        slots.replace_at(0, Some(ItemStack::new(wood.clone(), 3))).unwrap();
        slots.replace_at(1, Some(ItemStack::new(wood.clone(), 4))).unwrap();

        let touched = slots.deduct(&wood, 5);
        assert_eq!(touched, vec![0, 1]);
        assert!(slots.get(0).unwrap().is_empty());
        assert_eq!(slots.get(1).unwrap().quantity(), 2);
        assert!(slots.get(2).unwrap().is_empty());
    }

    #[test]
    fn deduct_insufficient_changes_nothing() {
        let wood = resource("wood", 10);
        let mut slots = SlotArray::new(2);
        slots.replace_at(0, Some(ItemStack::new(wood.clone(), 3))).unwrap();

        assert!(slots.deduct(&wood, 4).is_empty());
        assert_eq!(slots.count(&wood), 3);
    }

    #[test]
    fn insert_stack_reports_leftover() {
        let stone = resource("stone", 5);
        let mut slots = SlotArray::new(2);
        slots.replace_at(0, Some(ItemStack::new(stone.clone(), 4))).unwrap();

        let oversized = ItemStack {
            item: stone.clone(),
            quantity: 9,
        };
        let (touched, leftover) = slots.insert_stack(oversized);
        assert_eq!(touched, vec![0, 1]);
        assert_eq!(slots.count(&stone), 10);
        assert_eq!(leftover.map(|s| s.quantity), Some(3));
    }

    #[test]
    fn slot_ids_are_unique_and_stable() {
        let wood = resource("wood", 10);
        let mut slots = SlotArray::new(2);
        let id = slots.get(1).unwrap().id();
        assert_ne!(id, slots.get(0).unwrap().id());

        slots.replace_at(1, Some(ItemStack::single(wood))).unwrap();
        slots.swap_or_stack(1, 0).unwrap();
        assert_eq!(slots.position_of(id), Some(1));
    }

    #[test]
    fn split_fills_whole_stacks_first() {
        let wood = resource("wood", 4);
        let sizes: Vec<u32> = ItemStack::split(&wood, 10).iter().map(|s| s.quantity).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert!(ItemStack::split(&wood, 0).is_empty());
    }
}
