//! Error types for slot operations.
//!
//! These are precondition failures: the caller asked for something that a
//! correct caller never asks for. Systems log them and carry on.

use thiserror::Error;

use crate::items::ItemId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("slot index {index} out of bounds (len {len})")]
    SlotOutOfBounds { index: usize, len: usize },

    #[error("quick slot index {index} out of bounds (len {len})")]
    QuickSlotOutOfBounds { index: usize, len: usize },

    #[error("slot {0} is empty")]
    EmptySlot(usize),

    #[error("resource item '{0}' cannot be linked to a quick slot")]
    NotQuickEquippable(ItemId),

    #[error("no slot is selected")]
    NothingSelected,

    #[error("quick slot {quick} does not mirror main slot {slot}")]
    MirrorMismatch { quick: usize, slot: usize },
}
