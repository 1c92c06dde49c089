//! UI module - HUD, inventory window and menus.

mod hud;
mod inventory_window;
mod pause_menu;
mod plugin;

pub use hud::HudRoot;
pub use inventory_window::{InventoryWindow, PickedSlot, SlotButton, SlotOwner};
pub use plugin::UiPlugin;
