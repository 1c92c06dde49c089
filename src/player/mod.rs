//! Player module - input, movement, camera, survival needs and held items.

mod components;
mod equip;
mod input;
mod movement;
mod needs;
mod plugin;

pub use components::*;
pub use equip::EquippedModel;
pub use input::{pressed_digit, PlayerInput};
pub use movement::{spawn_player, PlayerCamera};
pub use plugin::PlayerPlugin;
