//! UI plugin - HUD, inventory window and pause menu.

use bevy::prelude::*;

use super::{hud, inventory_window, pause_menu};

/// UI plugin - handles all user interface.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        hud::setup_hud_systems(app);
        inventory_window::setup_inventory_window_systems(app);
        pause_menu::setup_pause_menu_systems(app);
    }
}
