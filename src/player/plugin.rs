//! Player plugin - input, movement, camera, needs and held items.

use bevy::prelude::*;

use super::input::{read_player_input, PlayerInput};
use super::{equip, movement, needs};
use crate::core::GameplaySet;

/// Player plugin - handles input, movement, survival needs and equip models.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .add_systems(Update, read_player_input.in_set(GameplaySet::Input));

        movement::setup_movement_systems(app);
        needs::setup_needs_systems(app);
        equip::setup_equip_systems(app);
    }
}
