//! Building plugin - placement previews, commits and socket bookkeeping.

use bevy::prelude::*;

use super::systems;

/// Building plugin - runs placement for the player and links placed structures.
pub struct BuildingPlugin;

impl Plugin for BuildingPlugin {
    fn build(&self, app: &mut App) {
        systems::setup_building_systems(app);
    }
}
