//! Outpost - Entry Point
//!
//! Controls:
//! - WASD: Move, Shift: Sprint, Space: Jump
//! - Mouse: Look around
//! - 1-9: Quick slots (in the inventory: link the picked slot)
//! - Tab: Inventory, E: Interact, F: Use, G: Drop
//! - LMB (hold): Build, RMB: Demolish, R: Rotate
//! - Escape: Pause/Unpause

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Outpost".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))

        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())

        // Our game plugin
        .add_plugins(outpost::OutpostPlugin)

        .run();
}
