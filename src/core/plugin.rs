//! Core plugin that sets up game states, events, config and frame ordering.

use bevy::prelude::*;

use super::config::load_game_config;
use super::events::*;
use super::states::*;
use super::tween::*;

/// Frame phases shared by every gameplay area.
///
/// - `Input`: read devices into the input snapshot
/// - `Actions`: mutate inventories, run placement, crafting, interaction
/// - `Notices`: forward selection side effects queued during `Actions`
/// - `Feedback`: react to those (equip, start placement) and refresh visuals
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    Input,
    Actions,
    Notices,
    Feedback,
}

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, InGame, Paused) and the play sub-state
/// - Global events (structure placed/removed, drops, pickups)
/// - The `GameConfig` resource
/// - Basic game flow systems
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()
            .add_sub_state::<PlayState>()

            // Register global events
            .add_event::<StructurePlaced>()
            .add_event::<StructureRemoved>()
            .add_event::<WorldDropRequest>()
            .add_event::<BagDropRequest>()
            .add_event::<ItemPickupEvent>()

            // Config has to exist before any other startup system reads it
            .add_systems(PreStartup, load_game_config)

            .configure_sets(
                Update,
                (
                    GameplaySet::Input,
                    GameplaySet::Actions,
                    GameplaySet::Notices,
                    GameplaySet::Feedback,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            )

            // Data is read during Startup, so the first Update can start play
            .add_systems(Update, finish_loading.run_if(in_state(GameState::Loading)))

            // Pause/unpause with Escape key
            .add_systems(
                Update,
                handle_pause_input
                    .run_if(in_state(GameState::InGame).or(in_state(GameState::Paused))),
            )

            .add_systems(Update, update_smooth_transforms);
    }
}

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    info!("Data loaded, entering game");
    next_state.set(GameState::InGame);
}

/// Handle Escape key to pause/unpause the game.
fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current_state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        match current_state.get() {
            GameState::InGame => next_state.set(GameState::Paused),
            GameState::Paused => next_state.set(GameState::InGame),
            GameState::Loading => {}
        }
    }
}
