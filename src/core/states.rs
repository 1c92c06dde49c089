//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. Placement and
//! movement only run while exploring, the inventory window only while the
//! inventory play state is active.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` while item, recipe and config data is read
/// - Enter `InGame` once the data is in place
/// - `Paused` freezes gameplay but keeps the world visible
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Active gameplay
    InGame,
    /// Game is paused (overlay on gameplay)
    Paused,
}

/// Sub-states for gameplay - only active when GameState::InGame.
///
/// - `Exploring`: movement, building, interaction
/// - `Inventory`: inventory window (and any open container) is shown, cursor is free
#[derive(SubStates, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum PlayState {
    /// Normal gameplay
    #[default]
    Exploring,
    /// Inventory screen is open
    Inventory,
}
