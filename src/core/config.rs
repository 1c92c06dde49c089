//! Gameplay configuration loaded from external RON file.
//!
//! Allows tuning inventory sizes, placement behaviour and survival needs
//! without recompilation. Every section falls back to its defaults, so a
//! config file only has to list the values it changes.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;

const CONFIG_PATH: &str = "assets/data/config/game.ron";

/// Root configuration resource.
#[derive(Resource, Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub inventory: InventoryConfig,
    pub placement: PlacementConfig,
    pub interaction: InteractionConfig,
    pub needs: NeedsConfig,
    pub movement: MovementConfig,
}

/// Slot counts for the player and for containers.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub slot_count: usize,
    pub quick_slot_count: usize,
    pub bag_slot_count: usize,
    /// Used for placeable chests that do not declare their own size
    pub chest_slot_count: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            slot_count: 24,
            quick_slot_count: 6,
            bag_slot_count: 12,
            chest_slot_count: 16,
        }
    }
}

/// Build placement tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Seconds between placement re-evaluations (independent of frame rate)
    pub update_interval: f32,
    /// Maximum distance of the look probe
    pub max_distance: f32,
    /// Starting height offset of foundation previews above the terrain
    pub foundation_height: f32,
    /// Height change per unit of the secondary axis per second
    pub foundation_movement: f32,
    pub max_foundation_height: f32,
    /// Rotation applied to non-snapping previews per rotate input
    pub rotation_step_degrees: f32,
    /// Fraction of a socket offset applied when the host wall was snapped from its center
    pub center_offset_fraction: f32,
    /// Distance under which two sockets count as overlapping
    pub socket_overlap_radius: f32,
    /// Scale applied to the preview volume before the overlap check so flush neighbours pass
    pub overlap_shrink: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            update_interval: 0.03,
            max_distance: 5.0,
            foundation_height: 0.2,
            foundation_movement: 1.0,
            max_foundation_height: 3.0,
            rotation_step_degrees: 90.0,
            center_offset_fraction: 0.5,
            socket_overlap_radius: 0.15,
            overlap_shrink: 0.95,
        }
    }
}

/// Look-ray interaction with pickups and containers.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub max_distance: f32,
    /// Radius in which an existing dropped bag is reused instead of spawning a new one
    pub bag_reuse_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            max_distance: 3.0,
            bag_reuse_radius: 2.0,
        }
    }
}

/// A single survival need.
#[derive(Clone, Debug, Deserialize)]
pub struct NeedConfig {
    pub max: f32,
    pub start: f32,
    /// Amount lost per second
    pub decay_rate: f32,
}

/// Survival needs tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    pub health: NeedConfig,
    pub hunger: NeedConfig,
    pub thirst: NeedConfig,
    /// Health lost per second while hunger is empty
    pub starving_health_decay: f32,
    /// Health lost per second while thirst is empty
    pub dehydrated_health_decay: f32,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            health: NeedConfig {
                max: 100.0,
                start: 100.0,
                decay_rate: 0.0,
            },
            hunger: NeedConfig {
                max: 100.0,
                start: 100.0,
                decay_rate: 0.5,
            },
            thirst: NeedConfig {
                max: 100.0,
                start: 100.0,
                decay_rate: 0.8,
            },
            starving_health_decay: 1.0,
            dehydrated_health_decay: 1.5,
        }
    }
}

/// First-person controller tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub mouse_sensitivity: f32,
    pub invert_y: bool,
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    pub jump_force: f32,
    pub gravity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 1.5,
            invert_y: false,
            move_speed: 5.0,
            sprint_multiplier: 1.6,
            jump_force: 6.0,
            gravity: 15.0,
        }
    }
}

impl GameConfig {
    /// Parse a config from RON text.
    pub fn from_ron(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(contents)
    }

    /// Load game config from the RON file, falling back to defaults.
    pub fn load() -> Self {
        match fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => match Self::from_ron(&contents) {
                Ok(config) => {
                    info!("Loaded game config from {}", CONFIG_PATH);
                    config
                }
                Err(e) => {
                    error!("Failed to parse {}: {}. Using defaults.", CONFIG_PATH, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read {}: {}. Using defaults.", CONFIG_PATH, e);
                Self::default()
            }
        }
    }
}

/// System to load game config at startup.
pub fn load_game_config(mut commands: Commands) {
    commands.insert_resource(GameConfig::load());
}
