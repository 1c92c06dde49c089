//! Core game module - states, events, config, and fundamental systems.
//!
//! This module provides the foundation that all other game systems build upon.

mod config;
mod events;
mod plugin;
mod states;
mod tween;

pub use config::*;
pub use events::*;
pub use plugin::{CorePlugin, GameplaySet};
pub use states::*;
pub use tween::*;
