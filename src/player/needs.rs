//! Survival needs - decay over time and consumable effects.

use bevy::prelude::*;

use super::components::{Needs, Player};
use crate::core::{GameConfig, GameplaySet};
use crate::inventory::ItemConsumed;

/// Set up needs systems.
pub fn setup_needs_systems(app: &mut App) {
    app.add_systems(
        Update,
        (apply_consumed_items, decay_needs)
            .chain()
            .in_set(GameplaySet::Feedback),
    );
}

fn apply_consumed_items(mut events: EventReader<ItemConsumed>, mut query: Query<&mut Needs>) {
    for event in events.read() {
        if let Ok(mut needs) = query.get_mut(event.player) {
            needs.apply(&event.effects);
            debug!(
                "Needs now health {:.0} hunger {:.0} thirst {:.0}",
                needs.health.current, needs.hunger.current, needs.thirst.current
            );
        }
    }
}

fn decay_needs(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut query: Query<&mut Needs, With<Player>>,
) {
    let dt = time.delta_secs();
    for mut needs in query.iter_mut() {
        let was_alive = !needs.is_dead();
        needs.decay(&config.needs, dt);
        if was_alive && needs.is_dead() {
            warn!("Player died of hunger or thirst");
        }
    }
}
