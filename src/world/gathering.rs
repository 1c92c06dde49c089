//! Tool swings against resource nodes, and hazard contact damage.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::resource::{Hazard, ResourceNode};
use crate::core::{GameplaySet, ItemPickupEvent, PlayState, WorldDropRequest};
use crate::inventory::SlotStore;
use crate::player::{Needs, Player, PlayerCamera, PlayerInput, ToolSwing};

/// Set up gathering and hazard systems.
pub fn setup_gathering_systems(app: &mut App) {
    app.add_systems(
        Update,
        swing_tool
            .in_set(GameplaySet::Actions)
            .run_if(in_state(PlayState::Exploring)),
    )
    .add_systems(Update, hurt_players_near_hazards.in_set(GameplaySet::Feedback));
}

/// Swing the selected tool. A gathering tool that hits a resource node takes
/// one hit's worth from it; whatever does not fit drops at the hit point.
#[allow(clippy::too_many_arguments)]
fn swing_tool(
    mut commands: Commands,
    time: Res<Time>,
    input: Res<PlayerInput>,
    rapier_context: Query<&RapierContext>,
    camera_query: Query<&GlobalTransform, With<PlayerCamera>>,
    mut players: Query<(Entity, &mut SlotStore, &mut ToolSwing), With<Player>>,
    mut nodes: Query<&mut ResourceNode>,
    mut drops: EventWriter<WorldDropRequest>,
    mut pickups: EventWriter<ItemPickupEvent>,
) {
    let Ok((player, mut store, mut swing)) = players.get_single_mut() else {
        return;
    };
    swing.tick(time.delta_secs());
    if !input.primary_pressed {
        return;
    }

    let Some(tool) = store.selection().and_then(|s| s.item.equip()).cloned() else {
        return;
    };
    if !swing.try_swing(tool.swing_cooldown) || !tool.gathers {
        return;
    }

    let Ok(camera) = camera_query.get_single() else {
        return;
    };
    let Ok(context) = rapier_context.get_single() else {
        return;
    };
    let Some((target, hit)) = context.cast_ray_and_get_normal(
        camera.translation(),
        camera.forward().as_vec3(),
        tool.reach,
        true,
        QueryFilter::default().exclude_collider(player),
    ) else {
        return;
    };
    let Ok(mut node) = nodes.get_mut(target) else {
        return;
    };

    let result = node.gather(&mut store);
    let item = node.item.clone();
    debug!("Hit {} node, {} left", item.id, node.capacity);

    if result.added > 0 {
        pickups.send(ItemPickupEvent {
            player,
            item: item.clone(),
            quantity: result.added,
        });
    }
    for stack in result.overflow {
        drops.send(WorldDropRequest {
            stack,
            position: hit.point + hit.normal * 0.3,
        });
    }

    if node.is_depleted() {
        info!("{} node used up", item.display_name);
        commands.entity(target).despawn_recursive();
    }
}

/// Damage players standing within a hazard's reach.
fn hurt_players_near_hazards(
    time: Res<Time>,
    mut hazards: Query<(&mut Hazard, &GlobalTransform)>,
    mut players: Query<(&mut Needs, &GlobalTransform), With<Player>>,
) {
    let dt = time.delta_secs();
    for (mut hazard, hazard_transform) in hazards.iter_mut() {
        for (mut needs, player_transform) in players.iter_mut() {
            let touching = hazard_transform
                .translation()
                .distance(player_transform.translation())
                <= hazard.reach;
            let Some(damage) = hazard.tick(touching, dt) else {
                continue;
            };
            if needs.take_damage(damage) {
                warn!("Player died to a hazard");
            } else {
                debug!("Hazard hit for {:.0}, health {:.0}", damage, needs.health.current);
            }
        }
    }
}
