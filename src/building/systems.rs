//! Building systems - placement, structure linking and demolition cleanup.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::commands::BuildCommands;
use super::components::*;
use super::placement::{BuildInput, BuildOutcome, BuildPlacementController};
use super::probe::RapierProbe;
use super::sockets::{
    connect_structures, disconnect_structures, PlacedStructure, StructureFootprint,
    StructureSocketSet,
};
use crate::core::{
    GameConfig, GameplaySet, PlayState, StructurePlaced, StructureRemoved, WorldDropRequest,
};
use crate::inventory::{SelectionChanged, SelectionNotice, SlotStore, StorageContainer};
use crate::player::{Player, PlayerCamera, PlayerInput};
use crate::world::Terrain;

/// Configure building systems.
pub fn setup_building_systems(app: &mut App) {
    app.init_resource::<BuildAssets>()
        .init_resource::<BuildProgressDisplay>()

        .add_systems(
            Update,
            update_placement
                .in_set(GameplaySet::Actions)
                .run_if(in_state(PlayState::Exploring)),
        )

        .add_systems(
            Update,
            (
                react_to_selection,
                release_removed_structures,
                link_placed_structures,
            )
                .chain()
                .in_set(GameplaySet::Feedback),
        );
}

/// Start or stop placement when the selection changes.
fn react_to_selection(
    mut events: EventReader<SelectionChanged>,
    config: Res<GameConfig>,
    mut players: Query<&mut BuildPlacementController>,
    mut build: BuildCommands,
) {
    for event in events.read() {
        let Ok(mut controller) = players.get_mut(event.player) else {
            continue;
        };

        match &event.notice {
            SelectionNotice::StartPlacement { slot, item } => {
                controller.begin(item.clone(), *slot, &mut build, &config.placement);
            }
            SelectionNotice::CancelPlacement { .. } => {
                controller.cancel(&mut build);
            }
            _ => {}
        }
    }
}

/// Drive the placement controller from this frame's input.
#[allow(clippy::too_many_arguments)]
fn update_placement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    rapier_context: Query<&RapierContext>,
    camera_query: Query<&GlobalTransform, With<PlayerCamera>>,
    mut players: Query<(Entity, &mut BuildPlacementController, &mut SlotStore), With<Player>>,
    structures: Query<&'static StructureSocketSet, Without<BuildPreview>>,
    terrain: Query<(), With<Terrain>>,
    containers: Query<(&StorageContainer, &GlobalTransform), With<Structure>>,
    mut build: BuildCommands,
    mut placed: EventWriter<StructurePlaced>,
    mut removed: EventWriter<StructureRemoved>,
    mut drops: EventWriter<WorldDropRequest>,
) {
    let Ok((player, mut controller, mut store)) = players.get_single_mut() else {
        return;
    };
    if !controller.is_active() {
        return;
    }
    let Ok(camera) = camera_query.get_single() else {
        return;
    };
    let Ok(context) = rapier_context.get_single() else {
        return;
    };

    let build_input = BuildInput {
        origin: camera.translation(),
        direction: camera.forward().as_vec3(),
        build_pressed: input.primary_pressed,
        build_held: input.primary_held,
        demolish_pressed: input.secondary_pressed,
        rotate_pressed: input.rotate_pressed,
        height_axis: -input.look.y,
        delta: time.delta_secs(),
    };
    let probe = RapierProbe {
        context,
        player,
        structures: &structures,
        terrain: &terrain,
    };

    match controller.update(&build_input, &probe, &mut build, &mut store, &config.placement) {
        BuildOutcome::Committed { structure, item, .. } => {
            placed.send(StructurePlaced {
                structure,
                item,
                player,
            });
        }
        BuildOutcome::Demolished(structure) => {
            // Whatever a demolished chest held falls out where it stood
            if let Ok((container, transform)) = containers.get(structure) {
                let origin = transform.translation() + Vec3::Y * 0.5;
                let stacks = container.slots().iter().filter_map(|s| s.stack());
                for (index, stack) in stacks.enumerate() {
                    let spread = Quat::from_rotation_y(index as f32 * 0.9) * Vec3::X * 0.4;
                    drops.send(WorldDropRequest {
                        stack: stack.clone(),
                        position: origin + spread,
                    });
                }
            }
            removed.send(StructureRemoved { structure });
        }
        _ => {}
    }
}

/// Link sockets of newly placed structures against their neighbours.
fn link_placed_structures(
    config: Res<GameConfig>,
    added: Query<Entity, Added<StructureSocketSet>>,
    mut structures: Query<(Entity, &mut StructureSocketSet, &StructureFootprint)>,
) {
    let fresh: Vec<Entity> = added.iter().collect();
    if fresh.is_empty() {
        return;
    }

    let radius = config.placement.socket_overlap_radius;
    let bounds: Vec<(Entity, Vec3, f32)> = structures
        .iter()
        .map(|(entity, _, footprint)| (entity, footprint.center, footprint.half_extents.length()))
        .collect();

    for (i, &entity) in fresh.iter().enumerate() {
        let Some(&(_, center, reach)) = bounds.iter().find(|(e, ..)| *e == entity) else {
            continue;
        };

        let mut links = 0;
        for &(other, other_center, other_reach) in &bounds {
            // Earlier fresh structures already linked with this one
            if other == entity || fresh[..i].contains(&other) {
                continue;
            }
            if center.distance(other_center) > reach + other_reach + radius {
                continue;
            }

            let Ok([(a, mut a_sockets, a_footprint), (b, mut b_sockets, b_footprint)]) =
                structures.get_many_mut([entity, other])
            else {
                continue;
            };
            links += connect_structures(
                &mut PlacedStructure {
                    entity: a,
                    sockets: &mut a_sockets,
                    footprint: a_footprint,
                },
                &mut PlacedStructure {
                    entity: b,
                    sockets: &mut b_sockets,
                    footprint: b_footprint,
                },
                radius,
            );
        }
        debug!("Structure {:?} made {} socket links", entity, links);
    }
}

/// Free every socket a demolished structure was holding.
fn release_removed_structures(
    mut events: EventReader<StructureRemoved>,
    mut structures: Query<(Entity, &mut StructureSocketSet)>,
) {
    for event in events.read() {
        for (entity, mut sockets) in structures.iter_mut() {
            if entity == event.structure {
                continue;
            }
            let freed = disconnect_structures(event.structure, &mut sockets);
            if freed > 0 {
                debug!("Freed {} sockets on {:?}", freed, entity);
            }
        }
    }
}
