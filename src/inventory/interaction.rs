//! Look-ray interaction with loose items and containers, and spawning of
//! dropped items and bags.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use super::components::{OpenContainer, WorldItem};
use super::container::StorageContainer;
use super::slot::ItemStack;
use super::store::SlotStore;
use crate::core::{GameConfig, ItemPickupEvent, PlayState, WorldDropRequest};
use crate::player::{Player, PlayerCamera, PlayerInput};

/// Shared meshes and materials for things lying on the ground.
#[derive(Resource)]
pub struct DropAssets {
    item_mesh: Handle<Mesh>,
    item_material: Handle<StandardMaterial>,
    bag_mesh: Handle<Mesh>,
    bag_material: Handle<StandardMaterial>,
}

impl FromWorld for DropAssets {
    fn from_world(world: &mut World) -> Self {
        let (item_mesh, bag_mesh) = {
            let mut meshes = world.resource_mut::<Assets<Mesh>>();
            (
                meshes.add(Cuboid::new(0.25, 0.25, 0.25)),
                meshes.add(Cuboid::new(0.5, 0.4, 0.5)),
            )
        };

        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let item_material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.8, 0.7, 0.4),
            ..default()
        });
        let bag_material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.45, 0.3, 0.2),
            perceptual_roughness: 0.9,
            ..default()
        });

        Self {
            item_mesh,
            item_material,
            bag_mesh,
            bag_material,
        }
    }
}

/// Spawn a loose stack at `position`.
pub fn spawn_world_item(
    commands: &mut Commands,
    assets: &DropAssets,
    asset_server: &AssetServer,
    stack: ItemStack,
    position: Vec3,
) -> Entity {
    let yaw = rand::thread_rng().gen_range(0.0..std::f32::consts::TAU);
    let model = stack.item.drop_model.clone();
    let name = Name::new(format!("{} x{}", stack.item.display_name, stack.quantity));

    let mut entity = commands.spawn((
        name,
        WorldItem { stack },
        Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
        Visibility::default(),
        Collider::cuboid(0.2, 0.2, 0.2),
        Sensor,
    ));

    match model {
        Some(path) => {
            entity.with_children(|parent| {
                parent.spawn(SceneRoot(asset_server.load(path)));
            });
        }
        None => {
            entity.insert((
                Mesh3d(assets.item_mesh.clone()),
                MeshMaterial3d(assets.item_material.clone()),
            ));
        }
    }

    entity.id()
}

/// Spawn a dropped bag holding `bag`.
pub fn spawn_bag(
    commands: &mut Commands,
    assets: &DropAssets,
    position: Vec3,
    bag: StorageContainer,
) -> Entity {
    commands
        .spawn((
            Name::new("Dropped bag"),
            bag,
            Transform::from_translation(position + Vec3::Y * 0.2),
            Visibility::default(),
            Mesh3d(assets.bag_mesh.clone()),
            MeshMaterial3d(assets.bag_material.clone()),
            Collider::cuboid(0.25, 0.2, 0.25),
            Sensor,
        ))
        .id()
}

/// Spawn requested world drops.
pub fn spawn_world_drops(
    mut commands: Commands,
    assets: Res<DropAssets>,
    asset_server: Res<AssetServer>,
    mut requests: EventReader<WorldDropRequest>,
) {
    for request in requests.read() {
        info!(
            "Dropping {} x{} into the world",
            request.stack.item.id, request.stack.quantity
        );
        spawn_world_item(
            &mut commands,
            &assets,
            &asset_server,
            request.stack.clone(),
            request.position,
        );
    }
}

/// Pick up what the player looks at, or open the container they look at.
#[allow(clippy::too_many_arguments)]
pub fn interact(
    mut commands: Commands,
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    rapier_context: Query<&RapierContext>,
    camera_query: Query<&GlobalTransform, With<PlayerCamera>>,
    mut player_query: Query<(Entity, &mut SlotStore), With<Player>>,
    mut items: Query<&mut WorldItem>,
    mut containers: Query<&mut StorageContainer>,
    mut open: ResMut<OpenContainer>,
    mut next_state: ResMut<NextState<PlayState>>,
    mut pickups: EventWriter<ItemPickupEvent>,
) {
    if !input.interact_pressed {
        return;
    }
    let Ok((player, mut store)) = player_query.get_single_mut() else {
        return;
    };
    let Ok(camera) = camera_query.get_single() else {
        return;
    };
    let Ok(context) = rapier_context.get_single() else {
        return;
    };

    let Some((target, _)) = context.cast_ray(
        camera.translation(),
        camera.forward().as_vec3(),
        config.interaction.max_distance,
        true,
        QueryFilter::default().exclude_collider(player),
    ) else {
        return;
    };

    if let Ok(mut item) = items.get_mut(target) {
        let offered = item.stack.quantity;
        let taken = match store.insert_stack(item.stack.clone()) {
            None => {
                commands.entity(target).despawn_recursive();
                offered
            }
            Some(leftover) => {
                let taken = offered - leftover.quantity;
                item.stack = leftover;
                taken
            }
        };

        if taken == 0 {
            debug!("No room for {}", item.stack.item.id);
            return;
        }
        info!("Picked up {} x{}", item.stack.item.display_name, taken);
        pickups.send(ItemPickupEvent {
            player,
            item: item.stack.item.clone(),
            quantity: taken,
        });
        return;
    }

    if let Ok(mut container) = containers.get_mut(target) {
        if container.user().is_some_and(|user| user != player) {
            debug!("Container {:?} is in use", target);
            return;
        }
        container.open(player);
        open.0 = Some(target);
        next_state.set(PlayState::Inventory);
        info!("Opened {:?} container", container.kind());
    }
}
