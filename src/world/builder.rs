//! Site construction from data.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::data::{
    resolve_stacks, HazardPlacement, NodeShape, ResourceNodePlacement, SiteDefinition,
};
use super::resource::{Hazard, ResourceNode};
use crate::core::GameConfig;
use crate::inventory::{spawn_world_item, DropAssets, ItemStack, SlotStore, StorageContainer};
use crate::items::ItemCatalog;

/// Ground the player walks and builds on. Placement overlap checks ignore it.
#[derive(Component)]
pub struct Terrain;

/// Marker for everything spawned from the site definition.
#[derive(Component)]
pub struct SiteGeometry;

/// Spawn ground, lights, pickups and chests. Returns the player's starting inventory.
#[allow(clippy::too_many_arguments)]
pub fn build_site(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    site: &SiteDefinition,
    catalog: &ItemCatalog,
    drop_assets: &DropAssets,
    asset_server: &AssetServer,
    config: &GameConfig,
) -> SlotStore {
    setup_environment(commands, site);
    spawn_ground(commands, meshes, materials, site);

    for pickup in &site.pickups {
        let Some(item) = catalog.get(&pickup.item) else {
            warn!("Skipping pickup of unknown item '{}'", pickup.item);
            continue;
        };
        for (index, stack) in ItemStack::split(item, pickup.quantity).into_iter().enumerate() {
            let position = Vec3::from(pickup.position) + Vec3::Y * (index as f32 * 0.3);
            let entity = spawn_world_item(commands, drop_assets, asset_server, stack, position);
            commands.entity(entity).insert(SiteGeometry);
        }
    }

    for placement in &site.resource_nodes {
        let Some(item) = catalog.get(&placement.item) else {
            warn!("Skipping node of unknown item '{}'", placement.item);
            continue;
        };
        let node = ResourceNode::new(item.clone(), placement.per_hit, placement.capacity);
        spawn_resource_node(commands, meshes, materials, placement, node);
    }

    for placement in &site.hazards {
        spawn_hazard(commands, meshes, materials, placement);
    }

    let chest_mesh = meshes.add(Cuboid::new(1.0, 0.7, 0.6));
    let chest_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.5, 0.32, 0.18),
        perceptual_roughness: 0.8,
        ..default()
    });
    for placement in &site.chests {
        let mut chest = StorageContainer::chest(config.inventory.chest_slot_count);
        for stack in resolve_stacks(&placement.contents, catalog) {
            if let Some(leftover) = chest.insert_stack(stack) {
                warn!(
                    "Starter chest is full; {} x{} left out",
                    leftover.item.id, leftover.quantity
                );
            }
        }

        commands.spawn((
            Name::new("Chest"),
            SiteGeometry,
            chest,
            Transform::from_translation(Vec3::from(placement.position) + Vec3::Y * 0.35)
                .with_rotation(Quat::from_rotation_y(placement.yaw_degrees.to_radians())),
            Mesh3d(chest_mesh.clone()),
            MeshMaterial3d(chest_material.clone()),
            RigidBody::Fixed,
            Collider::cuboid(0.5, 0.35, 0.3),
        ));
    }

    let mut inventory =
        SlotStore::new(config.inventory.slot_count, config.inventory.quick_slot_count);
    for stack in resolve_stacks(&site.starting_inventory, catalog) {
        if let Some(leftover) = inventory.insert_stack(stack) {
            warn!(
                "Starting inventory is full; {} x{} left out",
                leftover.item.id, leftover.quantity
            );
        }
    }
    inventory
}

fn spawn_resource_node(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    placement: &ResourceNodePlacement,
    node: ResourceNode,
) {
    let (mesh, color, half_height, collider) = match placement.shape {
        NodeShape::Tree => (
            meshes.add(Cylinder::new(0.35, 4.0)),
            Color::srgb(0.4, 0.28, 0.15),
            2.0,
            Collider::cylinder(2.0, 0.35),
        ),
        NodeShape::Rock => (
            meshes.add(Sphere::new(0.8)),
            Color::srgb(0.5, 0.5, 0.52),
            0.4,
            Collider::ball(0.8),
        ),
        NodeShape::Bush => (
            meshes.add(Sphere::new(0.6)),
            Color::srgb(0.25, 0.45, 0.2),
            0.5,
            Collider::ball(0.6),
        ),
    };

    commands.spawn((
        Name::new(format!("{} node", node.item.display_name)),
        SiteGeometry,
        node,
        Transform::from_translation(Vec3::from(placement.position) + Vec3::Y * half_height),
        Mesh3d(mesh),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        })),
        RigidBody::Fixed,
        collider,
    ));
}

fn spawn_hazard(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    placement: &HazardPlacement,
) {
    commands.spawn((
        Name::new("Cactus"),
        SiteGeometry,
        Hazard::new(placement.damage, placement.interval, placement.reach),
        Transform::from_translation(Vec3::from(placement.position) + Vec3::Y * 0.75),
        Mesh3d(meshes.add(Capsule3d::new(0.3, 0.9))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.55, 0.25),
            ..default()
        })),
        RigidBody::Fixed,
        Collider::capsule_y(0.45, 0.3),
    ));
}

/// Set up ambient light and the sun.
fn setup_environment(commands: &mut Commands, site: &SiteDefinition) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: site.ambient_brightness,
    });

    let (pitch, yaw) = site.sun.angles;
    commands.spawn((
        Name::new("Sun"),
        SiteGeometry,
        DirectionalLight {
            illuminance: site.sun.illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            0.0,
        )),
    ));
}

fn spawn_ground(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    site: &SiteDefinition,
) {
    let (width, depth) = site.ground_size;
    let (r, g, b) = site.ground_color;

    commands.spawn((
        Name::new("Ground"),
        Terrain,
        SiteGeometry,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(width, depth))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::default(),
        RigidBody::Fixed,
        // Thin slab whose top face is the plane
        Collider::compound(vec![(
            Vec3::Y * -0.1,
            Quat::IDENTITY,
            Collider::cuboid(width * 0.5, 0.1, depth * 0.5),
        )]),
    ));
}
