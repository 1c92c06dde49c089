//! ECS-facing building components and resources.

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::items::{BuildingSpec, ItemId, ItemRef};

/// A committed structure and the item it was built from.
#[derive(Component, Clone, Debug)]
pub struct Structure {
    pub item: ItemRef,
}

/// Marker for the ghost shown while placing.
#[derive(Component)]
#[require(NotShadowCaster)]
pub struct BuildPreview;

/// Hold progress of the current commit, for the HUD.
#[derive(Resource, Default, Debug)]
pub struct BuildProgressDisplay {
    pub fraction: f32,
}

/// Materials for previews and plain structures, plus one box mesh per building item.
#[derive(Resource)]
pub struct BuildAssets {
    pub placeable: Handle<StandardMaterial>,
    pub blocked: Handle<StandardMaterial>,
    pub structure: Handle<StandardMaterial>,
    meshes: HashMap<ItemId, Handle<Mesh>>,
}

impl BuildAssets {
    /// Box matching the building's collider, built once per item.
    pub fn mesh_for(
        &mut self,
        meshes: &mut Assets<Mesh>,
        id: &ItemId,
        spec: &BuildingSpec,
    ) -> Handle<Mesh> {
        self.meshes
            .entry(id.clone())
            .or_insert_with(|| {
                let (x, y, z) = spec.size;
                meshes.add(Mesh::from(Cuboid::new(x, y, z)).translated_by(spec.collider_center()))
            })
            .clone()
    }
}

impl FromWorld for BuildAssets {
    fn from_world(world: &mut World) -> Self {
        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();

        let ghost = |color: Color| StandardMaterial {
            base_color: color,
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        };

        Self {
            placeable: materials.add(ghost(Color::srgba(0.3, 0.9, 0.4, 0.4))),
            blocked: materials.add(ghost(Color::srgba(0.9, 0.25, 0.2, 0.4))),
            structure: materials.add(StandardMaterial {
                base_color: Color::srgb(0.55, 0.4, 0.25),
                perceptual_roughness: 0.85,
                ..default()
            }),
            meshes: HashMap::new(),
        }
    }
}
