//! `WorldSpawner` and `PresentationSink` on top of Bevy commands.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{BuildAssets, BuildPreview, BuildProgressDisplay, Structure};
use super::placement::{PresentationSink, WorldSpawner};
use super::sockets::{StructureFootprint, StructureSocketSet};
use crate::core::GameConfig;
use crate::inventory::StorageContainer;
use crate::items::ItemRef;

/// Everything placement needs to change the world.
#[derive(SystemParam)]
pub struct BuildCommands<'w, 's> {
    commands: Commands<'w, 's>,
    asset_server: Res<'w, AssetServer>,
    meshes: ResMut<'w, Assets<Mesh>>,
    assets: ResMut<'w, BuildAssets>,
    progress: ResMut<'w, BuildProgressDisplay>,
    config: Res<'w, GameConfig>,
}

impl WorldSpawner for BuildCommands<'_, '_> {
    fn spawn_preview(&mut self, item: &ItemRef) -> Entity {
        let mut preview = self.commands.spawn((
            Name::new(format!("{} (preview)", item.display_name)),
            BuildPreview,
            Transform::default(),
            Visibility::default(),
        ));

        if let Some(spec) = item.building() {
            let mesh = self.assets.mesh_for(&mut self.meshes, &item.id, spec);
            preview.insert((Mesh3d(mesh), MeshMaterial3d(self.assets.blocked.clone())));

            if let Some(path) = &spec.preview_model {
                let scene = self.asset_server.load(path.clone());
                preview.with_children(|parent| {
                    parent.spawn(SceneRoot(scene));
                });
            }
        }

        preview.id()
    }

    fn move_preview(&mut self, preview: Entity, transform: &Transform) {
        if let Some(mut entity) = self.commands.get_entity(preview) {
            entity.try_insert(*transform);
        }
    }

    fn despawn_preview(&mut self, preview: Entity) {
        if let Some(entity) = self.commands.get_entity(preview) {
            entity.despawn_recursive();
        }
    }

    fn spawn_structure(&mut self, item: &ItemRef, transform: &Transform) -> Entity {
        let mut structure = self.commands.spawn((
            Name::new(item.display_name.clone()),
            Structure { item: item.clone() },
            *transform,
            Visibility::default(),
        ));

        let Some(spec) = item.building() else {
            warn!("{} has no building data; spawned an empty structure", item.id);
            return structure.id();
        };

        let center = spec.collider_center();
        let half = spec.half_extents();
        structure.insert((
            StructureSocketSet::from_templates(spec.socket_type, &spec.sockets, transform),
            StructureFootprint::new(transform, center, half),
            RigidBody::Fixed,
            Collider::compound(vec![(
                center,
                Quat::IDENTITY,
                Collider::cuboid(half.x, half.y, half.z),
            )]),
        ));

        match &spec.spawn_model {
            Some(path) => {
                let scene = self.asset_server.load(path.clone());
                structure.with_children(|parent| {
                    parent.spawn(SceneRoot(scene));
                });
            }
            None => {
                let mesh = self.assets.mesh_for(&mut self.meshes, &item.id, spec);
                structure.insert((Mesh3d(mesh), MeshMaterial3d(self.assets.structure.clone())));
            }
        }

        if let Some(slots) = spec.storage_slots {
            let slots = if slots == 0 {
                self.config.inventory.chest_slot_count
            } else {
                slots
            };
            structure.insert(StorageContainer::chest(slots));
        }

        structure.id()
    }

    fn despawn_structure(&mut self, structure: Entity) {
        if let Some(entity) = self.commands.get_entity(structure) {
            entity.despawn_recursive();
        }
    }
}

impl PresentationSink for BuildCommands<'_, '_> {
    fn set_preview_placeable(&mut self, preview: Entity, placeable: bool) {
        let material = if placeable {
            self.assets.placeable.clone()
        } else {
            self.assets.blocked.clone()
        };
        if let Some(mut entity) = self.commands.get_entity(preview) {
            entity.try_insert(MeshMaterial3d(material));
        }
    }

    fn set_progress(&mut self, fraction: f32) {
        self.progress.fraction = fraction.clamp(0.0, 1.0);
    }
}
