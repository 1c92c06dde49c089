//! Held tool models.
//!
//! The model is spawned as a child of the player's camera when an equipable
//! item is selected and slides up into view.

use bevy::prelude::*;

use super::movement::PlayerCamera;
use crate::core::{GameplaySet, SmoothTransform};
use crate::inventory::{SelectionChanged, SelectionNotice};
use crate::items::ItemRef;

/// Resting offset of a held model relative to the camera.
const HELD_OFFSET: Vec3 = Vec3::new(0.3, -0.25, -0.5);
/// Where a freshly equipped model starts before sliding into view.
const LOWERED_OFFSET: Vec3 = Vec3::new(0.3, -0.8, -0.5);

/// The model of the item currently in hand.
#[derive(Component)]
pub struct EquippedModel {
    pub item: ItemRef,
}

/// Set up equip systems.
pub fn setup_equip_systems(app: &mut App) {
    app.add_systems(Update, update_equipped_model.in_set(GameplaySet::Feedback));
}

fn update_equipped_model(
    mut commands: Commands,
    mut events: EventReader<SelectionChanged>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    camera_query: Query<Entity, With<PlayerCamera>>,
    equipped: Query<(Entity, &EquippedModel)>,
) {
    for event in events.read() {
        match &event.notice {
            SelectionNotice::Equip { item, .. } => {
                for (entity, _) in equipped.iter() {
                    commands.entity(entity).despawn_recursive();
                }
                let Ok(camera) = camera_query.get_single() else {
                    continue;
                };

                let model_path = item.equip().and_then(|spec| spec.model.clone());
                commands.entity(camera).with_children(|parent| {
                    let mut model = parent.spawn((
                        Name::new(format!("{} (held)", item.display_name)),
                        EquippedModel { item: item.clone() },
                        Transform::from_translation(LOWERED_OFFSET),
                        SmoothTransform::new(10.0, 10.0).toward(HELD_OFFSET, Quat::IDENTITY),
                        Visibility::default(),
                    ));
                    match model_path {
                        Some(path) => {
                            model.with_children(|held| {
                                held.spawn((
                                    SceneRoot(asset_server.load(path)),
                                    Transform::from_scale(Vec3::splat(0.15)),
                                ));
                            });
                        }
                        None => {
                            model.insert((
                                Mesh3d(meshes.add(Cuboid::new(0.08, 0.08, 0.5))),
                                MeshMaterial3d(materials.add(Color::srgb(0.5, 0.45, 0.4))),
                            ));
                        }
                    }
                });
                info!("Equipped {}", item.display_name);
            }
            SelectionNotice::Unequip { item, .. } => {
                for (entity, _) in equipped.iter() {
                    commands.entity(entity).despawn_recursive();
                }
                debug!("Unequipped {}", item.display_name);
            }
            _ => {}
        }
    }
}
