//! `SpatialProbe` backed by the Rapier query pipeline.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::BuildPreview;
use super::placement::{ProbeHit, SpatialProbe};
use super::sockets::StructureSocketSet;
use crate::world::Terrain;

/// Look-ray and overlap queries for one player's placement.
pub struct RapierProbe<'a, 'w, 's> {
    pub context: &'a RapierContext,
    /// The player's own collider
    pub player: Entity,
    pub structures: &'a Query<'w, 's, &'static StructureSocketSet, Without<BuildPreview>>,
    pub terrain: &'a Query<'w, 's, (), With<Terrain>>,
}

impl SpatialProbe for RapierProbe<'_, '_, '_> {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit> {
        let filter = QueryFilter::default()
            .exclude_sensors()
            .exclude_collider(self.player);

        self.context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
            .map(|(entity, hit)| ProbeHit {
                entity,
                point: hit.point,
                normal: hit.normal,
            })
    }

    fn sockets(&self, entity: Entity) -> Option<&StructureSocketSet> {
        self.structures.get(entity).ok()
    }

    // Previews carry no collider, so only the player needs excluding
    fn overlaps(&self, _preview: Entity, center: Vec3, rotation: Quat, half_extents: Vec3) -> bool {
        let filter = QueryFilter::default()
            .exclude_sensors()
            .exclude_collider(self.player);
        let shape = Collider::cuboid(half_extents.x, half_extents.y, half_extents.z);

        let mut blocked = false;
        self.context
            .intersections_with_shape(center, rotation, &shape, filter, |entity| {
                if self.terrain.contains(entity) {
                    return true;
                }
                blocked = true;
                false
            });
        blocked
    }
}
