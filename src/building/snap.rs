//! Nearest-socket search and snap transform resolution.

use bevy::prelude::*;

use super::sockets::{SocketPoint, SocketType, StructureSocketSet};
use crate::core::PlacementConfig;

/// The socket chosen for a snap, with the transform the preview takes.
#[derive(Clone, Copy, Debug)]
pub struct SnapTarget {
    pub index: usize,
    pub transform: Transform,
}

/// Matches a building against the sockets of the structure it points at.
#[derive(Clone, Copy, Debug)]
pub struct SnapMatcher {
    /// Share of a socket offset applied when the host wall was centered
    pub center_offset_fraction: f32,
}

impl Default for SnapMatcher {
    fn default() -> Self {
        Self {
            center_offset_fraction: 0.5,
        }
    }
}

impl From<&PlacementConfig> for SnapMatcher {
    fn from(config: &PlacementConfig) -> Self {
        Self {
            center_offset_fraction: config.center_offset_fraction,
        }
    }
}

impl SnapMatcher {
    /// Closest available socket of `desired` type to `query`. Ties keep the
    /// socket that comes first.
    pub fn find_nearest<'a>(
        &self,
        sockets: &'a StructureSocketSet,
        query: Vec3,
        desired: SocketType,
    ) -> Option<(usize, &'a SocketPoint)> {
        let mut closest: Option<(usize, &SocketPoint, f32)> = None;

        for (index, socket) in sockets.available_of(desired) {
            let distance = socket.position.distance(query);
            if closest.map_or(true, |(_, _, best)| distance < best) {
                closest = Some((index, socket, distance));
            }
        }

        closest.map(|(index, socket, _)| (index, socket))
    }

    /// Transform a `building` type takes when snapped to `socket` of `host`.
    ///
    /// The preview faces along the socket normal. Floors hanging off a wall
    /// are pushed out by the socket offset, scaled down when the wall sits
    /// centered between two structures.
    pub fn resolve(
        &self,
        host: &StructureSocketSet,
        socket: &SocketPoint,
        building: SocketType,
    ) -> Transform {
        let facing = Vec3::new(socket.normal.x, 0.0, socket.normal.z).normalize_or_zero();
        let rotation = if facing == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_y(facing.x.atan2(facing.z))
        };

        let mut offset = 0.0;
        if building == SocketType::Floor && host.build_type() == SocketType::Wall {
            offset = if host.snapped_from_center() {
                socket.offset * self.center_offset_fraction
            } else {
                socket.offset
            };
        }

        Transform::from_translation(socket.snap_position() + facing * offset)
            .with_rotation(rotation)
    }

    /// Find the nearest socket and resolve it in one go.
    pub fn snap(
        &self,
        host: &StructureSocketSet,
        query: Vec3,
        building: SocketType,
    ) -> Option<SnapTarget> {
        let (index, socket) = self.find_nearest(host, query, building)?;
        Some(SnapTarget {
            index,
            transform: self.resolve(host, socket, building),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::sockets::Occupant;

    fn wall_host() -> StructureSocketSet {
        let mut set = StructureSocketSet::new(SocketType::Wall);
        set.push(SocketPoint::new(Vec3::new(0.4, 0.0, 0.0), Vec3::Z, SocketType::Wall));
        set.push(SocketPoint::new(Vec3::new(1.2, 0.0, 0.0), Vec3::Z, SocketType::Wall));
        set.push(SocketPoint::new(Vec3::new(0.1, 0.0, 0.0), Vec3::Z, SocketType::Door));
        set
    }

    #[test]
    fn nearest_of_matching_type() {
        let set = wall_host();
        let (index, _) = SnapMatcher::default()
            .find_nearest(&set, Vec3::ZERO, SocketType::Wall)
            .unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn occupied_socket_is_skipped() {
        let mut set = wall_host();
        set.occupy(0, Occupant::Structure(Entity::from_raw(1)));

        let matcher = SnapMatcher::default();
        let (index, _) = matcher.find_nearest(&set, Vec3::ZERO, SocketType::Wall).unwrap();
        assert_eq!(index, 1);

        set.occupy(1, Occupant::Structure(Entity::from_raw(1)));
        assert!(matcher.find_nearest(&set, Vec3::ZERO, SocketType::Wall).is_none());
    }

    #[test]
    fn ties_go_to_first_socket() {
        let mut set = StructureSocketSet::new(SocketType::Floor);
        set.push(SocketPoint::new(Vec3::X, Vec3::Z, SocketType::Floor));
        set.push(SocketPoint::new(Vec3::NEG_X, Vec3::Z, SocketType::Floor));

        let matcher = SnapMatcher::default();
        for _ in 0..3 {
            let (index, _) = matcher.find_nearest(&set, Vec3::ZERO, SocketType::Floor).unwrap();
            assert_eq!(index, 0);
        }
    }

    #[test]
    fn resolve_faces_socket_normal() {
        let mut set = StructureSocketSet::new(SocketType::Floor);
        set.push(SocketPoint::new(Vec3::new(1.0, 0.0, 1.0), Vec3::X, SocketType::Wall));

        let transform = SnapMatcher::default().resolve(&set, set.get(0).unwrap(), SocketType::Wall);

        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 1.0));
        assert!((transform.rotation * Vec3::Z).distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn floor_on_centered_wall_takes_partial_offset() {
        let mut wall = StructureSocketSet::new(SocketType::Wall);
        wall.push(
            SocketPoint::new(Vec3::new(0.0, 2.0, 0.0), Vec3::Z, SocketType::Floor).with_offset(0.2),
        );
        let matcher = SnapMatcher { center_offset_fraction: 0.5 };

        let full = matcher.resolve(&wall, wall.get(0).unwrap(), SocketType::Floor);
        assert!((full.translation.z - 0.2).abs() < 1e-5);

        wall.set_snapped_from_center(true);
        let half = matcher.resolve(&wall, wall.get(0).unwrap(), SocketType::Floor);
        assert!((half.translation.z - 0.1).abs() < 1e-5);
    }

    #[test]
    fn offset_only_applies_to_floors_on_walls() {
        let mut floor = StructureSocketSet::new(SocketType::Floor);
        floor.push(SocketPoint::new(Vec3::ZERO, Vec3::Z, SocketType::Floor).with_offset(0.2));

        let socket = floor.get(0).unwrap();
        let transform = SnapMatcher::default().resolve(&floor, socket, SocketType::Floor);
        assert_eq!(transform.translation, Vec3::ZERO);
    }
}
