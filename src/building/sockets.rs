//! Typed sockets on placed structures.
//!
//! Every placed structure carries a [`StructureSocketSet`] in world space.
//! A socket is available while nothing occupies it and its parent socket
//! (if any) is available too. Occupation is tracked per occupant so that
//! removing one structure frees exactly the sockets it was holding.
//!
//! Wall sockets behave differently when they meet another wall socket:
//! instead of becoming occupied they move to the midpoint of the pair and
//! report [`SocketPoint::snapped_from_center`]. This lets a single wall sit
//! centered on the seam between two floor tiles.

use bevy::prelude::*;
use serde::Deserialize;

/// Slack added to footprint bounds so sockets lying on a face count as inside.
const FOOTPRINT_TOLERANCE: f32 = 0.01;

/// Kind of attachment a socket accepts (and the kind of a building).
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SocketType {
    Foundation,
    Wall,
    Floor,
    Ramp,
    Door,
}

/// A socket as declared in an item definition, in the structure's local space.
#[derive(Deserialize, Clone, Debug)]
pub struct SocketTemplate {
    pub position: (f32, f32, f32),
    /// Facing given to structures snapped onto this socket
    pub normal: (f32, f32, f32),
    pub socket_type: SocketType,
    /// Distance along the normal applied to floors snapping onto a wall
    #[serde(default)]
    pub offset: f32,
    /// Index of a socket whose occupation also blocks this one
    #[serde(default)]
    pub parent: Option<usize>,
}

/// What is holding a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant {
    /// A same-type socket of another structure sitting on this one
    Socket { structure: Entity, index: usize },
    /// Another structure's volume covering the socket
    Structure(Entity),
}

impl Occupant {
    pub fn structure(&self) -> Entity {
        match self {
            Occupant::Socket { structure, .. } | Occupant::Structure(structure) => *structure,
        }
    }
}

/// A wall socket of another structure this one is centered with.
#[derive(Clone, Copy, Debug)]
struct CenterPartner {
    structure: Entity,
    index: usize,
    position: Vec3,
}

/// A single socket in world space.
#[derive(Clone, Debug)]
pub struct SocketPoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub socket_type: SocketType,
    pub offset: f32,
    pub parent: Option<usize>,
    snap_position: Vec3,
    occupants: Vec<Occupant>,
    partners: Vec<CenterPartner>,
}

impl SocketPoint {
    pub fn new(position: Vec3, normal: Vec3, socket_type: SocketType) -> Self {
        Self {
            position,
            normal,
            socket_type,
            offset: 0.0,
            parent: None,
            snap_position: position,
            occupants: Vec::new(),
            partners: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Where a structure snapped to this socket is placed.
    pub fn snap_position(&self) -> Vec3 {
        self.snap_position
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// Whether the snap position was moved to the center of a wall pair.
    pub fn snapped_from_center(&self) -> bool {
        !self.partners.is_empty()
    }

    fn occupy(&mut self, occupant: Occupant) -> bool {
        if self.occupants.contains(&occupant) {
            return false;
        }
        self.occupants.push(occupant);
        true
    }

    fn release(&mut self, occupant: &Occupant) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|o| o != occupant);
        self.occupants.len() != before
    }

    fn recenter(&mut self) {
        self.snap_position = match self.partners.first() {
            Some(partner) => (self.position + partner.position) * 0.5,
            None => self.position,
        };
    }
}

/// All sockets of one placed structure, in insertion order.
#[derive(Component, Clone, Debug)]
pub struct StructureSocketSet {
    build_type: SocketType,
    sockets: Vec<SocketPoint>,
    snapped_from_center: bool,
}

impl StructureSocketSet {
    pub fn new(build_type: SocketType) -> Self {
        Self {
            build_type,
            sockets: Vec::new(),
            snapped_from_center: false,
        }
    }

    /// Place local socket templates into the world with a structure's transform.
    pub fn from_templates(
        build_type: SocketType,
        templates: &[SocketTemplate],
        transform: &Transform,
    ) -> Self {
        let mut set = Self::new(build_type);
        for (index, template) in templates.iter().enumerate() {
            let position = transform.transform_point(Vec3::from(template.position));
            let normal = (transform.rotation * Vec3::from(template.normal)).normalize_or_zero();
            let mut socket = SocketPoint::new(position, normal, template.socket_type)
                .with_offset(template.offset);

            match template.parent {
                Some(parent) if parent < templates.len() && parent != index => {
                    socket = socket.with_parent(parent);
                }
                Some(parent) => {
                    warn!("Ignoring invalid parent {} on socket {}", parent, index);
                }
                None => {}
            }
            set.push(socket);
        }
        set
    }

    pub fn push(&mut self, socket: SocketPoint) {
        self.sockets.push(socket);
    }

    pub fn build_type(&self) -> SocketType {
        self.build_type
    }

    pub fn sockets(&self) -> &[SocketPoint] {
        &self.sockets
    }

    pub fn get(&self, index: usize) -> Option<&SocketPoint> {
        self.sockets.get(index)
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Free and not blocked through its parent chain.
    pub fn is_available(&self, index: usize) -> bool {
        let mut current = Some(index);
        // bounded walk; a malformed parent cycle reads as unavailable
        for _ in 0..=self.sockets.len() {
            let Some(i) = current else {
                return true;
            };
            let Some(socket) = self.sockets.get(i) else {
                return false;
            };
            if socket.is_occupied() {
                return false;
            }
            current = socket.parent;
        }
        false
    }

    /// Available sockets of one type, in insertion order.
    pub fn available_of(
        &self,
        socket_type: SocketType,
    ) -> impl Iterator<Item = (usize, &SocketPoint)> {
        self.sockets
            .iter()
            .enumerate()
            .filter(move |(i, s)| s.socket_type == socket_type && self.is_available(*i))
    }

    /// Whether this structure sits on a centered wall socket.
    pub fn snapped_from_center(&self) -> bool {
        self.snapped_from_center
    }

    pub fn set_snapped_from_center(&mut self, value: bool) {
        self.snapped_from_center = value;
    }

    /// Mark a socket as held. Returns false if it already was, or the index is bad.
    pub fn occupy(&mut self, index: usize, occupant: Occupant) -> bool {
        self.sockets
            .get_mut(index)
            .is_some_and(|socket| socket.occupy(occupant))
    }

    pub fn release(&mut self, index: usize, occupant: Occupant) -> bool {
        self.sockets
            .get_mut(index)
            .is_some_and(|socket| socket.release(&occupant))
    }

    /// A same-type socket of `other` now sits on socket `index`.
    pub fn begin_socket_overlap(
        &mut self,
        index: usize,
        other: Entity,
        other_index: usize,
        other_position: Vec3,
    ) {
        let Some(socket) = self.sockets.get_mut(index) else {
            return;
        };

        if socket.socket_type == SocketType::Wall {
            socket.partners.push(CenterPartner {
                structure: other,
                index: other_index,
                position: other_position,
            });
            socket.recenter();
        } else {
            socket.occupy(Occupant::Socket {
                structure: other,
                index: other_index,
            });
        }
    }

    pub fn end_socket_overlap(&mut self, index: usize, other: Entity, other_index: usize) {
        let Some(socket) = self.sockets.get_mut(index) else {
            return;
        };

        socket
            .partners
            .retain(|p| !(p.structure == other && p.index == other_index));
        socket.recenter();
        socket.release(&Occupant::Socket {
            structure: other,
            index: other_index,
        });
    }

    /// A structure of `structure_type` now covers socket `index`. Walls
    /// occupy any socket; other structures only occupy their own type.
    /// Returns the socket's centered flag when it became occupied.
    pub fn begin_structure_overlap(
        &mut self,
        index: usize,
        structure: Entity,
        structure_type: SocketType,
    ) -> Option<bool> {
        let socket = self.sockets.get_mut(index)?;
        if structure_type != SocketType::Wall && socket.socket_type != structure_type {
            return None;
        }
        socket.occupy(Occupant::Structure(structure));
        Some(socket.snapped_from_center())
    }

    pub fn end_structure_overlap(&mut self, index: usize, structure: Entity) -> bool {
        self.release(index, Occupant::Structure(structure))
    }

    /// Forget everything `structure` was doing to this set. Returns how many
    /// sockets changed.
    pub fn release_structure(&mut self, structure: Entity) -> usize {
        let mut changed = 0;
        for socket in &mut self.sockets {
            let occupants = socket.occupants.len();
            let partners = socket.partners.len();
            socket.occupants.retain(|o| o.structure() != structure);
            socket.partners.retain(|p| p.structure != structure);
            if socket.partners.len() != partners {
                socket.recenter();
            }
            if socket.occupants.len() != occupants || socket.partners.len() != partners {
                changed += 1;
            }
        }
        changed
    }
}

/// Oriented box a placed structure occupies.
#[derive(Component, Clone, Copy, Debug)]
pub struct StructureFootprint {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl StructureFootprint {
    /// Footprint of a collider at `local_center` on a structure placed at `transform`.
    pub fn new(transform: &Transform, local_center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center: transform.transform_point(local_center),
            rotation: transform.rotation,
            half_extents,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local
            .abs()
            .cmple(self.half_extents + Vec3::splat(FOOTPRINT_TOLERANCE))
            .all()
    }
}

/// A placed structure handed to [`connect_structures`].
pub struct PlacedStructure<'a> {
    pub entity: Entity,
    pub sockets: &'a mut StructureSocketSet,
    pub footprint: &'a StructureFootprint,
}

/// Link two placed structures: pair up coinciding sockets of the same type,
/// then let each structure's volume occupy the other's sockets.
/// Returns the number of links made.
pub fn connect_structures(
    a: &mut PlacedStructure,
    b: &mut PlacedStructure,
    overlap_radius: f32,
) -> usize {
    let mut links = 0;

    for i in 0..a.sockets.len() {
        for j in 0..b.sockets.len() {
            let (sa, sb) = (&a.sockets.sockets[i], &b.sockets.sockets[j]);
            if sa.socket_type != sb.socket_type
                || sa.position.distance(sb.position) > overlap_radius
            {
                continue;
            }
            let (pa, pb) = (sa.position, sb.position);
            a.sockets.begin_socket_overlap(i, b.entity, j, pb);
            b.sockets.begin_socket_overlap(j, a.entity, i, pa);
            links += 1;
        }
    }

    links += cover_sockets(a, b);
    links += cover_sockets(b, a);
    links
}

/// Occupy the sockets of `host` that lie inside `cover`'s footprint.
fn cover_sockets(host: &mut PlacedStructure, cover: &mut PlacedStructure) -> usize {
    let cover_type = cover.sockets.build_type();
    let mut links = 0;

    for index in 0..host.sockets.len() {
        if !cover.footprint.contains(host.sockets.sockets[index].position) {
            continue;
        }
        let centered = host.sockets.begin_structure_overlap(index, cover.entity, cover_type);
        if let Some(centered) = centered {
            if cover_type == SocketType::Wall && centered {
                cover.sockets.set_snapped_from_center(true);
            }
            links += 1;
        }
    }
    links
}

/// Undo everything `removed` did to `other`.
pub fn disconnect_structures(removed: Entity, other: &mut StructureSocketSet) -> usize {
    other.release_structure(removed)
}
