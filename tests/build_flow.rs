//! Placement scenarios driven through the controller with in-memory doubles,
//! plus socket layouts of the shipped building data.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;
use outpost::building::{
    connect_structures, BuildInput, BuildOutcome, BuildPlacementController, Occupant,
    PlacedStructure, PresentationSink, ProbeHit, SnapMatcher, SocketPoint, SocketType,
    SpatialProbe, StructureFootprint, StructureSocketSet, Validity, WorldSpawner,
};
use outpost::core::PlacementConfig;
use outpost::inventory::{ItemStack, SlotStore};
use outpost::items::{ItemDefinition, ItemId, ItemRef};

const GROUND: u32 = 900;
const HOST: u32 = 901;

#[derive(Default)]
struct Probe {
    hit: Option<ProbeHit>,
    sockets: HashMap<Entity, StructureSocketSet>,
    overlap: bool,
}

impl Probe {
    fn looking_at(entity: Entity, point: Vec3) -> Self {
        Self {
            hit: Some(ProbeHit {
                entity,
                point,
                normal: Vec3::Y,
            }),
            ..default()
        }
    }
}

impl SpatialProbe for Probe {
    fn cast(&self, _: Vec3, _: Vec3, _: f32) -> Option<ProbeHit> {
        self.hit
    }

    fn sockets(&self, entity: Entity) -> Option<&StructureSocketSet> {
        self.sockets.get(&entity)
    }

    fn overlaps(&self, _: Entity, _: Vec3, _: Quat, _: Vec3) -> bool {
        self.overlap
    }
}

#[derive(Default)]
struct Scene {
    next: u32,
    previews: Vec<Entity>,
    structures: Vec<(Entity, Transform)>,
    despawned: Vec<Entity>,
    progress: Vec<f32>,
}

impl WorldSpawner for Scene {
    fn spawn_preview(&mut self, _: &ItemRef) -> Entity {
        self.next += 1;
        let preview = Entity::from_raw(self.next);
        self.previews.push(preview);
        preview
    }

    fn move_preview(&mut self, _: Entity, _: &Transform) {}

    fn despawn_preview(&mut self, preview: Entity) {
        self.previews.retain(|p| *p != preview);
    }

    fn spawn_structure(&mut self, _: &ItemRef, transform: &Transform) -> Entity {
        self.next += 1;
        let structure = Entity::from_raw(self.next);
        self.structures.push((structure, *transform));
        structure
    }

    fn despawn_structure(&mut self, structure: Entity) {
        self.despawned.push(structure);
    }
}

impl PresentationSink for Scene {
    fn set_preview_placeable(&mut self, _: Entity, _: bool) {}

    fn set_progress(&mut self, fraction: f32) {
        self.progress.push(fraction);
    }
}

fn item(id: &str, text: &str) -> ItemRef {
    Arc::new(ItemDefinition::from_ron(ItemId::new(id), text).unwrap())
}

fn timed_crate() -> ItemRef {
    item(
        "crate",
        r#"(
            display_name: "Crate",
            stackable: true,
            max_stack: 5,
            kind: Building((socket_type: Door, size: (1.0, 1.0, 1.0), build_time: Some(1.0))),
        )"#,
    )
}

fn instant_crate() -> ItemRef {
    item(
        "crate",
        r#"(
            display_name: "Crate",
            stackable: true,
            max_stack: 5,
            kind: Building((socket_type: Door, size: (1.0, 1.0, 1.0))),
        )"#,
    )
}

fn wall() -> ItemRef {
    item("wall", include_str!("../assets/data/items/wall.ron"))
}

fn foundation() -> ItemRef {
    item("foundation", include_str!("../assets/data/items/foundation.ron"))
}

/// A store holding `quantity` of `item` in slot 0, selected.
fn holding(item: &ItemRef, quantity: u32) -> SlotStore {
    let mut store = SlotStore::new(6, 3);
    assert!(store.insert_stack(ItemStack::new(item.clone(), quantity)).is_none());
    assert!(store.select_slot(0).unwrap());
    store.take_notices();
    store
}

fn frame(delta: f32) -> BuildInput {
    BuildInput {
        direction: Vec3::NEG_Z,
        delta,
        ..default()
    }
}

fn ground() -> Probe {
    Probe::looking_at(Entity::from_raw(GROUND), Vec3::new(0.0, 0.0, -3.0))
}

#[test]
fn nearest_free_socket_wins_then_the_next_one() {
    let mut host = StructureSocketSet::new(SocketType::Foundation);
    host.push(SocketPoint::new(Vec3::new(1.2, 0.0, 0.0), Vec3::X, SocketType::Wall));
    host.push(SocketPoint::new(Vec3::new(0.0, 0.0, 0.4), Vec3::Z, SocketType::Wall));
    host.push(SocketPoint::new(Vec3::new(0.1, 0.0, 0.0), Vec3::Z, SocketType::Floor));
    let matcher = SnapMatcher::default();

    let (index, _) = matcher.find_nearest(&host, Vec3::ZERO, SocketType::Wall).unwrap();
    assert_eq!(index, 1);

    host.occupy(1, Occupant::Structure(Entity::from_raw(7)));
    let (index, _) = matcher.find_nearest(&host, Vec3::ZERO, SocketType::Wall).unwrap();
    assert_eq!(index, 0);

    host.occupy(0, Occupant::Structure(Entity::from_raw(8)));
    assert!(matcher.find_nearest(&host, Vec3::ZERO, SocketType::Wall).is_none());
}

#[test]
fn releasing_the_hold_early_resets_progress() {
    let config = PlacementConfig::default();
    let crate_item = timed_crate();
    let mut store = holding(&crate_item, 2);
    let mut scene = Scene::default();
    let probe = ground();
    let mut controller = BuildPlacementController::default();
    assert!(controller.begin(crate_item, 0, &mut scene, &config));

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.2)
    };
    assert!(matches!(
        controller.update(&press, &probe, &mut scene, &mut store, &config),
        BuildOutcome::Holding(f) if f == 0.0
    ));

    let hold = BuildInput {
        build_held: true,
        ..frame(0.2)
    };
    for _ in 0..3 {
        controller.update(&hold, &probe, &mut scene, &mut store, &config);
    }
    let progress = controller.session().unwrap().progress.unwrap();
    assert!((progress.fraction() - 0.6).abs() < 1e-4);

    let outcome = controller.update(&frame(0.2), &probe, &mut scene, &mut store, &config);
    assert!(matches!(outcome, BuildOutcome::Previewing(Validity::Placeable)));
    assert!(controller.session().unwrap().progress.is_none());
    assert_eq!(scene.progress.last(), Some(&0.0));
    assert!(scene.structures.is_empty());
    assert_eq!(store.slot(0).unwrap().quantity(), 2);
}

#[test]
fn completed_hold_places_one_unit() {
    let config = PlacementConfig::default();
    let crate_item = timed_crate();
    let mut store = holding(&crate_item, 3);
    let mut scene = Scene::default();
    let probe = ground();
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.25)
    };
    controller.update(&press, &probe, &mut scene, &mut store, &config);

    let hold = BuildInput {
        build_held: true,
        ..frame(0.25)
    };
    let mut committed = None;
    for _ in 0..4 {
        if let BuildOutcome::Committed { structure, slot_emptied, .. } =
            controller.update(&hold, &probe, &mut scene, &mut store, &config)
        {
            committed = Some((structure, slot_emptied));
            break;
        }
    }

    let (structure, slot_emptied) = committed.expect("hold should complete");
    assert!(!slot_emptied);
    assert_eq!(scene.structures.len(), 1);
    assert_eq!(scene.structures[0].0, structure);
    assert_eq!(store.slot(0).unwrap().quantity(), 2);

    // keeps placing with a fresh preview
    let session = controller.session().unwrap();
    assert_eq!(session.validity, Validity::NoSurface);
    assert!(session.progress.is_none());
    assert_eq!(scene.previews, vec![session.preview]);
}

#[test]
fn placing_the_last_unit_ends_the_session() {
    let config = PlacementConfig::default();
    let crate_item = instant_crate();
    let mut store = holding(&crate_item, 1);
    let mut scene = Scene::default();
    let probe = ground();
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.016)
    };
    let outcome = controller.update(&press, &probe, &mut scene, &mut store, &config);

    assert!(matches!(outcome, BuildOutcome::Committed { slot_emptied: true, .. }));
    assert!(!controller.is_active());
    assert!(scene.previews.is_empty());
    assert!(store.slot(0).unwrap().is_empty());
    assert!(store.selection().is_none());
    assert!(matches!(
        controller.update(&press, &probe, &mut scene, &mut store, &config),
        BuildOutcome::Idle
    ));
}

#[test]
fn walls_need_a_socket() {
    let config = PlacementConfig::default();
    let wall = wall();
    let mut store = holding(&wall, 1);
    let mut scene = Scene::default();
    let mut controller = BuildPlacementController::default();
    controller.begin(wall, 0, &mut scene, &config);

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.05)
    };
    let outcome = controller.update(&press, &ground(), &mut scene, &mut store, &config);
    assert!(matches!(outcome, BuildOutcome::Previewing(Validity::NoSocket)));
    assert!(scene.structures.is_empty());

    // Now look at a foundation edge
    let foundation = foundation();
    let spec = foundation.building().unwrap();
    let host = Entity::from_raw(HOST);
    let mut probe = Probe::looking_at(host, Vec3::new(0.3, 0.4, 3.8));
    probe.sockets.insert(
        host,
        StructureSocketSet::from_templates(spec.socket_type, &spec.sockets, &Transform::IDENTITY),
    );

    let outcome = controller.update(&frame(0.05), &probe, &mut scene, &mut store, &config);
    assert!(matches!(outcome, BuildOutcome::Previewing(Validity::Placeable)));
    let session = controller.session().unwrap();
    assert_eq!(session.snapped, Some((host, 5)));
    assert!(session.transform.translation.distance(Vec3::new(0.0, 0.4, 4.0)) < 1e-5);
}

#[test]
fn overlapping_previews_cannot_be_placed() {
    let config = PlacementConfig::default();
    let crate_item = instant_crate();
    let mut store = holding(&crate_item, 2);
    let mut scene = Scene::default();
    let mut probe = ground();
    probe.overlap = true;
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.05)
    };
    let outcome = controller.update(&press, &probe, &mut scene, &mut store, &config);

    assert!(matches!(outcome, BuildOutcome::Previewing(Validity::Overlap)));
    assert!(scene.structures.is_empty());
    assert_eq!(store.slot(0).unwrap().quantity(), 2);
}

#[test]
fn hold_is_dropped_when_placement_turns_invalid() {
    let config = PlacementConfig::default();
    let crate_item = timed_crate();
    let mut store = holding(&crate_item, 2);
    let mut scene = Scene::default();
    let mut probe = ground();
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.1)
    };
    controller.update(&press, &probe, &mut scene, &mut store, &config);
    assert!(controller.session().unwrap().is_committing());

    probe.overlap = true;
    let hold = BuildInput {
        build_held: true,
        ..frame(0.1)
    };
    let outcome = controller.update(&hold, &probe, &mut scene, &mut store, &config);
    assert!(matches!(outcome, BuildOutcome::Previewing(Validity::Overlap)));
    assert!(!controller.session().unwrap().is_committing());
}

#[test]
fn demolish_removes_the_structure_under_the_cursor() {
    let config = PlacementConfig::default();
    let crate_item = instant_crate();
    let mut store = holding(&crate_item, 1);
    let mut scene = Scene::default();
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    let target = Entity::from_raw(HOST);
    let mut probe = Probe::looking_at(target, Vec3::new(0.0, 0.5, -3.0));
    probe.sockets.insert(target, StructureSocketSet::new(SocketType::Door));

    let demolish = BuildInput {
        demolish_pressed: true,
        ..frame(0.016)
    };
    let outcome = controller.update(&demolish, &probe, &mut scene, &mut store, &config);
    assert!(matches!(outcome, BuildOutcome::Demolished(e) if e == target));
    assert_eq!(scene.despawned, vec![target]);

    // terrain is not demolishable
    let outcome = controller.update(&demolish, &ground(), &mut scene, &mut store, &config);
    assert!(!matches!(outcome, BuildOutcome::Demolished(_)));
}

#[test]
fn neighbouring_foundations_share_their_edge() {
    let foundation = foundation();
    let spec = foundation.building().unwrap();
    let matcher = SnapMatcher::default();

    let a_at = Transform::IDENTITY;
    let mut a_set = StructureSocketSet::from_templates(spec.socket_type, &spec.sockets, &a_at);
    let a_print = StructureFootprint::new(&a_at, spec.collider_center(), spec.half_extents());

    let target = matcher
        .snap(&a_set, Vec3::new(2.2, 0.1, 2.1), SocketType::Foundation)
        .unwrap();
    assert_eq!(target.index, 3);
    let b_at = target.transform;
    let mut b_set = StructureSocketSet::from_templates(spec.socket_type, &spec.sockets, &b_at);
    let b_print = StructureFootprint::new(&b_at, spec.collider_center(), spec.half_extents());

    // the new slab extends away from the first one
    let b_center = b_at.transform_point(spec.collider_center());
    assert!(b_center.distance(Vec3::new(4.0, 0.2, 2.0)) < 1e-4);

    let (a, b) = (Entity::from_raw(1), Entity::from_raw(2));
    connect_structures(
        &mut PlacedStructure { entity: a, sockets: &mut a_set, footprint: &a_print },
        &mut PlacedStructure { entity: b, sockets: &mut b_set, footprint: &b_print },
        0.15,
    );

    // the joined edge takes no more foundations
    assert!(!a_set.is_available(3));
    assert!(!b_set.is_available(0));
    // but the wall sockets on it stay open, centered on the seam
    assert!(a_set.is_available(7));
    assert!(a_set.get(7).unwrap().snapped_from_center());
    assert!(b_set.is_available(4));
    // the ramp socket only depends on the front edge
    assert!(a_set.is_available(8));
}

#[test]
fn placement_follows_the_selection_when_slots_are_rearranged() {
    let config = PlacementConfig::default();
    let crate_item = instant_crate();
    let mut store = holding(&crate_item, 3);
    let mut scene = Scene::default();
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    store.swap_or_stack(0, 2).unwrap();
    assert_eq!(store.selection().unwrap().slot, 2);

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.05)
    };
    let outcome = controller.update(&press, &ground(), &mut scene, &mut store, &config);

    assert!(matches!(outcome, BuildOutcome::Committed { slot_emptied: false, .. }));
    assert_eq!(scene.structures.len(), 1);
    assert_eq!(store.slot(2).unwrap().quantity(), 2);
    assert!(store.slot(0).unwrap().is_empty());
    assert_eq!(controller.session().unwrap().slot, 2);
}

#[test]
fn refused_commit_clears_the_selection_too() {
    let config = PlacementConfig::default();
    let crate_item = instant_crate();
    let axe = item("axe", r#"(display_name: "Axe", kind: Equipable((model: None)))"#);
    let mut store = holding(&crate_item, 2);
    assert!(store.insert_stack(ItemStack::new(axe, 1)).is_none());
    let mut scene = Scene::default();
    let mut controller = BuildPlacementController::default();
    controller.begin(crate_item, 0, &mut scene, &config);

    // the building leaves the store while still selected
    store.remove_at(0).unwrap();
    store.take_notices();
    store.select_slot(1).unwrap();
    store.take_notices();

    let press = BuildInput {
        build_pressed: true,
        build_held: true,
        ..frame(0.05)
    };
    let outcome = controller.update(&press, &ground(), &mut scene, &mut store, &config);

    assert!(matches!(outcome, BuildOutcome::Idle));
    assert!(!controller.is_active());
    assert!(scene.structures.is_empty());
    assert!(scene.previews.is_empty());
    assert!(store.selection().is_none());
}
