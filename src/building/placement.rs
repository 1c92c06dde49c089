//! Building placement state machine.
//!
//! The controller owns at most one [`BuildSession`]. Each frame it is fed a
//! [`BuildInput`] snapshot and talks to the world only through the
//! collaborator traits below, so the whole flow can be driven by test doubles:
//!
//! - [`SpatialProbe`] answers look rays, socket lookups and overlap checks
//! - [`WorldSpawner`] creates and removes previews and structures
//! - [`PresentationSink`] shows validity and hold progress

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::session::{BuildProgress, BuildSession, Validity};
use super::snap::SnapMatcher;
use super::sockets::StructureSocketSet;
use crate::core::PlacementConfig;
use crate::inventory::SlotStore;
use crate::items::ItemRef;

/// A look-ray hit.
#[derive(Clone, Copy, Debug)]
pub struct ProbeHit {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Read-only spatial queries against the world.
pub trait SpatialProbe {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit>;

    /// Sockets of a placed structure, if `entity` is one.
    fn sockets(&self, entity: Entity) -> Option<&StructureSocketSet>;

    /// Whether an oriented box hits anything other than terrain, sensors and
    /// the preview itself.
    fn overlaps(&self, preview: Entity, center: Vec3, rotation: Quat, half_extents: Vec3) -> bool;
}

/// Creates and removes world representations.
pub trait WorldSpawner {
    fn spawn_preview(&mut self, item: &ItemRef) -> Entity;
    fn move_preview(&mut self, preview: Entity, transform: &Transform);
    fn despawn_preview(&mut self, preview: Entity);
    fn spawn_structure(&mut self, item: &ItemRef, transform: &Transform) -> Entity;
    fn despawn_structure(&mut self, structure: Entity);
}

/// Feedback shown to the player. Never read back.
pub trait PresentationSink {
    fn set_preview_placeable(&mut self, preview: Entity, placeable: bool);
    fn set_progress(&mut self, fraction: f32);
}

/// Everything the controller writes to.
pub trait BuildWorld: WorldSpawner + PresentationSink {}

impl<T: WorldSpawner + PresentationSink> BuildWorld for T {}

/// Per-frame input relevant to placement.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildInput {
    pub origin: Vec3,
    pub direction: Vec3,
    pub build_pressed: bool,
    pub build_held: bool,
    pub demolish_pressed: bool,
    pub rotate_pressed: bool,
    /// Secondary axis driving foundation height
    pub height_axis: f32,
    pub delta: f32,
}

/// What a frame of placement did.
#[derive(Clone, Debug)]
pub enum BuildOutcome {
    Idle,
    Previewing(Validity),
    /// Build input is being held; fraction of the required time
    Holding(f32),
    Committed {
        structure: Entity,
        item: ItemRef,
        transform: Transform,
        slot_emptied: bool,
    },
    Demolished(Entity),
}

/// Drives building placement for one player.
#[derive(Component, Debug, Default)]
pub struct BuildPlacementController {
    session: Option<BuildSession>,
}

impl BuildPlacementController {
    pub fn session(&self) -> Option<&BuildSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start placing `item`, tearing down any previous session first.
    pub fn begin(
        &mut self,
        item: ItemRef,
        slot: usize,
        world: &mut impl BuildWorld,
        config: &PlacementConfig,
    ) -> bool {
        if item.building().is_none() {
            warn!("{} is not a building item", item.id);
            return false;
        }

        self.cancel(world);
        let preview = world.spawn_preview(&item);
        info!("Placing {}", item.display_name);
        self.session = Some(BuildSession::new(item, slot, preview, config.foundation_height));
        true
    }

    /// Drop the session and its preview. Returns whether one was active.
    pub fn cancel(&mut self, world: &mut impl BuildWorld) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        world.despawn_preview(session.preview);
        if session.is_committing() {
            world.set_progress(0.0);
        }
        debug!("Placement of {} cancelled", session.item.id);
        true
    }

    /// Turn a non-snapping preview by the configured step.
    pub fn rotate(&mut self, config: &PlacementConfig) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.spec().map_or(true, |spec| spec.can_snap) {
            return false;
        }
        session.yaw = (session.yaw + config.rotation_step_degrees.to_radians()).rem_euclid(TAU);
        session.since_evaluation = f32::INFINITY;
        true
    }

    /// Raise or lower a foundation preview, clamped to `[0, max]`.
    pub fn adjust_height(&mut self, axis: f32, delta: f32, config: &PlacementConfig) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.spec().is_some_and(|spec| spec.adjusts_height()) || axis == 0.0 {
            return;
        }
        session.foundation_height = (session.foundation_height
            + axis * config.foundation_movement * delta)
            .clamp(0.0, config.max_foundation_height);
    }

    /// Re-evaluate placement once per update interval. Returns the new
    /// validity when an evaluation ran.
    pub fn evaluate(
        &mut self,
        input: &BuildInput,
        probe: &impl SpatialProbe,
        world: &mut impl BuildWorld,
        config: &PlacementConfig,
    ) -> Option<Validity> {
        let session = self.session.as_mut()?;
        session.since_evaluation += input.delta;
        if session.since_evaluation < config.update_interval {
            return None;
        }
        session.since_evaluation = 0.0;
        Some(self.evaluate_now(input, probe, world, config))
    }

    /// Probe, snap and overlap-check the preview right away.
    pub fn evaluate_now(
        &mut self,
        input: &BuildInput,
        probe: &impl SpatialProbe,
        world: &mut impl BuildWorld,
        config: &PlacementConfig,
    ) -> Validity {
        let Some(session) = self.session.as_mut() else {
            return Validity::NoSurface;
        };
        let item = session.item.clone();
        let Some(spec) = item.building() else {
            return Validity::NoSurface;
        };

        session.snapped = None;
        let validity = match probe.cast(input.origin, input.direction, config.max_distance) {
            None => Validity::NoSurface,
            Some(hit) => {
                let mut transform = Transform::from_translation(hit.point)
                    .with_rotation(Quat::from_rotation_y(session.yaw));

                if spec.adjusts_height() {
                    transform.translation.y = hit.point.y + session.foundation_height;
                }

                if spec.can_snap {
                    let matcher = SnapMatcher::from(config);
                    if let Some(target) = probe
                        .sockets(hit.entity)
                        .and_then(|host| matcher.snap(host, hit.point, spec.socket_type))
                    {
                        transform = target.transform;
                        session.snapped = Some((hit.entity, target.index));
                    }
                }

                session.transform = transform;
                world.move_preview(session.preview, &transform);

                if spec.requires_socket() && session.snapped.is_none() {
                    Validity::NoSocket
                } else if probe.overlaps(
                    session.preview,
                    transform.transform_point(spec.collider_center()),
                    transform.rotation,
                    spec.half_extents() * config.overlap_shrink,
                ) {
                    Validity::Overlap
                } else {
                    Validity::Placeable
                }
            }
        };

        session.validity = validity;
        let placeable = validity.is_placeable();
        if session.shown != Some(placeable) {
            world.set_preview_placeable(session.preview, placeable);
            session.shown = Some(placeable);
        }
        validity
    }

    /// Run one frame of placement.
    pub fn update(
        &mut self,
        input: &BuildInput,
        probe: &impl SpatialProbe,
        world: &mut impl BuildWorld,
        store: &mut SlotStore,
        config: &PlacementConfig,
    ) -> BuildOutcome {
        if self.session.is_none() {
            return BuildOutcome::Idle;
        }

        if input.demolish_pressed {
            if let Some(structure) = self.demolish(input, probe, world, config) {
                return BuildOutcome::Demolished(structure);
            }
        }
        if input.rotate_pressed {
            self.rotate(config);
        }
        self.adjust_height(input.height_axis, input.delta, config);

        if let Some(fraction) = self.advance_hold(input, world) {
            if fraction >= 1.0 {
                return self.commit(world, store);
            }
        }

        self.evaluate(input, probe, world, config);

        let Some(session) = self.session.as_mut() else {
            return BuildOutcome::Idle;
        };

        if let Some(progress) = session.progress {
            if session.validity.is_placeable() {
                return BuildOutcome::Holding(progress.fraction());
            }
            debug!("Placement became invalid during hold");
            session.progress = None;
            world.set_progress(0.0);
        }

        if input.build_pressed && session.validity.is_placeable() {
            match session.spec().and_then(|spec| spec.build_time).filter(|t| *t > 0.0) {
                Some(required) => {
                    session.progress = Some(BuildProgress::new(required));
                    world.set_progress(0.0);
                    return BuildOutcome::Holding(0.0);
                }
                None => return self.commit(world, store),
            }
        }

        BuildOutcome::Previewing(session.validity)
    }

    /// Accumulate hold time while the build input stays down; an early
    /// release resets progress. Returns the fraction reached, if holding.
    fn advance_hold(&mut self, input: &BuildInput, world: &mut impl BuildWorld) -> Option<f32> {
        let session = self.session.as_mut()?;
        let progress = session.progress.as_mut()?;

        if !input.build_held {
            debug!("Build hold released at {:.2}", progress.fraction());
            session.progress = None;
            world.set_progress(0.0);
            return None;
        }

        progress.advance(input.delta);
        let fraction = progress.fraction();
        world.set_progress(fraction.min(1.0));
        Some(fraction)
    }

    /// Spawn the structure, take one unit from the selected slot, and either
    /// end the session or continue with a fresh preview.
    fn commit(&mut self, world: &mut impl BuildWorld, store: &mut SlotStore) -> BuildOutcome {
        let Some(session) = self.session.as_mut() else {
            return BuildOutcome::Idle;
        };
        if session.progress.take().is_some() {
            world.set_progress(0.0);
        }

        // The selection follows its item when slots are rearranged
        let selected = store
            .selection()
            .map(|s| s.slot)
            .filter(|_| store.selected_stack().is_some_and(|stack| stack.is_item(&session.item)));
        let Some(slot) = selected else {
            warn!("{} is no longer selected; dropping placement", session.item.id);
            self.cancel(world);
            store.deselect();
            return BuildOutcome::Idle;
        };
        if slot != session.slot {
            debug!("{} moved from slot {} to {}", session.item.id, session.slot, slot);
            session.slot = slot;
        }

        let item = session.item.clone();
        let transform = session.transform;
        let structure = world.spawn_structure(&item, &transform);

        let slot_emptied = match store.reduce_selected(1) {
            Ok(emptied) => emptied,
            Err(e) => {
                warn!("Could not take {} from inventory: {}", item.id, e);
                true
            }
        };
        info!("Placed {} at {:?}", item.display_name, transform.translation);

        if slot_emptied {
            self.cancel(world);
        } else if let Some(session) = self.session.as_mut() {
            world.despawn_preview(session.preview);
            session.preview = world.spawn_preview(&item);
            world.move_preview(session.preview, &transform);
            session.validity = Validity::NoSurface;
            session.snapped = None;
            session.shown = None;
            session.since_evaluation = f32::INFINITY;
        }

        BuildOutcome::Committed {
            structure,
            item,
            transform,
            slot_emptied,
        }
    }

    /// Remove the placed structure under the look ray.
    fn demolish(
        &mut self,
        input: &BuildInput,
        probe: &impl SpatialProbe,
        world: &mut impl BuildWorld,
        config: &PlacementConfig,
    ) -> Option<Entity> {
        let session = self.session.as_mut()?;
        let hit = probe.cast(input.origin, input.direction, config.max_distance)?;
        probe.sockets(hit.entity)?;

        world.despawn_structure(hit.entity);
        session.snapped = None;
        session.since_evaluation = f32::INFINITY;
        info!("Demolished structure {:?}", hit.entity);
        Some(hit.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemDefinition, ItemId};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct Probe {
        hit: Option<ProbeHit>,
        sockets: HashMap<Entity, StructureSocketSet>,
        overlap: bool,
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
    struct World {
        next: u32,
        previews: Vec<(Entity, ItemId)>,
        placeable: Vec<bool>,
    }

    impl WorldSpawner for World {
        fn spawn_preview(&mut self, item: &ItemRef) -> Entity {
            self.next += 1;
            let preview = Entity::from_raw(self.next);
            self.previews.push((preview, item.id.clone()));
            preview
        }
        fn move_preview(&mut self, _: Entity, _: &Transform) {}
        fn despawn_preview(&mut self, preview: Entity) {
            self.previews.retain(|(p, _)| *p != preview);
        }
        fn spawn_structure(&mut self, _: &ItemRef, _: &Transform) -> Entity {
            self.next += 1;
            Entity::from_raw(self.next)
        }
        fn despawn_structure(&mut self, _: Entity) {}
    }

    impl PresentationSink for World {
        fn set_preview_placeable(&mut self, _: Entity, placeable: bool) {
            self.placeable.push(placeable);
        }
        fn set_progress(&mut self, _: f32) {}
    }

    fn building(id: &str, text: &str) -> ItemRef {
        Arc::new(ItemDefinition::from_ron(ItemId::new(id), text).unwrap())
    }

    fn foundation() -> ItemRef {
        building(
            "foundation",
            r#"(
                display_name: "Foundation",
                kind: Building((socket_type: Foundation, can_snap: true, size: (2.0, 0.4, 2.0))),
            )"#,
        )
    }

    fn crate_box() -> ItemRef {
        building(
            "crate",
            r#"(
                display_name: "Crate",
                kind: Building((socket_type: Door, size: (1.0, 1.0, 1.0))),
            )"#,
        )
    }

    fn ground() -> Probe {
        Probe {
            hit: Some(ProbeHit {
                entity: Entity::from_raw(500),
                point: Vec3::new(0.0, 1.0, 3.0),
                normal: Vec3::Y,
            }),
            ..default()
        }
    }

    #[test]
    fn evaluation_is_throttled() {
        let config = PlacementConfig::default();
        let mut world = World::default();
        let mut controller = BuildPlacementController::default();
        controller.begin(crate_box(), 0, &mut world, &config);

        let input = BuildInput { delta: 0.02, ..default() };
        let probe = ground();

        // first evaluation is immediate, the next waits for the interval
        let first = controller.evaluate(&input, &probe, &mut world, &config);
        assert_eq!(first, Some(Validity::Placeable));
        assert_eq!(controller.evaluate(&input, &probe, &mut world, &config), None);
        assert!(controller.evaluate(&input, &probe, &mut world, &config).is_some());
    }

    #[test]
    fn placeable_material_only_changes_on_flip() {
        let config = PlacementConfig::default();
        let mut world = World::default();
        let mut controller = BuildPlacementController::default();
        controller.begin(crate_box(), 0, &mut world, &config);
        let mut probe = ground();

        controller.evaluate_now(&BuildInput::default(), &probe, &mut world, &config);
        controller.evaluate_now(&BuildInput::default(), &probe, &mut world, &config);
        probe.overlap = true;
        controller.evaluate_now(&BuildInput::default(), &probe, &mut world, &config);

        assert_eq!(world.placeable, vec![true, false]);
    }

    #[test]
    fn foundation_height_is_clamped() {
        let config = PlacementConfig::default();
        let mut world = World::default();
        let mut controller = BuildPlacementController::default();
        controller.begin(foundation(), 0, &mut world, &config);

        controller.adjust_height(-100.0, 1.0, &config);
        assert_eq!(controller.session().unwrap().foundation_height, 0.0);
        controller.adjust_height(100.0, 1.0, &config);
        assert_eq!(controller.session().unwrap().foundation_height, config.max_foundation_height);

        let input = BuildInput::default();
        let validity = controller.evaluate_now(&input, &ground(), &mut world, &config);
        assert_eq!(validity, Validity::Placeable);
        let height = controller.session().unwrap().transform.translation.y;
        assert!((height - (1.0 + config.max_foundation_height)).abs() < 1e-5);
    }

    #[test]
    fn only_free_buildings_rotate() {
        let config = PlacementConfig::default();
        let mut world = World::default();
        let mut controller = BuildPlacementController::default();

        controller.begin(foundation(), 0, &mut world, &config);
        assert!(!controller.rotate(&config));

        controller.begin(crate_box(), 0, &mut world, &config);
        assert!(controller.rotate(&config));
        let yaw = controller.session().unwrap().yaw;
        assert!((yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn starting_again_replaces_the_preview() {
        let config = PlacementConfig::default();
        let mut world = World::default();
        let mut controller = BuildPlacementController::default();

        assert!(controller.begin(foundation(), 0, &mut world, &config));
        assert!(controller.begin(crate_box(), 1, &mut world, &config));

        let session = controller.session().unwrap();
        assert_eq!(world.previews, vec![(session.preview, ItemId::new("crate"))]);
        assert_eq!(session.slot, 1);

        // even when the same item is picked again
        assert!(controller.begin(crate_box(), 1, &mut world, &config));
        assert_eq!(world.previews.len(), 1);
        assert_eq!(world.previews[0].0, controller.session().unwrap().preview);
    }

    #[test]
    fn non_building_items_are_refused() {
        let config = PlacementConfig::default();
        let mut world = World::default();
        let mut controller = BuildPlacementController::default();
        let stone = building("stone", r#"(display_name: "Stone", kind: Resource)"#);

        assert!(!controller.begin(stone, 0, &mut world, &config));
        assert!(world.previews.is_empty());
    }
}
