//! Transient state of one building placement.

use bevy::prelude::*;

use crate::items::{BuildingSpec, ItemRef};

/// Result of the last placement evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validity {
    Placeable,
    /// The look probe hit nothing in range
    #[default]
    NoSurface,
    /// The building must snap but no free socket matched
    NoSocket,
    /// The preview volume intersects other geometry
    Overlap,
}

impl Validity {
    pub fn is_placeable(self) -> bool {
        self == Validity::Placeable
    }
}

/// A timed hold before a structure commits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildProgress {
    pub elapsed: f32,
    pub required: f32,
}

impl BuildProgress {
    pub fn new(required: f32) -> Self {
        Self {
            elapsed: 0.0,
            required,
        }
    }

    pub fn advance(&mut self, delta: f32) {
        self.elapsed += delta;
    }

    pub fn fraction(&self) -> f32 {
        if self.required <= 0.0 {
            1.0
        } else {
            self.elapsed / self.required
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fraction() >= 1.0
    }
}

/// One building being placed by a player.
#[derive(Debug)]
pub struct BuildSession {
    pub item: ItemRef,
    /// Main slot the building was selected from
    pub slot: usize,
    pub preview: Entity,
    pub transform: Transform,
    pub validity: Validity,
    pub progress: Option<BuildProgress>,
    /// Structure and socket the preview is currently snapped to
    pub snapped: Option<(Entity, usize)>,
    /// Height above the terrain for foundations
    pub foundation_height: f32,
    /// Manual rotation for non-snapping buildings, radians
    pub yaw: f32,
    /// Time since the last placement evaluation
    pub since_evaluation: f32,
    /// Validity last pushed to the presentation layer
    pub shown: Option<bool>,
}

impl BuildSession {
    pub fn new(item: ItemRef, slot: usize, preview: Entity, foundation_height: f32) -> Self {
        Self {
            item,
            slot,
            preview,
            transform: Transform::IDENTITY,
            validity: Validity::default(),
            progress: None,
            snapped: None,
            foundation_height,
            yaw: 0.0,
            // evaluate on the first tick
            since_evaluation: f32::INFINITY,
            shown: None,
        }
    }

    /// Building data of the session item. Sessions are only created for
    /// building items.
    pub fn spec(&self) -> Option<&BuildingSpec> {
        self.item.building()
    }

    pub fn is_committing(&self) -> bool {
        self.progress.is_some()
    }
}
