//! World module - the starting site, terrain, resource nodes and hazards.

mod builder;
mod data;
mod gathering;
mod plugin;
mod resource;

pub use builder::{SiteGeometry, Terrain};
pub use data::{
    ChestPlacement, HazardPlacement, NodeShape, PickupPlacement, ResourceNodePlacement,
    SiteDefinition, SunDef,
};
pub use plugin::{setup_site, WorldPlugin};
pub use resource::{GatherYield, Hazard, ResourceNode};
