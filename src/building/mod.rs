//! Building module - sockets, snapping and the placement state machine.

mod commands;
mod components;
mod placement;
mod plugin;
mod probe;
mod session;
mod snap;
mod sockets;
mod systems;

pub use commands::BuildCommands;
pub use components::*;
pub use placement::{
    BuildInput, BuildOutcome, BuildPlacementController, BuildWorld, PresentationSink, ProbeHit,
    SpatialProbe, WorldSpawner,
};
pub use plugin::BuildingPlugin;
pub use probe::RapierProbe;
pub use session::{BuildProgress, BuildSession, Validity};
pub use snap::{SnapMatcher, SnapTarget};
pub use sockets::{
    connect_structures, disconnect_structures, Occupant, PlacedStructure, SocketPoint,
    SocketTemplate, SocketType, StructureFootprint, StructureSocketSet,
};
