//! Items plugin - loads the item catalog at startup.

use bevy::prelude::*;

use super::data::{load_item_definitions, ItemCatalog};

/// Items plugin - owns the `ItemCatalog` resource.
pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ItemCatalog>()
            .add_systems(Startup, load_item_definitions);
    }
}
