//! Crafting plugin - recipe loading and craft requests.

use bevy::prelude::*;

use super::engine::CraftingEngine;
use super::error::CraftError;
use super::recipe::{load_recipes, RecipeBook};
use crate::core::{GameplaySet, WorldDropRequest};
use crate::inventory::SlotStore;
use crate::items::load_item_definitions;

/// Ask to craft a recipe into a player's inventory.
#[derive(Event, Clone, Debug)]
pub struct CraftRequest {
    pub player: Entity,
    pub recipe: String,
}

/// Crafting plugin - owns the `RecipeBook` and handles `CraftRequest`s.
pub struct CraftingPlugin;

impl Plugin for CraftingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RecipeBook>()
            .init_resource::<CraftingEngine>()
            .add_event::<CraftRequest>()
            .add_systems(Startup, load_recipes.after(load_item_definitions))
            .add_systems(Update, handle_craft_requests.in_set(GameplaySet::Actions));
    }
}

fn handle_craft_requests(
    mut requests: EventReader<CraftRequest>,
    book: Res<RecipeBook>,
    mut players: Query<(&GlobalTransform, &mut SlotStore)>,
    mut drops: EventWriter<WorldDropRequest>,
) {
    for request in requests.read() {
        let Ok((transform, mut store)) = players.get_mut(request.player) else {
            continue;
        };

        let result = book
            .get(&request.recipe)
            .ok_or_else(|| CraftError::UnknownRecipe(request.recipe.clone()))
            .and_then(|recipe| CraftingEngine::craft(recipe, &mut store));

        match result {
            Ok(crafted) => {
                if let Some(stack) = crafted.overflow {
                    drops.send(WorldDropRequest {
                        stack,
                        position: transform.translation()
                            + transform.forward().as_vec3()
                            + Vec3::Y * 0.5,
                    });
                }
            }
            Err(e) => warn!("Craft of '{}' refused: {}", request.recipe, e),
        }
    }
}
