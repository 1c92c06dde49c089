//! Affordability checks and atomic crafting against a slot store.

use bevy::prelude::*;

use super::error::CraftError;
use super::recipe::Recipe;
use crate::inventory::{ItemStack, SlotStore};
use crate::items::ItemRef;

/// Result of a successful craft.
#[derive(Clone, Debug)]
pub struct Crafted {
    pub output: ItemRef,
    /// The output when the store had no room for it
    pub overflow: Option<ItemStack>,
}

/// Crafting state: which recipe the window is showing.
#[derive(Resource, Default, Debug)]
pub struct CraftingEngine {
    selected: Option<String>,
}

impl CraftingEngine {
    /// Show a recipe. Never touches any inventory.
    pub fn select_recipe(&mut self, recipe: &Recipe) {
        self.selected = Some(recipe.id.clone());
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// First cost the store cannot cover. Costs naming the same item twice
    /// must be covered together.
    pub fn missing(recipe: &Recipe, store: &SlotStore) -> Option<CraftError> {
        recipe.costs.iter().find_map(|cost| {
            let required: u32 = recipe
                .costs
                .iter()
                .filter(|other| other.item.id == cost.item.id)
                .map(|other| other.quantity)
                .sum();
            let available = store.count(&cost.item);
            (available < required).then(|| CraftError::MissingResources {
                item: cost.item.id.to_string(),
                required,
                available,
            })
        })
    }

    pub fn can_craft(recipe: &Recipe, store: &SlotStore) -> bool {
        Self::missing(recipe, store).is_none()
    }

    /// Deduct every cost and grant one unit of the output, or change nothing.
    pub fn craft(recipe: &Recipe, store: &mut SlotStore) -> Result<Crafted, CraftError> {
        if let Some(error) = Self::missing(recipe, store) {
            return Err(error);
        }

        for cost in &recipe.costs {
            if !store.deduct_cost(&cost.item, cost.quantity) {
                // Covered by the check above
                error!("Deduction of {} x{} failed mid-craft", cost.item.id, cost.quantity);
            }
        }

        let overflow = if store.add_item(&recipe.output) {
            None
        } else {
            debug!("No room for crafted {}", recipe.output.id);
            Some(ItemStack::single(recipe.output.clone()))
        };

        info!("Crafted {}", recipe.output.display_name);
        Ok(Crafted {
            output: recipe.output.clone(),
            overflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crafting::recipe::RecipeCost;
    use crate::inventory::test_items::*;
    use crate::items::{EquipSpec, ItemKind};

    fn axe_recipe(wood: &ItemRef, stone: &ItemRef) -> Recipe {
        Recipe {
            id: "axe".to_string(),
            output: with_kind("axe", false, 1, ItemKind::Equipable(EquipSpec::default())),
            costs: vec![
                RecipeCost {
                    item: wood.clone(),
                    quantity: 3,
                },
                RecipeCost {
                    item: stone.clone(),
                    quantity: 2,
                },
            ],
        }
    }

    fn stocked(wood: &ItemRef, stone: &ItemRef, wood_count: u32) -> SlotStore {
        let mut store = SlotStore::new(4, 2);
        store.insert_stack(ItemStack::new(wood.clone(), wood_count));
        store.insert_stack(ItemStack::new(stone.clone(), 2));
        store
    }

    #[test]
    fn craft_deducts_costs_and_grants_output() {
        let (wood, stone) = (resource("wood", 20), resource("stone", 20));
        let recipe = axe_recipe(&wood, &stone);
        let mut store = stocked(&wood, &stone, 5);

        let crafted = CraftingEngine::craft(&recipe, &mut store).unwrap();
        assert!(crafted.overflow.is_none());
        assert_eq!(store.count(&wood), 2);
        assert_eq!(store.count(&stone), 0);
        assert_eq!(store.count(&recipe.output), 1);
    }

    #[test]
    fn missing_resources_change_nothing() {
        let (wood, stone) = (resource("wood", 20), resource("stone", 20));
        let recipe = axe_recipe(&wood, &stone);
        let mut store = stocked(&wood, &stone, 2);

        assert!(!CraftingEngine::can_craft(&recipe, &store));
        let error = CraftingEngine::craft(&recipe, &mut store).unwrap_err();
        assert_eq!(
            error,
            CraftError::MissingResources {
                item: "wood".to_string(),
                required: 3,
                available: 2,
            }
        );
        assert_eq!(store.count(&wood), 2);
        assert_eq!(store.count(&stone), 2);
    }

    #[test]
    fn output_overflows_when_full() {
        let (wood, stone) = (resource("wood", 3), resource("stone", 2));
        let recipe = axe_recipe(&wood, &stone);
        let mut store = SlotStore::new(3, 1);
        store.insert_stack(ItemStack::new(wood.clone(), 3));
        store.insert_stack(ItemStack::new(wood.clone(), 3));
        store.insert_stack(ItemStack::new(stone.clone(), 2));

        // Costs free the stone slot, so the axe still fits
        let crafted = CraftingEngine::craft(&recipe, &mut store).unwrap();
        assert!(crafted.overflow.is_none());

        let mut full = SlotStore::new(2, 1);
        full.insert_stack(ItemStack::new(wood.clone(), 3));
        full.insert_stack(ItemStack::new(wood.clone(), 3));
        let mut cheap = recipe.clone();
        cheap.costs.truncate(1);
        cheap.costs[0].quantity = 1;

        let crafted = CraftingEngine::craft(&cheap, &mut full).unwrap();
        assert_eq!(crafted.overflow.map(|s| s.quantity), Some(1));
        assert_eq!(full.count(&wood), 5);
    }

    #[test]
    fn duplicate_costs_are_summed() {
        let (wood, stone) = (resource("wood", 20), resource("stone", 20));
        let mut recipe = axe_recipe(&wood, &stone);
        recipe.costs[1].item = wood.clone();
        let mut store = stocked(&wood, &stone, 4);

        assert!(CraftingEngine::craft(&recipe, &mut store).is_err());
        assert_eq!(store.count(&wood), 4);
    }

    #[test]
    fn selecting_a_recipe_leaves_inventory_alone() {
        let (wood, stone) = (resource("wood", 20), resource("stone", 20));
        let recipe = axe_recipe(&wood, &stone);
        let store = stocked(&wood, &stone, 5);

        let mut engine = CraftingEngine::default();
        engine.select_recipe(&recipe);
        assert_eq!(engine.selected(), Some("axe"));
        assert_eq!(store.count(&wood), 5);
    }
}
