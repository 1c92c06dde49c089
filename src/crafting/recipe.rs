//! Recipes and the recipe book.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::items::{DataLoadError, ItemCatalog, ItemId, ItemRef};

const RECIPES_DIR: &str = "assets/data/recipes";

/// Recipe as written in RON, referencing items by id.
#[derive(Deserialize, Clone, Debug)]
pub struct RecipeDefinition {
    pub output: ItemId,
    /// Ordered (item, quantity) costs
    pub costs: Vec<(ItemId, u32)>,
}

/// One cost entry of a recipe.
#[derive(Clone, Debug)]
pub struct RecipeCost {
    pub item: ItemRef,
    pub quantity: u32,
}

/// A resolved recipe. Crafting yields one unit of `output`.
#[derive(Clone, Debug)]
pub struct Recipe {
    pub id: String,
    pub output: ItemRef,
    pub costs: Vec<RecipeCost>,
}

impl Recipe {
    /// Resolve item ids against the catalog.
    pub fn resolve(
        id: &str,
        definition: &RecipeDefinition,
        catalog: &ItemCatalog,
    ) -> Result<Self, DataLoadError> {
        let lookup = |item: &ItemId| {
            catalog.get(item).cloned().ok_or_else(|| DataLoadError::UnknownItem {
                item: item.to_string(),
                referenced_by: id.to_string(),
            })
        };

        let output = lookup(&definition.output)?;
        let costs = definition
            .costs
            .iter()
            .map(|(item, quantity)| {
                Ok(RecipeCost {
                    item: lookup(item)?,
                    quantity: *quantity,
                })
            })
            .collect::<Result<Vec<_>, DataLoadError>>()?;

        Ok(Self {
            id: id.to_string(),
            output,
            costs,
        })
    }

    /// Parse and resolve a recipe from RON text.
    pub fn from_ron(
        id: &str,
        contents: &str,
        catalog: &ItemCatalog,
    ) -> Result<Self, DataLoadError> {
        let definition: RecipeDefinition =
            ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
                path: id.to_string(),
                details: e.to_string(),
            })?;
        Self::resolve(id, &definition, catalog)
    }
}

/// All loaded recipes, ordered by id.
#[derive(Resource, Default, Clone)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn insert(&mut self, recipe: Recipe) {
        let index = self.recipes.partition_point(|r| r.id < recipe.id);
        self.recipes.insert(index, recipe);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Load all recipes from the assets/data/recipes/ directory.
pub fn load_recipes(catalog: Res<ItemCatalog>, mut book: ResMut<RecipeBook>) {
    let recipes_dir = Path::new(RECIPES_DIR);

    let Ok(entries) = fs::read_dir(recipes_dir) else {
        warn!("Recipe directory not found: {:?}", recipes_dir);
        return;
    };

    for path in entries.flatten().map(|entry| entry.path()) {
        if !path.extension().is_some_and(|ext| ext == "ron") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let result = fs::read_to_string(&path)
            .map_err(|e| DataLoadError::ReadError {
                path: path.display().to_string(),
                details: e.to_string(),
            })
            .and_then(|contents| Recipe::from_ron(id, &contents, &catalog));

        match result {
            Ok(recipe) => {
                info!("Loaded recipe: {} -> {}", recipe.id, recipe.output.display_name);
                book.insert(recipe);
            }
            Err(e) => error!("Skipping recipe {:?}: {}", path, e),
        }
    }

    info!("Loaded {} recipes", book.len());
}
