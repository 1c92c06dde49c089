//! Item definitions and the catalog they are loaded into.
//!
//! Definitions are immutable once loaded. Slots, recipes and build sessions
//! hold shared [`ItemRef`] handles into the catalog, never copies.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::error::DataLoadError;
use crate::building::{SocketTemplate, SocketType};

const ITEMS_DIR: &str = "assets/data/items";

/// Item identifier (matches the RON file name).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared handle to a catalog entry.
pub type ItemRef = Arc<ItemDefinition>;

/// Broad item category, used for business rules (quick-slot linking, selection side effects).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Resource,
    Equipable,
    Consumable,
    Building,
}

/// Survival need touched by a consumable.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NeedKind {
    Health,
    Hunger,
    Thirst,
}

/// One effect applied when a consumable is used.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ConsumableEffect {
    pub need: NeedKind,
    pub amount: f32,
}

/// Equip data for tools and weapons.
#[derive(Deserialize, Clone, Debug)]
pub struct EquipSpec {
    /// Path to the model attached to the camera while equipped
    #[serde(default)]
    pub model: Option<String>,
    /// Whether a swing harvests resource nodes
    #[serde(default)]
    pub gathers: bool,
    /// Seconds between swings
    #[serde(default = "default_swing_cooldown")]
    pub swing_cooldown: f32,
    /// How far a swing reaches from the camera
    #[serde(default = "default_reach")]
    pub reach: f32,
}

impl Default for EquipSpec {
    fn default() -> Self {
        Self {
            model: None,
            gathers: false,
            swing_cooldown: default_swing_cooldown(),
            reach: default_reach(),
        }
    }
}

fn default_swing_cooldown() -> f32 {
    0.6
}

fn default_reach() -> f32 {
    2.5
}

/// Placement data for building items.
#[derive(Deserialize, Clone, Debug)]
pub struct BuildingSpec {
    pub socket_type: SocketType,
    /// Whether this building aligns to sockets of placed structures
    #[serde(default)]
    pub can_snap: bool,
    /// Full extents of the structure collider
    pub size: (f32, f32, f32),
    /// Collider center relative to the structure origin. Defaults to
    /// resting on the origin: `(0, size.y / 2, 0)`
    #[serde(default)]
    pub center: Option<(f32, f32, f32)>,
    #[serde(default)]
    pub spawn_model: Option<String>,
    #[serde(default)]
    pub preview_model: Option<String>,
    /// Seconds the build input must be held before the structure commits
    #[serde(default)]
    pub build_time: Option<f32>,
    /// Slot count when the structure is a storage container. Zero uses
    /// the configured chest size
    #[serde(default)]
    pub storage_slots: Option<usize>,
    /// Sockets in the structure's local space
    #[serde(default)]
    pub sockets: Vec<SocketTemplate>,
}

impl BuildingSpec {
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.size.0, self.size.1, self.size.2) * 0.5
    }

    pub fn collider_center(&self) -> Vec3 {
        match self.center {
            Some((x, y, z)) => Vec3::new(x, y, z),
            None => Vec3::new(0.0, self.size.1 * 0.5, 0.0),
        }
    }

    /// Walls and floors may only be placed on a matching socket.
    pub fn requires_socket(&self) -> bool {
        self.can_snap && matches!(self.socket_type, SocketType::Wall | SocketType::Floor)
    }

    /// Foundations float above the terrain by an adjustable height.
    pub fn adjusts_height(&self) -> bool {
        self.can_snap && self.socket_type == SocketType::Foundation
    }
}

/// Category-specific behaviour of an item.
#[derive(Deserialize, Clone, Debug)]
pub enum ItemKind {
    Resource,
    Equipable(EquipSpec),
    Consumable(Vec<ConsumableEffect>),
    Building(BuildingSpec),
}

/// Item definition loaded from RON file.
#[derive(Deserialize, Clone, Debug)]
pub struct ItemDefinition {
    /// Filled in from the file name when loading
    #[serde(skip)]
    pub id: ItemId,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Model spawned when the item lies in the world
    #[serde(default)]
    pub drop_model: Option<String>,
    pub kind: ItemKind,
}

fn default_max_stack() -> u32 {
    1
}

impl ItemDefinition {
    pub fn category(&self) -> ItemCategory {
        match self.kind {
            ItemKind::Resource => ItemCategory::Resource,
            ItemKind::Equipable(_) => ItemCategory::Equipable,
            ItemKind::Consumable(_) => ItemCategory::Consumable,
            ItemKind::Building(_) => ItemCategory::Building,
        }
    }

    /// Maximum quantity a single slot may hold.
    pub fn stack_limit(&self) -> u32 {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }

    pub fn building(&self) -> Option<&BuildingSpec> {
        match &self.kind {
            ItemKind::Building(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn consumable_effects(&self) -> &[ConsumableEffect] {
        match &self.kind {
            ItemKind::Consumable(effects) => effects,
            _ => &[],
        }
    }

    pub fn equip(&self) -> Option<&EquipSpec> {
        match &self.kind {
            ItemKind::Equipable(spec) => Some(spec),
            _ => None,
        }
    }

    /// Parse a definition from RON text and assign its id.
    pub fn from_ron(id: ItemId, contents: &str) -> Result<Self, DataLoadError> {
        let mut definition: ItemDefinition =
            ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
                path: id.to_string(),
                details: e.to_string(),
            })?;

        if definition.stackable && definition.max_stack == 0 {
            return Err(DataLoadError::InvalidDefinition {
                id: id.to_string(),
                reason: "stackable item with a max stack of 0".to_string(),
            });
        }

        definition.id = id;
        Ok(definition)
    }
}

/// Resource holding all loaded item definitions.
#[derive(Resource, Default, Clone)]
pub struct ItemCatalog {
    items: HashMap<ItemId, ItemRef>,
}

impl ItemCatalog {
    /// Get an item definition by id.
    pub fn get(&self, id: &ItemId) -> Option<&ItemRef> {
        self.items.get(id)
    }

    pub fn insert(&mut self, definition: ItemDefinition) -> ItemRef {
        let item = Arc::new(definition);
        self.items.insert(item.id.clone(), item.clone());
        item
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemRef> {
        self.items.values()
    }
}

/// Load all item definitions from the assets/data/items/ directory.
pub fn load_item_definitions(mut catalog: ResMut<ItemCatalog>) {
    let items_dir = Path::new(ITEMS_DIR);

    if !items_dir.exists() {
        warn!("Item definitions directory not found: {:?}", items_dir);
        return;
    }

    let Ok(entries) = fs::read_dir(items_dir) else {
        warn!("Failed to read item definitions directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "ron") {
            let id = ItemId::new(
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown"),
            );

            match fs::read_to_string(&path) {
                Ok(contents) => match ItemDefinition::from_ron(id, &contents) {
                    Ok(definition) => {
                        info!(
                            "Loaded item definition: {} ({})",
                            definition.display_name, definition.id
                        );
                        catalog.insert(definition);
                    }
                    Err(e) => {
                        error!("Failed to load item definition {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    error!("Failed to read item definition {:?}: {}", path, e);
                }
            }
        }
    }

    info!("Loaded {} item definitions", catalog.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_building_item() {
        let text = r#"(
            display_name: "Wooden Wall",
            stackable: true,
            max_stack: 10,
            kind: Building((
                socket_type: Wall,
                can_snap: true,
                size: (2.0, 2.0, 0.2),
                build_time: Some(1.0),
                sockets: [
                    (position: (1.0, 1.0, 0.0), normal: (1.0, 0.0, 0.0), socket_type: Wall),
                ],
            )),
        )"#;

        let item = ItemDefinition::from_ron(ItemId::new("wall"), text).unwrap();
        assert_eq!(item.id.as_str(), "wall");
        assert_eq!(item.category(), ItemCategory::Building);

        let spec = item.building().unwrap();
        assert!(spec.requires_socket());
        assert!(!spec.adjusts_height());
        assert_eq!(spec.sockets.len(), 1);
        assert_eq!(spec.half_extents(), Vec3::new(1.0, 1.0, 0.1));
        assert_eq!(spec.collider_center(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn non_stackable_items_hold_one() {
        let text = r#"(display_name: "Axe", max_stack: 5, kind: Equipable(()))"#;
        let item = ItemDefinition::from_ron(ItemId::new("axe"), text).unwrap();
        assert_eq!(item.stack_limit(), 1);
    }

    #[test]
    fn shipped_axe_gathers() {
        let text = include_str!("../../assets/data/items/axe.ron");
        let item = ItemDefinition::from_ron(ItemId::new("axe"), text).unwrap();
        let tool = item.equip().unwrap();
        assert!(tool.gathers);
        assert!(tool.swing_cooldown > 0.0);
    }

    #[test]
    fn tools_default_to_not_gathering() {
        let text = r#"(display_name: "Torch", kind: Equipable((model: None)))"#;
        let tool = ItemDefinition::from_ron(ItemId::new("torch"), text).unwrap();
        let spec = tool.equip().unwrap();
        assert!(!spec.gathers);
        assert_eq!(spec.reach, 2.5);
    }

    #[test]
    fn rejects_zero_stack() {
        let text = r#"(display_name: "Dust", stackable: true, max_stack: 0, kind: Resource)"#;
        let result = ItemDefinition::from_ron(ItemId::new("dust"), text);
        assert!(matches!(result, Err(DataLoadError::InvalidDefinition { .. })));
    }

    #[test]
    fn consumable_effects_are_listed() {
        let text = r#"(
            display_name: "Berries",
            stackable: true,
            max_stack: 20,
            kind: Consumable([(need: Hunger, amount: 10.0), (need: Thirst, amount: 2.0)]),
        )"#;
        let item = ItemDefinition::from_ron(ItemId::new("berries"), text).unwrap();
        assert_eq!(item.consumable_effects().len(), 2);
        assert_eq!(item.consumable_effects()[0].need, NeedKind::Hunger);
    }
}
