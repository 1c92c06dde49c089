//! Starting site layout and RON loading.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;

use crate::inventory::ItemStack;
use crate::items::{DataLoadError, ItemCatalog, ItemId};

const SITE_PATH: &str = "assets/data/world/site.ron";

/// A loose stack placed at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PickupPlacement {
    pub item: ItemId,
    #[serde(default = "one")]
    pub quantity: u32,
    pub position: (f32, f32, f32),
}

/// A storage chest placed at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ChestPlacement {
    pub position: (f32, f32, f32),
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default)]
    pub contents: Vec<(ItemId, u32)>,
}

/// Stand-in mesh for a resource node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum NodeShape {
    #[default]
    Tree,
    Rock,
    Bush,
}

/// A gatherable node placed at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceNodePlacement {
    pub item: ItemId,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default = "one")]
    pub per_hit: u32,
    pub capacity: u32,
    pub position: (f32, f32, f32),
}

/// A damaging plant or trap placed at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct HazardPlacement {
    pub position: (f32, f32, f32),
    #[serde(default = "default_hazard_damage")]
    pub damage: f32,
    #[serde(default = "default_hazard_interval")]
    pub interval: f32,
    #[serde(default = "default_hazard_reach")]
    pub reach: f32,
}

fn default_hazard_damage() -> f32 {
    5.0
}

fn default_hazard_interval() -> f32 {
    1.0
}

fn default_hazard_reach() -> f32 {
    0.9
}

/// Directional sun light settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SunDef {
    pub illuminance: f32,
    /// Euler angles (pitch, yaw) in degrees
    pub angles: (f32, f32),
}

impl Default for SunDef {
    fn default() -> Self {
        Self {
            illuminance: 8000.0,
            angles: (-50.0, 30.0),
        }
    }
}

/// Everything spawned when play starts.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteDefinition {
    /// Ground plane size (x, z)
    pub ground_size: (f32, f32),
    pub ground_color: (f32, f32, f32),
    pub ambient_brightness: f32,
    pub sun: SunDef,
    pub player_start: (f32, f32, f32),
    pub starting_inventory: Vec<(ItemId, u32)>,
    pub pickups: Vec<PickupPlacement>,
    pub chests: Vec<ChestPlacement>,
    pub resource_nodes: Vec<ResourceNodePlacement>,
    pub hazards: Vec<HazardPlacement>,
}

impl Default for SiteDefinition {
    fn default() -> Self {
        Self {
            ground_size: (80.0, 80.0),
            ground_color: (0.35, 0.5, 0.3),
            ambient_brightness: 300.0,
            sun: SunDef::default(),
            player_start: (0.0, 1.5, 0.0),
            starting_inventory: Vec::new(),
            pickups: Vec::new(),
            chests: Vec::new(),
            resource_nodes: Vec::new(),
            hazards: Vec::new(),
        }
    }
}

fn one() -> u32 {
    1
}

impl SiteDefinition {
    pub fn from_ron(contents: &str) -> Result<Self, DataLoadError> {
        let site: SiteDefinition = ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
            path: SITE_PATH.to_string(),
            details: e.to_string(),
        })?;
        site.validate()?;
        Ok(site)
    }

    /// Every quantity in the layout must be at least one.
    fn validate(&self) -> Result<(), DataLoadError> {
        let invalid = |reason: String| DataLoadError::InvalidDefinition {
            id: SITE_PATH.to_string(),
            reason,
        };

        let entries = self
            .starting_inventory
            .iter()
            .chain(self.chests.iter().flat_map(|chest| chest.contents.iter()));
        for (item, quantity) in entries {
            if *quantity == 0 {
                return Err(invalid(format!("'{}' listed with a quantity of 0", item)));
            }
        }
        if let Some(pickup) = self.pickups.iter().find(|p| p.quantity == 0) {
            return Err(invalid(format!("pickup of '{}' with a quantity of 0", pickup.item)));
        }
        if let Some(node) = self.resource_nodes.iter().find(|n| n.per_hit == 0 || n.capacity == 0) {
            return Err(invalid(format!("'{}' node yields nothing", node.item)));
        }
        Ok(())
    }

    pub fn player_start(&self) -> Vec3 {
        Vec3::from(self.player_start)
    }
}

/// Turn `(item, quantity)` pairs into stacks, skipping unknown items.
/// Quantities above an item's stack limit become several stacks.
pub fn resolve_stacks(entries: &[(ItemId, u32)], catalog: &ItemCatalog) -> Vec<ItemStack> {
    entries
        .iter()
        .flat_map(|(id, quantity)| match catalog.get(id) {
            Some(item) => ItemStack::split(item, *quantity),
            None => {
                warn!("Site references unknown item '{}'", id);
                Vec::new()
            }
        })
        .collect()
}

/// Load the site layout, falling back to an empty site.
pub fn load_site_definition(mut commands: Commands) {
    let site = match fs::read_to_string(SITE_PATH) {
        Ok(contents) => match SiteDefinition::from_ron(&contents) {
            Ok(site) => {
                info!(
                    "Loaded site with {} pickups, {} chests and {} resource nodes",
                    site.pickups.len(),
                    site.chests.len(),
                    site.resource_nodes.len()
                );
                site
            }
            Err(e) => {
                error!("{}. Using an empty site.", e);
                SiteDefinition::default()
            }
        },
        Err(e) => {
            warn!("Could not read {}: {}. Using an empty site.", SITE_PATH, e);
            SiteDefinition::default()
        }
    };
    commands.insert_resource(site);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemDefinition;

    #[test]
    fn partial_site_uses_defaults() {
        let site = SiteDefinition::from_ron(
            r#"(
                player_start: (1.0, 2.0, 3.0),
                pickups: [(item: "wood", position: (2.0, 0.5, 2.0))],
                chests: [(position: (4.0, 0.0, 0.0), contents: [("wood", 5)])],
            )"#,
        )
        .unwrap();

        assert_eq!(site.player_start(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(site.pickups[0].quantity, 1);
        assert_eq!(site.chests[0].contents[0].1, 5);
        assert_eq!(site.ground_size, (80.0, 80.0));
    }

    #[test]
    fn unknown_items_are_skipped() {
        let mut catalog = ItemCatalog::default();
        catalog.insert(
            ItemDefinition::from_ron(
                ItemId::new("wood"),
                r#"(display_name: "Wood", stackable: true, max_stack: 20, kind: Resource)"#,
            )
            .unwrap(),
        );

        let entries = [(ItemId::new("wood"), 4), (ItemId::new("gold"), 1)];
        let stacks = resolve_stacks(&entries, &catalog);
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].quantity, 4);
    }

    #[test]
    fn oversized_quantities_become_several_stacks() {
        let mut catalog = ItemCatalog::default();
        catalog.insert(
            ItemDefinition::from_ron(
                ItemId::new("stone"),
                r#"(display_name: "Stone", stackable: true, max_stack: 10, kind: Resource)"#,
            )
            .unwrap(),
        );

        let stacks = resolve_stacks(&[(ItemId::new("stone"), 25)], &catalog);
        let sizes: Vec<u32> = stacks.iter().map(|s| s.quantity).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn zero_quantities_are_rejected() {
        let empty_chest = SiteDefinition::from_ron(
            r#"(chests: [(position: (0.0, 0.0, 0.0), contents: [("wood", 0)])])"#,
        );
        assert!(matches!(empty_chest, Err(DataLoadError::InvalidDefinition { .. })));

        let empty_pickup = SiteDefinition::from_ron(
            r#"(pickups: [(item: "wood", quantity: 0, position: (0.0, 0.0, 0.0))])"#,
        );
        assert!(matches!(empty_pickup, Err(DataLoadError::InvalidDefinition { .. })));

        let barren = SiteDefinition::from_ron(
            r#"(resource_nodes: [(item: "wood", capacity: 0, position: (0.0, 0.0, 0.0))])"#,
        );
        assert!(matches!(barren, Err(DataLoadError::InvalidDefinition { .. })));
    }

    #[test]
    fn resource_nodes_and_hazards_load() {
        let site = SiteDefinition::from_ron(
            r#"(
                resource_nodes: [
                    (
                        item: "stone",
                        shape: Rock,
                        per_hit: 2,
                        capacity: 6,
                        position: (1.0, 0.0, 1.0),
                    ),
                ],
                hazards: [(position: (3.0, 0.0, 3.0), damage: 4.0)],
            )"#,
        )
        .unwrap();

        assert_eq!(site.resource_nodes[0].shape, NodeShape::Rock);
        assert_eq!(site.resource_nodes[0].per_hit, 2);
        assert_eq!(site.hazards[0].damage, 4.0);
        assert_eq!(site.hazards[0].interval, 1.0);
    }

    #[test]
    fn shipped_site_is_valid() {
        let text = include_str!("../../assets/data/world/site.ron");
        let site = SiteDefinition::from_ron(text).unwrap();
        assert!(!site.resource_nodes.is_empty());
        assert!(!site.hazards.is_empty());
    }
}
