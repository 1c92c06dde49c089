//! Seeded random operation sequences against a player store and a chest.
//!
//! After every step the quick slots must still mirror their main slots, no
//! item may appear or vanish except through the operation's own result, and
//! failed operations must leave both inventories untouched.

use std::collections::HashMap;

use outpost::crafting::{CraftingEngine, Recipe};
use outpost::inventory::{deposit, withdraw, ItemStack, SlotStore, StorageContainer};
use outpost::items::{ItemCatalog, ItemCategory, ItemDefinition, ItemId, ItemRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SLOTS: usize = 8;
const QUICK: usize = 3;
const CHEST: usize = 4;

struct Fixture {
    items: Vec<ItemRef>,
    recipes: Vec<Recipe>,
}

fn fixture() -> Fixture {
    let mut catalog = ItemCatalog::default();
    let sources = [
        ("wood", r#"(display_name: "Wood", stackable: true, max_stack: 10, kind: Resource)"#),
        (
            "berries",
            r#"(
                display_name: "Berries",
                stackable: true,
                max_stack: 5,
                kind: Consumable([(need: Hunger, amount: 5.0)]),
            )"#,
        ),
        ("axe", r#"(display_name: "Axe", kind: Equipable((model: None)))"#),
        (
            "plank",
            r#"(
                display_name: "Plank",
                stackable: true,
                max_stack: 3,
                kind: Building((socket_type: Floor, can_snap: true, size: (2.0, 0.2, 2.0))),
            )"#,
        ),
    ];

    let items = sources
        .iter()
        .map(|(id, text)| catalog.insert(ItemDefinition::from_ron(ItemId::new(*id), text).unwrap()))
        .collect();

    let plank = r#"(output: "plank", costs: [("wood", 2), ("wood", 1)])"#;
    let axe = r#"(output: "axe", costs: [("wood", 3), ("berries", 1)])"#;
    let recipes = vec![
        Recipe::from_ron("plank", plank, &catalog).unwrap(),
        Recipe::from_ron("axe", axe, &catalog).unwrap(),
    ];

    Fixture { items, recipes }
}

type Snapshot = Vec<Option<(String, u32)>>;

fn snapshot(store: &SlotStore, chest: &StorageContainer) -> Snapshot {
    store
        .slots()
        .iter()
        .chain(chest.slots().iter())
        .map(|slot| slot.stack().map(|s| (s.item.id.to_string(), s.quantity)))
        .collect()
}

fn totals(store: &SlotStore, chest: &StorageContainer) -> HashMap<String, u32> {
    let mut totals = HashMap::new();
    for (id, quantity) in snapshot(store, chest).into_iter().flatten() {
        *totals.entry(id).or_insert(0) += quantity;
    }
    totals.retain(|_, q| *q > 0);
    totals
}

fn adjust(expected: &mut HashMap<String, u32>, item: &ItemRef, delta: i64) {
    let entry = expected.entry(item.id.to_string()).or_insert(0);
    *entry = (*entry as i64 + delta) as u32;
    expected.retain(|_, q| *q > 0);
}

fn check_invariants(store: &SlotStore, chest: &StorageContainer, step: usize) {
    store
        .verify_mirrors()
        .unwrap_or_else(|e| panic!("step {step}: {e}"));

    for slot in store.slots().iter().chain(chest.slots().iter()) {
        if let Some(stack) = slot.stack() {
            assert!(stack.quantity >= 1, "step {step}: empty stack left in a slot");
            assert!(
                stack.quantity <= stack.item.stack_limit(),
                "step {step}: {} over its stack limit",
                stack.item.id
            );
        }
    }

    if let Some(selection) = store.selection() {
        let held = store.slot(selection.slot).unwrap().stack().map(|s| s.item.id.clone());
        assert_eq!(held.as_ref(), Some(&selection.item.id), "step {step}: selection lost its item");
    }
}

fn run(seed: u64, steps: usize) {
    let Fixture { items, recipes } = fixture();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = SlotStore::new(SLOTS, QUICK);
    let mut chest = StorageContainer::chest(CHEST);
    let mut expected: HashMap<String, u32> = HashMap::new();

    for step in 0..steps {
        let before = snapshot(&store, &chest);
        // One past the end now and then to exercise the bounds checks
        let index = rng.gen_range(0..=SLOTS);
        let other = rng.gen_range(0..=SLOTS);
        let item = &items[rng.gen_range(0..items.len())];

        let failed = match rng.gen_range(0..11) {
            0 => {
                if store.add_item(item) {
                    adjust(&mut expected, item, 1);
                }
                false
            }
            1 => {
                let offered = rng.gen_range(1..=item.stack_limit());
                let leftover = store.insert_stack(ItemStack::new(item.clone(), offered));
                let kept = offered - leftover.map_or(0, |l| l.quantity);
                adjust(&mut expected, item, kept as i64);
                false
            }
            2 => match store.remove_at(index) {
                Ok(Some(removed)) => {
                    adjust(&mut expected, &removed.item, -(removed.quantity as i64));
                    false
                }
                Ok(None) => false,
                Err(_) => true,
            },
            3 => {
                let held = store.slot(index).ok().and_then(|s| s.item().cloned());
                match store.reduce_quantity(index, rng.gen_range(1..4)) {
                    Ok(reduction) => {
                        if let Some(held) = held {
                            adjust(&mut expected, &held, -(reduction.removed as i64));
                        }
                        false
                    }
                    Err(_) => true,
                }
            }
            4 => store.swap_or_stack(index, other).is_err(),
            5 => store.link_to_quick_slot(index, rng.gen_range(0..=QUICK)).is_err(),
            6 => {
                if rng.gen_bool(0.5) {
                    store.select_slot(index).is_err()
                } else {
                    store.select_quick_slot(rng.gen_range(0..=QUICK)).is_err()
                }
            }
            7 => {
                let held = store.slot(index).ok().and_then(|s| s.item().cloned());
                match store.consume(index) {
                    Ok(effects) => {
                        let consumable = held.filter(|h| h.category() == ItemCategory::Consumable);
                        if let Some(held) = consumable {
                            assert!(!effects.is_empty());
                            adjust(&mut expected, &held, -1);
                        }
                        false
                    }
                    Err(_) => true,
                }
            }
            8 => deposit(&mut store, index, &mut chest, rng.gen_range(0..=CHEST)).is_err(),
            9 => withdraw(&mut chest, rng.gen_range(0..=CHEST), &mut store, index).is_err(),
            _ => {
                let recipe = &recipes[rng.gen_range(0..recipes.len())];
                match CraftingEngine::craft(recipe, &mut store) {
                    Ok(crafted) => {
                        for cost in &recipe.costs {
                            adjust(&mut expected, &cost.item, -(cost.quantity as i64));
                        }
                        if crafted.overflow.is_none() {
                            adjust(&mut expected, &crafted.output, 1);
                        }
                        false
                    }
                    Err(_) => true,
                }
            }
        };

        if failed {
            assert_eq!(
                snapshot(&store, &chest),
                before,
                "step {step}: failed operation changed state"
            );
        }
        assert_eq!(totals(&store, &chest), expected, "step {step}: item counts drifted");
        check_invariants(&store, &chest, step);
    }
}

#[test]
fn random_operations_keep_inventories_consistent() {
    for seed in 0..20 {
        run(seed, 400);
    }
}

#[test]
fn notices_drain_between_steps() {
    let Fixture { items, .. } = fixture();
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = SlotStore::new(SLOTS, QUICK);
    let axe = &items[2];
    store.add_item(axe);

    for _ in 0..50 {
        store.select_slot(rng.gen_range(0..SLOTS)).unwrap();
        let notices = store.take_notices();
        assert!(notices.len() <= 2);
        assert!(!store.has_notices());
    }
}
