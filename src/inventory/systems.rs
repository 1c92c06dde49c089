//! Inventory systems - quick-slot selection, use, drops and notice forwarding.

use bevy::prelude::*;

use super::components::*;
use super::container::{stash, ContainerKind, StorageContainer, TransferOutcome};
use super::interaction::{self, DropAssets};
use super::store::SlotStore;
use crate::core::{BagDropRequest, GameConfig, GameplaySet, PlayState};
use crate::items::ItemCategory;
use crate::player::{Player, PlayerInput};

/// Configure inventory systems.
pub fn setup_inventory_systems(app: &mut App) {
    app
        // Events
        .add_event::<SelectionChanged>()
        .add_event::<ItemConsumed>()

        .init_resource::<OpenContainer>()
        .init_resource::<DropAssets>()

        // Player actions while exploring
        .add_systems(
            Update,
            (
                select_quick_slot,
                use_selected,
                drop_selected,
                interaction::interact,
            )
                .chain()
                .in_set(GameplaySet::Actions)
                .run_if(in_state(PlayState::Exploring)),
        )

        // Drops can come from the inventory window too
        .add_systems(
            Update,
            (handle_bag_drops, despawn_spent_bags)
                .chain()
                .in_set(GameplaySet::Actions)
                .after(interaction::interact),
        )

        .add_systems(Update, toggle_inventory.in_set(GameplaySet::Actions))
        .add_systems(Update, interaction::spawn_world_drops.in_set(GameplaySet::Feedback))
        .add_systems(Update, forward_selection_notices.in_set(GameplaySet::Notices))

        .add_systems(OnEnter(PlayState::Inventory), release_building_selection)
        .add_systems(OnExit(PlayState::Inventory), close_containers);
}

/// Open or close the inventory window.
fn toggle_inventory(
    input: Res<PlayerInput>,
    state: Res<State<PlayState>>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    if !input.inventory_pressed {
        return;
    }
    match state.get() {
        PlayState::Exploring => next_state.set(PlayState::Inventory),
        PlayState::Inventory => next_state.set(PlayState::Exploring),
    }
}

/// Select through a quick slot with the digit keys.
fn select_quick_slot(input: Res<PlayerInput>, mut query: Query<&mut SlotStore, With<Player>>) {
    let Some(quick) = input.quick_slot else {
        return;
    };
    let Ok(mut store) = query.get_single_mut() else {
        return;
    };

    if let Err(e) = store.select_quick_slot(quick) {
        warn!("Quick slot selection failed: {}", e);
    }
}

/// Consume the selected item if it is a consumable.
fn use_selected(
    input: Res<PlayerInput>,
    mut query: Query<(Entity, &mut SlotStore), With<Player>>,
    mut consumed: EventWriter<ItemConsumed>,
) {
    if !input.use_pressed {
        return;
    }
    let Ok((player, mut store)) = query.get_single_mut() else {
        return;
    };
    let Some(selection) = store.selection() else {
        return;
    };
    if selection.item.category() != ItemCategory::Consumable {
        return;
    }

    let slot = selection.slot;
    match store.consume(slot) {
        Ok(effects) if !effects.is_empty() => {
            consumed.send(ItemConsumed { player, effects });
        }
        Ok(_) => {}
        Err(e) => warn!("Could not consume slot {}: {}", slot, e),
    }
}

/// Drop the selected slot into a bag.
fn drop_selected(
    input: Res<PlayerInput>,
    query: Query<(Entity, &SlotStore), With<Player>>,
    mut drops: EventWriter<BagDropRequest>,
) {
    if !input.drop_pressed {
        return;
    }
    let Ok((player, store)) = query.get_single() else {
        return;
    };
    if let Some(selection) = store.selection() {
        drops.send(BagDropRequest {
            player,
            slot: selection.slot,
        });
    }
}

/// Move dropped slots into the nearest bag, spawning one when none is close.
fn handle_bag_drops(
    mut commands: Commands,
    assets: Res<DropAssets>,
    mut requests: EventReader<BagDropRequest>,
    config: Res<GameConfig>,
    mut players: Query<(&Transform, &mut SlotStore), With<Player>>,
    mut bags: Query<(&Transform, &mut StorageContainer), Without<Player>>,
) {
    for request in requests.read() {
        let Ok((player_transform, mut store)) = players.get_mut(request.player) else {
            continue;
        };
        let origin = player_transform.translation;

        let nearby = bags
            .iter_mut()
            .filter(|(transform, bag)| {
                bag.kind() == ContainerKind::Bag
                    && transform.translation.distance(origin) <= config.interaction.bag_reuse_radius
            })
            .min_by(|(a, _), (b, _)| {
                a.translation
                    .distance(origin)
                    .total_cmp(&b.translation.distance(origin))
            });

        let result = match nearby {
            Some((_, mut bag)) => stash(&mut store, request.slot, &mut bag),
            None => {
                let mut bag = StorageContainer::bag(config.inventory.bag_slot_count);
                let result = stash(&mut store, request.slot, &mut bag);
                let filled = matches!(
                    result,
                    Ok(TransferOutcome::Moved { .. } | TransferOutcome::Stacked { .. })
                );
                if filled {
                    interaction::spawn_bag(&mut commands, &assets, origin, bag);
                }
                result
            }
        };

        match result {
            Ok(TransferOutcome::Unchanged) => debug!("Nothing dropped from slot {}", request.slot),
            Ok(outcome) => info!("Dropped slot {} into bag: {:?}", request.slot, outcome),
            Err(e) => warn!("Drop from slot {} failed: {}", request.slot, e),
        }
    }
}

/// Bags disappear once emptied.
fn despawn_spent_bags(
    mut commands: Commands,
    mut open: ResMut<OpenContainer>,
    bags: Query<(Entity, &StorageContainer), Changed<StorageContainer>>,
) {
    for (entity, bag) in bags.iter() {
        if !bag.is_spent() {
            continue;
        }
        if open.0 == Some(entity) {
            open.0 = None;
        }
        commands.entity(entity).despawn_recursive();
        debug!("Despawned empty bag {:?}", entity);
    }
}

/// Forward queued selection side effects as events.
fn forward_selection_notices(
    mut query: Query<(Entity, &mut SlotStore)>,
    mut events: EventWriter<SelectionChanged>,
) {
    for (player, mut store) in query.iter_mut() {
        // Avoid tripping change detection when nothing is queued
        if store.bypass_change_detection().has_notices() {
            for notice in store.take_notices() {
                events.send(SelectionChanged { player, notice });
            }
        }
    }
}

/// Opening the inventory stops any placement in progress.
fn release_building_selection(mut query: Query<&mut SlotStore, With<Player>>) {
    for mut store in query.iter_mut() {
        let building = store
            .selection()
            .is_some_and(|s| s.item.category() == ItemCategory::Building);
        if building {
            store.deselect();
        }
    }
}

/// Closing the inventory dissociates any open container.
fn close_containers(mut open: ResMut<OpenContainer>, mut containers: Query<&mut StorageContainer>) {
    if let Some(entity) = open.0.take() {
        if let Ok(mut container) = containers.get_mut(entity) {
            container.close();
        }
    }
}
