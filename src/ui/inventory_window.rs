//! Inventory window - slot grid, open container, quick-slot linking and crafting.
//!
//! Clicking a slot picks it; clicking another slot moves the picked stack
//! there (stacking or swapping). While a player slot is picked, the digit
//! keys link it to a quick slot, the use key uses or selects it and the drop
//! key drops it into a bag.

use bevy::prelude::*;

use crate::core::{BagDropRequest, GameplaySet, PlayState};
use crate::crafting::{CraftRequest, CraftingEngine, RecipeBook};
use crate::inventory::{
    deposit, withdraw, ItemConsumed, ItemSlot, OpenContainer, SlotStore, StorageContainer,
};
use crate::items::ItemCategory;
use crate::player::{Player, PlayerInput};

const SLOT_IDLE: Color = Color::srgb(0.15, 0.15, 0.2);
const SLOT_HOVER: Color = Color::srgb(0.25, 0.25, 0.3);
const SLOT_PICKED: Color = Color::srgb(0.5, 0.42, 0.2);
const CRAFT_READY: Color = Color::srgb(0.2, 0.4, 0.25);
const CRAFT_BLOCKED: Color = Color::srgb(0.25, 0.15, 0.15);
const SLOT_COLUMNS: usize = 6;

/// Root of the inventory window.
#[derive(Component)]
pub struct InventoryWindow;

/// Whose slots a slot button shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOwner {
    Player,
    Container(Entity),
}

/// A clickable slot.
#[derive(Component, Clone, Copy, Debug)]
pub struct SlotButton {
    pub owner: SlotOwner,
    pub index: usize,
}

/// Text inside a slot button.
#[derive(Component, Clone, Copy, Debug)]
pub struct SlotText {
    pub owner: SlotOwner,
    pub index: usize,
}

#[derive(Component)]
pub struct RecipeButton(pub String);

#[derive(Component)]
pub struct CraftButton;

/// Cost listing of the selected recipe.
#[derive(Component)]
pub struct RecipeDetails;

/// Slot currently picked up by the cursor.
#[derive(Resource, Default, Debug)]
pub struct PickedSlot(pub Option<SlotButton>);

/// Setup inventory window systems.
pub fn setup_inventory_window_systems(app: &mut App) {
    app.init_resource::<PickedSlot>()
        .add_systems(OnEnter(PlayState::Inventory), spawn_inventory_window)
        .add_systems(OnExit(PlayState::Inventory), close_inventory_window)
        .add_systems(
            Update,
            (
                handle_slot_clicks,
                handle_picked_slot_keys,
                handle_recipe_clicks,
                refresh_slot_visuals,
                refresh_recipe_details,
            )
                .chain()
                .in_set(GameplaySet::Actions)
                .run_if(in_state(PlayState::Inventory)),
        );
}

fn spawn_inventory_window(
    mut commands: Commands,
    open: Res<OpenContainer>,
    players: Query<&SlotStore, With<Player>>,
    containers: Query<&StorageContainer>,
    book: Res<RecipeBook>,
) {
    let Ok(store) = players.get_single() else {
        return;
    };
    let container = open
        .0
        .and_then(|entity| containers.get(entity).ok().map(|container| (entity, container)));

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                column_gap: Val::Px(24.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            InventoryWindow,
        ))
        .with_children(|parent| {
            spawn_slot_panel(parent, "Inventory", SlotOwner::Player, store.slots().len());

            if let Some((entity, container)) = container {
                let owner = SlotOwner::Container(entity);
                spawn_slot_panel(parent, "Storage", owner, container.slots().len());
            }

            spawn_recipe_panel(parent, &book);
        });
}

fn panel_node() -> Node {
    Node {
        flex_direction: FlexDirection::Column,
        padding: UiRect::all(Val::Px(12.0)),
        row_gap: Val::Px(6.0),
        ..default()
    }
}

fn heading(text: &str) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::srgb(0.85, 0.85, 0.9)),
    )
}

fn spawn_slot_panel(parent: &mut ChildBuilder, title: &str, owner: SlotOwner, count: usize) {
    parent
        .spawn((panel_node(), BackgroundColor(Color::srgba(0.05, 0.05, 0.08, 0.9))))
        .with_children(|panel| {
            panel.spawn(heading(title));
            panel
                .spawn(Node {
                    display: Display::Grid,
                    grid_template_columns: RepeatedGridTrack::px(SLOT_COLUMNS as u16, 68.0),
                    row_gap: Val::Px(4.0),
                    column_gap: Val::Px(4.0),
                    ..default()
                })
                .with_children(|grid| {
                    for index in 0..count {
                        grid.spawn((
                            Button,
                            Node {
                                height: Val::Px(52.0),
                                padding: UiRect::all(Val::Px(4.0)),
                                ..default()
                            },
                            BackgroundColor(SLOT_IDLE),
                            SlotButton { owner, index },
                        ))
                        .with_children(|button| {
                            button.spawn((
                                Text::new(""),
                                TextFont {
                                    font_size: 12.0,
                                    ..default()
                                },
                                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                                SlotText { owner, index },
                            ));
                        });
                    }
                });
        });
}

fn spawn_recipe_panel(parent: &mut ChildBuilder, book: &RecipeBook) {
    parent
        .spawn((panel_node(), BackgroundColor(Color::srgba(0.05, 0.05, 0.08, 0.9))))
        .with_children(|panel| {
            panel.spawn(heading("Crafting"));
            for recipe in book.iter() {
                panel
                    .spawn((
                        Button,
                        Node {
                            width: Val::Px(180.0),
                            padding: UiRect::all(Val::Px(6.0)),
                            ..default()
                        },
                        BackgroundColor(SLOT_IDLE),
                        RecipeButton(recipe.id.clone()),
                    ))
                    .with_children(|button| {
                        button.spawn((
                            Text::new(recipe.output.display_name.clone()),
                            TextFont {
                                font_size: 14.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.85, 0.85, 0.85)),
                        ));
                    });
            }

            panel.spawn((
                Text::new("Select a recipe"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.7, 0.7)),
                RecipeDetails,
            ));

            panel
                .spawn((
                    Button,
                    Node {
                        width: Val::Px(180.0),
                        height: Val::Px(36.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(CRAFT_BLOCKED),
                    CraftButton,
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new("Craft"),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.9, 0.9, 0.9)),
                    ));
                });
        });
}

fn close_inventory_window(
    mut commands: Commands,
    mut picked: ResMut<PickedSlot>,
    windows: Query<Entity, With<InventoryWindow>>,
) {
    picked.0 = None;
    for entity in windows.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

/// Pick a slot, or move the picked slot onto the clicked one.
fn handle_slot_clicks(
    buttons: Query<(&Interaction, &SlotButton), Changed<Interaction>>,
    mut picked: ResMut<PickedSlot>,
    mut players: Query<&mut SlotStore, With<Player>>,
    mut containers: Query<&mut StorageContainer>,
) {
    let Ok(mut store) = players.get_single_mut() else {
        return;
    };

    for (interaction, clicked) in buttons.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }

        let Some(from) = picked.0.take() else {
            let occupied = match clicked.owner {
                SlotOwner::Player => store.slot(clicked.index).is_ok_and(|slot| !slot.is_empty()),
                SlotOwner::Container(entity) => containers
                    .get(entity)
                    .ok()
                    .and_then(|container| container.slot(clicked.index).ok())
                    .is_some_and(|slot| !slot.is_empty()),
            };
            if occupied {
                picked.0 = Some(*clicked);
            }
            continue;
        };

        let result = match (from.owner, clicked.owner) {
            (SlotOwner::Player, SlotOwner::Player) => store
                .swap_or_stack(from.index, clicked.index)
                .map(|outcome| format!("{:?}", outcome)),
            (SlotOwner::Player, SlotOwner::Container(entity)) => match containers.get_mut(entity) {
                Ok(mut container) => deposit(&mut store, from.index, &mut container, clicked.index)
                    .map(|outcome| format!("{:?}", outcome)),
                Err(_) => continue,
            },
            (SlotOwner::Container(entity), SlotOwner::Player) => match containers.get_mut(entity) {
                Ok(mut container) => withdraw(&mut container, from.index, &mut store, clicked.index)
                    .map(|outcome| format!("{:?}", outcome)),
                Err(_) => continue,
            },
            (SlotOwner::Container(a), SlotOwner::Container(b)) if a == b => {
                match containers.get_mut(a) {
                    Ok(mut container) => container
                        .swap_or_stack(from.index, clicked.index)
                        .map(|outcome| format!("{:?}", outcome)),
                    Err(_) => continue,
                }
            }
            _ => continue,
        };

        match result {
            Ok(outcome) => debug!("Moved slot {} -> {}: {}", from.index, clicked.index, outcome),
            Err(e) => warn!("Slot move failed: {}", e),
        }
    }
}

/// Quick-slot linking, use/select and drop for the picked player slot.
fn handle_picked_slot_keys(
    input: Res<PlayerInput>,
    mut picked: ResMut<PickedSlot>,
    mut players: Query<(Entity, &mut SlotStore), With<Player>>,
    mut consumed: EventWriter<ItemConsumed>,
    mut drops: EventWriter<BagDropRequest>,
) {
    let Some(SlotButton {
        owner: SlotOwner::Player,
        index,
    }) = picked.0
    else {
        return;
    };
    let Ok((player, mut store)) = players.get_single_mut() else {
        return;
    };

    if let Some(quick) = input.quick_slot {
        match store.link_to_quick_slot(index, quick) {
            Ok(()) => info!("Linked slot {} to quick slot {}", index, quick + 1),
            Err(e) => warn!("Cannot link slot {}: {}", index, e),
        }
        picked.0 = None;
    } else if input.use_pressed {
        let category = store.slot(index).ok().and_then(ItemSlot::item).map(|item| item.category());
        match category {
            Some(ItemCategory::Consumable) => match store.consume(index) {
                Ok(effects) if !effects.is_empty() => {
                    consumed.send(ItemConsumed { player, effects });
                }
                Ok(_) => {}
                Err(e) => warn!("Could not consume slot {}: {}", index, e),
            },
            Some(_) => {
                if let Err(e) = store.select_slot(index) {
                    warn!("Could not select slot {}: {}", index, e);
                }
            }
            None => {}
        }
        picked.0 = None;
    } else if input.drop_pressed {
        drops.send(BagDropRequest { player, slot: index });
        picked.0 = None;
    }
}

fn handle_recipe_clicks(
    recipes: Query<(&Interaction, &RecipeButton), Changed<Interaction>>,
    craft: Query<&Interaction, (Changed<Interaction>, With<CraftButton>)>,
    book: Res<RecipeBook>,
    mut engine: ResMut<CraftingEngine>,
    players: Query<Entity, With<Player>>,
    mut requests: EventWriter<CraftRequest>,
) {
    for (interaction, button) in recipes.iter() {
        if *interaction == Interaction::Pressed {
            if let Some(recipe) = book.get(&button.0) {
                engine.select_recipe(recipe);
            }
        }
    }

    let pressed = craft.iter().any(|interaction| *interaction == Interaction::Pressed);
    if !pressed {
        return;
    }
    let (Some(recipe), Ok(player)) = (engine.selected(), players.get_single()) else {
        return;
    };
    requests.send(CraftRequest {
        player,
        recipe: recipe.to_string(),
    });
}

fn slot_caption(slot: &ItemSlot) -> String {
    match slot.stack() {
        Some(stack) if stack.quantity > 1 => {
            format!("{}\nx{}", stack.item.display_name, stack.quantity)
        }
        Some(stack) => stack.item.display_name.clone(),
        None => String::new(),
    }
}

fn refresh_slot_visuals(
    picked: Res<PickedSlot>,
    players: Query<&SlotStore, With<Player>>,
    containers: Query<&StorageContainer>,
    mut buttons: Query<(&Interaction, &SlotButton, &mut BackgroundColor)>,
    mut texts: Query<(&SlotText, &mut Text)>,
) {
    let Ok(store) = players.get_single() else {
        return;
    };

    let lookup = |owner: SlotOwner, index: usize| -> Option<String> {
        match owner {
            SlotOwner::Player => store.slot(index).ok().map(slot_caption),
            SlotOwner::Container(entity) => containers
                .get(entity)
                .ok()
                .and_then(|container| container.slot(index).ok())
                .map(slot_caption),
        }
    };

    for (slot, mut text) in texts.iter_mut() {
        let mut caption = lookup(slot.owner, slot.index).unwrap_or_default();
        if slot.owner == SlotOwner::Player {
            if let Some(quick) = store.quick_link_of(slot.index) {
                caption = format!("[{}] {}", quick + 1, caption);
            }
        }
        if text.0 != caption {
            text.0 = caption;
        }
    }

    for (interaction, button, mut background) in buttons.iter_mut() {
        let is_picked = picked
            .0
            .is_some_and(|p| p.owner == button.owner && p.index == button.index);
        *background = if is_picked {
            SLOT_PICKED.into()
        } else if *interaction == Interaction::Hovered {
            SLOT_HOVER.into()
        } else {
            SLOT_IDLE.into()
        };
    }
}

fn refresh_recipe_details(
    engine: Res<CraftingEngine>,
    book: Res<RecipeBook>,
    players: Query<&SlotStore, With<Player>>,
    mut details: Query<&mut Text, With<RecipeDetails>>,
    mut craft: Query<&mut BackgroundColor, With<CraftButton>>,
) {
    let Ok(store) = players.get_single() else {
        return;
    };
    let recipe = engine.selected().and_then(|id| book.get(id));

    if let Ok(mut text) = details.get_single_mut() {
        let listing = match recipe {
            Some(recipe) => recipe
                .costs
                .iter()
                .map(|cost| {
                    let held = store.count(&cost.item);
                    format!("{} {}/{}", cost.item.display_name, held, cost.quantity)
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => "Select a recipe".to_string(),
        };
        if text.0 != listing {
            text.0 = listing;
        }
    }

    if let Ok(mut background) = craft.get_single_mut() {
        let ready = recipe.is_some_and(|recipe| CraftingEngine::can_craft(recipe, store));
        *background = BackgroundColor(if ready { CRAFT_READY } else { CRAFT_BLOCKED });
    }
}
