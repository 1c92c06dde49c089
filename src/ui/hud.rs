//! In-game HUD - needs bars, crosshair, quick slots and build feedback.

use bevy::prelude::*;

use crate::building::{BuildPlacementController, BuildProgressDisplay, Validity};
use crate::core::{GameConfig, GameState, GameplaySet, ItemPickupEvent, StructurePlaced};
use crate::inventory::SlotStore;
use crate::items::{ItemRef, NeedKind};
use crate::player::{Needs, Player};

/// Marker for HUD root entities.
#[derive(Component)]
pub struct HudRoot;

/// Fill of one needs bar.
#[derive(Component)]
pub struct NeedBar(pub NeedKind);

/// One cell of the quick-slot bar.
#[derive(Component)]
pub struct QuickSlotCell(pub usize);

/// Text inside a quick-slot cell.
#[derive(Component)]
pub struct QuickSlotLabel(pub usize);

/// Container of the build hold bar.
#[derive(Component)]
pub struct BuildProgressFrame;

/// Fill of the build hold bar.
#[derive(Component)]
pub struct BuildProgressFill;

/// Placement status line.
#[derive(Component)]
pub struct BuildPrompt;

/// Column of short activity messages (top right).
#[derive(Component)]
pub struct ActivityFeed;

/// One feed line and the seconds it stays up.
#[derive(Component)]
pub struct Toast(pub f32);

const TOAST_SECONDS: f32 = 2.5;
const MAX_TOASTS: usize = 5;

const CELL_IDLE: Color = Color::srgba(0.1, 0.1, 0.12, 0.7);
const CELL_SELECTED: Color = Color::srgba(0.45, 0.4, 0.2, 0.85);

/// Setup HUD systems.
pub fn setup_hud_systems(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_hud)
        .add_systems(
            Update,
            (
                update_need_bars,
                update_quick_slots,
                update_build_progress,
                update_build_prompt,
                (push_activity_toasts, expire_toasts).chain(),
            )
                .in_set(GameplaySet::Feedback),
        );
}

/// Spawn the HUD once; unpausing re-enters `InGame` with it still present.
fn spawn_hud(mut commands: Commands, config: Res<GameConfig>, existing: Query<(), With<HudRoot>>) {
    if !existing.is_empty() {
        return;
    }

    // Needs (bottom-left corner)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::End,
                align_items: AlignItems::Start,
                padding: UiRect::all(Val::Px(20.0)),
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            spawn_bar(parent, "Thirst", Color::srgb(0.25, 0.5, 0.9), NeedKind::Thirst);
            spawn_bar(parent, "Hunger", Color::srgb(0.85, 0.6, 0.2), NeedKind::Hunger);
            spawn_bar(parent, "Health", Color::srgb(0.8, 0.2, 0.2), NeedKind::Health);
        });

    // Crosshair, build prompt and hold bar (center)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    width: Val::Px(4.0),
                    height: Val::Px(4.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.5)),
            ));

            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    margin: UiRect::top(Val::Px(24.0)),
                    ..default()
                },
                BuildPrompt,
            ));

            parent
                .spawn((
                    Node {
                        width: Val::Px(160.0),
                        height: Val::Px(8.0),
                        margin: UiRect::top(Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
                    Visibility::Hidden,
                    BuildProgressFrame,
                ))
                .with_children(|frame| {
                    frame.spawn((
                        Node {
                            width: Val::Percent(0.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(Color::srgb(0.9, 0.8, 0.3)),
                        BuildProgressFill,
                    ));
                });
        });

    // Activity feed (top right)
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::End,
            padding: UiRect::all(Val::Px(20.0)),
            row_gap: Val::Px(4.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        HudRoot,
        ActivityFeed,
    ));

    // Quick-slot bar (bottom center)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::End,
                padding: UiRect::bottom(Val::Px(20.0)),
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            for index in 0..config.inventory.quick_slot_count {
                parent
                    .spawn((
                        Node {
                            width: Val::Px(72.0),
                            height: Val::Px(56.0),
                            margin: UiRect::horizontal(Val::Px(3.0)),
                            padding: UiRect::all(Val::Px(4.0)),
                            flex_direction: FlexDirection::Column,
                            ..default()
                        },
                        BackgroundColor(CELL_IDLE),
                        QuickSlotCell(index),
                    ))
                    .with_children(|cell| {
                        cell.spawn((
                            Text::new(format!("{}", index + 1)),
                            TextFont {
                                font_size: 11.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.6, 0.6, 0.6)),
                        ));
                        cell.spawn((
                            Text::new(""),
                            TextFont {
                                font_size: 12.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.9, 0.9, 0.9)),
                            QuickSlotLabel(index),
                        ));
                    });
            }
        });
}

/// Helper to spawn a needs bar.
fn spawn_bar(parent: &mut ChildBuilder, label: &str, color: Color, need: NeedKind) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            margin: UiRect::bottom(Val::Px(5.0)),
            ..default()
        })
        .with_children(|bar_parent| {
            bar_parent.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                Node {
                    width: Val::Px(60.0),
                    ..default()
                },
            ));

            bar_parent
                .spawn((
                    Node {
                        width: Val::Px(150.0),
                        height: Val::Px(12.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
                ))
                .with_children(|bg| {
                    bg.spawn((
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(color),
                        NeedBar(need),
                    ));
                });
        });
}

fn update_need_bars(
    player_query: Query<&Needs, With<Player>>,
    mut bar_query: Query<(&mut Node, &NeedBar)>,
) {
    let Ok(needs) = player_query.get_single() else {
        return;
    };

    for (mut node, bar) in bar_query.iter_mut() {
        let meter = match bar.0 {
            NeedKind::Health => needs.health,
            NeedKind::Hunger => needs.hunger,
            NeedKind::Thirst => needs.thirst,
        };
        node.width = Val::Percent(meter.fraction() * 100.0);
    }
}

fn update_quick_slots(
    player_query: Query<&SlotStore, (With<Player>, Changed<SlotStore>)>,
    mut cells: Query<(&QuickSlotCell, &mut BackgroundColor)>,
    mut labels: Query<(&QuickSlotLabel, &mut Text)>,
) {
    let Ok(store) = player_query.get_single() else {
        return;
    };
    let selected_quick = store.selection().and_then(|selection| selection.quick);

    for (cell, mut background) in cells.iter_mut() {
        *background = if selected_quick == Some(cell.0) {
            CELL_SELECTED.into()
        } else {
            CELL_IDLE.into()
        };
    }

    for (label, mut text) in labels.iter_mut() {
        text.0 = match store.quick_slot(label.0).ok().and_then(|quick| quick.stack()) {
            Some(stack) if stack.quantity > 1 => {
                format!("{} x{}", stack.item.display_name, stack.quantity)
            }
            Some(stack) => stack.item.display_name.clone(),
            None => String::new(),
        };
    }
}

fn update_build_progress(
    progress: Res<BuildProgressDisplay>,
    mut frame: Query<&mut Visibility, With<BuildProgressFrame>>,
    mut fill: Query<&mut Node, With<BuildProgressFill>>,
) {
    if !progress.is_changed() {
        return;
    }
    if let Ok(mut visibility) = frame.get_single_mut() {
        *visibility = if progress.fraction > 0.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if let Ok(mut node) = fill.get_single_mut() {
        node.width = Val::Percent(progress.fraction * 100.0);
    }
}

fn update_build_prompt(
    player_query: Query<&BuildPlacementController, With<Player>>,
    mut prompt: Query<&mut Text, With<BuildPrompt>>,
) {
    let Ok(mut text) = prompt.get_single_mut() else {
        return;
    };
    let message = match player_query.get_single().ok().and_then(|c| c.session()) {
        None => String::new(),
        Some(session) => {
            let status = match session.validity {
                Validity::Placeable => "LMB to place",
                Validity::NoSurface => "Nothing to build on",
                Validity::NoSocket => "Needs a free socket",
                Validity::Overlap => "Blocked",
            };
            format!("{}: {}  (R rotate, RMB demolish)", session.item.display_name, status)
        }
    };
    if text.0 != message {
        text.0 = message;
    }
}

fn pickup_toast(item: &ItemRef, quantity: u32) -> String {
    format!("+{} {}", quantity, item.display_name)
}

fn placed_toast(item: &ItemRef) -> String {
    format!("Built {}", item.display_name)
}

/// Post a line for every pickup, gathered resource and placed structure.
fn push_activity_toasts(
    mut commands: Commands,
    mut pickups: EventReader<ItemPickupEvent>,
    mut placed: EventReader<StructurePlaced>,
    feed: Query<Entity, With<ActivityFeed>>,
) {
    let messages: Vec<String> = pickups
        .read()
        .map(|event| pickup_toast(&event.item, event.quantity))
        .chain(placed.read().map(|event| placed_toast(&event.item)))
        .collect();
    let Ok(feed) = feed.get_single() else {
        return;
    };

    commands.entity(feed).with_children(|parent| {
        for message in messages {
            parent.spawn((
                Text::new(message),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.9, 0.7)),
                Toast(TOAST_SECONDS),
            ));
        }
    });
}

/// Count toasts down, dropping expired ones and the oldest beyond the limit.
fn expire_toasts(
    mut commands: Commands,
    time: Res<Time>,
    feed: Query<&Children, With<ActivityFeed>>,
    mut toasts: Query<&mut Toast>,
) {
    let Ok(children) = feed.get_single() else {
        return;
    };
    let overflow = children.len().saturating_sub(MAX_TOASTS);

    for (index, &entity) in children.iter().enumerate() {
        let Ok(mut toast) = toasts.get_mut(entity) else {
            continue;
        };
        toast.0 -= time.delta_secs();
        if toast.0 <= 0.0 || index < overflow {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::test_items::resource;

    #[test]
    fn toasts_name_the_item() {
        let wood = resource("Wood", 20);
        assert_eq!(pickup_toast(&wood, 3), "+3 Wood");
        assert_eq!(placed_toast(&wood), "Built Wood");
    }
}
