//! Pause overlay with a controls reference.

use bevy::prelude::*;

use crate::core::GameState;

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.15, 0.2);
const BUTTON_HOVER: Color = Color::srgb(0.25, 0.25, 0.3);
const BUTTON_PRESSED: Color = Color::srgb(0.3, 0.3, 0.35);

const CONTROLS: &[(&str, &str)] = &[
    ("WASD / Shift / Space", "Move, sprint, jump"),
    ("1-9", "Select quick slot"),
    ("Tab", "Inventory and crafting"),
    ("E", "Pick up / open container"),
    ("F", "Use selected item"),
    ("G", "Drop selected stack"),
    ("LMB (hold)", "Build"),
    ("RMB", "Demolish while building"),
    ("R", "Rotate preview"),
    ("Mouse up/down", "Raise or lower foundations"),
];

/// Marker for the pause overlay root.
#[derive(Component)]
struct PauseOverlay;

#[derive(Component, Clone, Copy)]
enum PauseAction {
    Resume,
    Quit,
}

pub fn setup_pause_menu_systems(app: &mut App) {
    app.add_systems(OnEnter(GameState::Paused), spawn_pause_overlay)
        .add_systems(Update, handle_pause_buttons.run_if(in_state(GameState::Paused)))
        .add_systems(OnExit(GameState::Paused), despawn_pause_overlay);
}

fn spawn_pause_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(6.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            PauseOverlay,
        ))
        .with_children(|overlay| {
            overlay.spawn((
                Text::new("Paused"),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.9)),
                Node {
                    margin: UiRect::bottom(Val::Px(18.0)),
                    ..default()
                },
            ));

            for (keys, action) in CONTROLS {
                overlay
                    .spawn(Node {
                        width: Val::Px(420.0),
                        justify_content: JustifyContent::SpaceBetween,
                        ..default()
                    })
                    .with_children(|row| {
                        row.spawn((Text::new(*keys), TextColor(Color::srgb(0.9, 0.8, 0.45))));
                        row.spawn((Text::new(*action), TextColor(Color::srgb(0.75, 0.75, 0.8))));
                    });
            }

            overlay
                .spawn(Node {
                    margin: UiRect::top(Val::Px(24.0)),
                    column_gap: Val::Px(16.0),
                    ..default()
                })
                .with_children(|buttons| {
                    action_button(buttons, "Resume", PauseAction::Resume);
                    action_button(buttons, "Quit", PauseAction::Quit);
                });
        });
}

fn action_button(parent: &mut ChildBuilder, label: &str, action: PauseAction) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(160.0),
                height: Val::Px(44.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_IDLE),
            action,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
            ));
        });
}

fn handle_pause_buttons(
    mut buttons: Query<(&Interaction, &PauseAction, &mut BackgroundColor), Changed<Interaction>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: EventWriter<AppExit>,
) {
    for (interaction, action, mut background) in buttons.iter_mut() {
        background.0 = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
        if *interaction != Interaction::Pressed {
            continue;
        }
        match action {
            PauseAction::Resume => next_state.set(GameState::InGame),
            PauseAction::Quit => {
                info!("Quit from pause menu");
                exit.send(AppExit::Success);
            }
        }
    }
}

fn despawn_pause_overlay(mut commands: Commands, overlays: Query<Entity, With<PauseOverlay>>) {
    for entity in overlays.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
