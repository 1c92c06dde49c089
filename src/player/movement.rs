//! First-person player movement and camera control.

use bevy::pbr::FogFalloff;
use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;

use super::components::*;
use super::input::PlayerInput;
use crate::building::BuildPlacementController;
use crate::core::{GameConfig, GameplaySet, PlayState};
use crate::inventory::SlotStore;

/// Marker component for the player's camera.
#[derive(Component, Default)]
pub struct PlayerCamera {
    /// Current pitch angle in radians (looking up/down)
    pub pitch: f32,
}

/// Set up player movement systems.
pub fn setup_movement_systems(app: &mut App) {
    app.add_systems(OnEnter(PlayState::Exploring), grab_cursor)
        .add_systems(OnExit(PlayState::Exploring), release_cursor)
        .add_systems(
            Update,
            (mouse_look, player_movement)
                .in_set(GameplaySet::Actions)
                .run_if(in_state(PlayState::Exploring)),
        );
}

/// Grab and hide cursor while exploring.
fn grab_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

/// Release cursor for the inventory window and pause.
fn release_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Rotates the player entity horizontally (yaw) and the camera vertically (pitch).
/// The camera is a child of the player, so horizontal rotation affects both.
pub fn mouse_look(
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    mut player_query: Query<&mut Transform, With<Player>>,
    mut camera_query: Query<(&mut Transform, &mut PlayerCamera), Without<Player>>,
    building: Query<&BuildPlacementController, With<Player>>,
) {
    let mut delta = input.look;

    // Vertical mouse movement raises and lowers foundations instead
    if building
        .get_single()
        .ok()
        .and_then(|controller| controller.session())
        .and_then(|session| session.spec())
        .is_some_and(|spec| spec.adjusts_height())
    {
        delta.y = 0.0;
    }

    if delta == Vec2::ZERO {
        return;
    }

    let Ok(mut player_transform) = player_query.get_single_mut() else {
        return;
    };
    let Ok((mut camera_transform, mut camera)) = camera_query.get_single_mut() else {
        return;
    };

    let movement = &config.movement;
    let sensitivity = movement.mouse_sensitivity * 0.001;
    let y_invert = if movement.invert_y { -1.0 } else { 1.0 };

    player_transform.rotate_y(-delta.x * sensitivity);

    // Clamped to prevent flipping
    camera.pitch -= delta.y * sensitivity * y_invert;
    camera.pitch = camera.pitch.clamp(-1.4, 1.4);

    camera_transform.rotation = Quat::from_rotation_x(camera.pitch);
}

/// Walk, sprint and jump through Rapier's `KinematicCharacterController`.
pub fn player_movement(
    input: Res<PlayerInput>,
    time: Res<Time>,
    config: Res<GameConfig>,
    rapier_context: Query<&RapierContext>,
    mut player_query: Query<
        (
            Entity,
            &Transform,
            &mut MovementState,
            &mut KinematicCharacterController,
        ),
        With<Player>,
    >,
) {
    let Ok((player_entity, transform, mut movement_state, mut controller)) =
        player_query.get_single_mut()
    else {
        return;
    };
    let movement = &config.movement;

    // Capsule bottom sits 0.8 below the center
    let is_grounded = match rapier_context.get_single() {
        Ok(context) => context
            .cast_ray(
                transform.translation - Vec3::Y * 0.75,
                Vec3::NEG_Y,
                0.15,
                true,
                QueryFilter::default()
                    .exclude_sensors()
                    .exclude_collider(player_entity),
            )
            .is_some(),
        Err(_) => true,
    };
    movement_state.is_grounded = is_grounded;

    if is_grounded {
        if movement_state.vertical_velocity < 0.0 {
            movement_state.vertical_velocity = 0.0;
        }
        if input.jump_pressed {
            movement_state.vertical_velocity = movement.jump_force;
        }
    } else {
        movement_state.vertical_velocity -= movement.gravity * time.delta_secs();
    }

    let direction = Vec3::new(input.movement.x, 0.0, -input.movement.y);

    // Only horizontal facing matters
    let yaw = transform.rotation.to_euler(EulerRot::YXZ).0;
    let heading = Quat::from_rotation_y(yaw) * direction;

    let speed = if input.sprint_held {
        movement.move_speed * movement.sprint_multiplier
    } else {
        movement.move_speed
    };

    let horizontal = heading * speed * time.delta_secs();
    let vertical = Vec3::Y * movement_state.vertical_velocity * time.delta_secs();

    controller.translation = Some(horizontal + vertical);
}

/// Spawn the player holding `inventory`, with a camera at eye level.
pub fn spawn_player(
    commands: &mut Commands,
    position: Vec3,
    inventory: SlotStore,
    config: &GameConfig,
) -> Entity {
    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            MovementState::default(),
            Needs::from_config(&config.needs),
            ToolSwing::default(),
            inventory,
            BuildPlacementController::default(),
            Transform::from_translation(position),
            Visibility::default(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.3),
            KinematicCharacterController {
                offset: CharacterLength::Absolute(0.01),
                autostep: Some(CharacterAutostep {
                    max_height: CharacterLength::Absolute(0.4),
                    min_width: CharacterLength::Absolute(0.3),
                    include_dynamic_bodies: false,
                }),
                max_slope_climb_angle: 45_f32.to_radians(),
                min_slope_slide_angle: 30_f32.to_radians(),
                snap_to_ground: Some(CharacterLength::Absolute(0.5)),
                ..default()
            },
        ))
        .id();

    commands.entity(player).with_children(|parent| {
        parent.spawn((
            Camera3d::default(),
            Camera {
                clear_color: ClearColorConfig::Custom(Color::srgb(0.55, 0.7, 0.85)),
                ..default()
            },
            DistanceFog {
                color: Color::srgb(0.6, 0.7, 0.8),
                falloff: FogFalloff::Linear {
                    start: 40.0,
                    end: 120.0,
                },
                ..default()
            },
            PlayerCamera::default(),
            Transform::from_xyz(0.0, 0.4, 0.0),
        ));
    });

    info!("Spawned player at {:?}", position);
    player
}
