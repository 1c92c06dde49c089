//! Per-frame input snapshot.
//!
//! Devices are read once in `GameplaySet::Input`; every gameplay system
//! reads [`PlayerInput`] instead of the keyboard and mouse directly.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

const QUICK_SLOT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// What the player asked for this frame.
#[derive(Resource, Clone, Debug, Default)]
pub struct PlayerInput {
    /// x = strafe, y = forward
    pub movement: Vec2,
    /// Raw mouse delta
    pub look: Vec2,
    pub jump_pressed: bool,
    pub sprint_held: bool,
    pub primary_pressed: bool,
    pub primary_held: bool,
    pub secondary_pressed: bool,
    pub rotate_pressed: bool,
    pub interact_pressed: bool,
    pub inventory_pressed: bool,
    /// Zero-based quick slot picked with the digit row
    pub quick_slot: Option<usize>,
    pub use_pressed: bool,
    pub drop_pressed: bool,
}

/// Digit key pressed this frame, as a zero-based index.
pub fn pressed_digit(keyboard: &ButtonInput<KeyCode>) -> Option<usize> {
    QUICK_SLOT_KEYS.iter().position(|key| keyboard.just_pressed(*key))
}

/// Refresh the snapshot from keyboard and mouse.
pub fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut input: ResMut<PlayerInput>,
) {
    let mut movement = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        movement.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        movement.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        movement.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        movement.x += 1.0;
    }

    *input = PlayerInput {
        movement: movement.normalize_or_zero(),
        look: mouse_motion.read().map(|event| event.delta).sum(),
        jump_pressed: keyboard.just_pressed(KeyCode::Space),
        sprint_held: keyboard.pressed(KeyCode::ShiftLeft),
        primary_pressed: mouse.just_pressed(MouseButton::Left),
        primary_held: mouse.pressed(MouseButton::Left),
        secondary_pressed: mouse.just_pressed(MouseButton::Right),
        rotate_pressed: keyboard.just_pressed(KeyCode::KeyR),
        interact_pressed: keyboard.just_pressed(KeyCode::KeyE),
        inventory_pressed: keyboard.just_pressed(KeyCode::Tab),
        quick_slot: pressed_digit(&keyboard),
        use_pressed: keyboard.just_pressed(KeyCode::KeyF),
        drop_pressed: keyboard.just_pressed(KeyCode::KeyG),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_row_maps_to_zero_based_slots() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert_eq!(pressed_digit(&keyboard), None);

        keyboard.press(KeyCode::Digit3);
        assert_eq!(pressed_digit(&keyboard), Some(2));
    }
}
