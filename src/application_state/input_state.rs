//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! It provides enums and structs for representing the state of input devices, and
//! the translation of that state into player commands.

use std::collections::HashMap;

use winit::{event::MouseButton, keyboard::KeyCode};

use crate::engine_state::physics::MovementIntent;

/// Keys selecting a hotbar slot, in slot order.
pub const HOTBAR_KEYS: [KeyCode; 5] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
];

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Determines if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Updates the input state based on the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed input states with state transitions.
///
/// This struct provides access to the processed state of all input devices,
/// with key and button states translated into RawInputState enum values.
#[derive(Debug, Clone, Default)]
pub struct ProcessedInputState {
    /// Current state of all tracked keyboard keys
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Current state of mouse buttons
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Cursor position in window pixels, from the top-left corner
    pub cursor_position: (f64, f64),

    /// Whole scroll wheel steps since the last frame, positive away from the user
    pub scroll_steps: i32,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the state of a mouse button
    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states.get(&button).copied().unwrap_or_default()
    }

    fn axis(&self, negative: KeyCode, positive: KeyCode) -> f64 {
        let mut value = 0.0;
        if self.get_key_state(negative).is_active() {
            value -= 1.0;
        }
        if self.get_key_state(positive).is_active() {
            value += 1.0;
        }
        value
    }

    /// The movement the held keys ask for.
    ///
    /// A and D strafe along X, W and S move along Z, Space jumps or ascends and left
    /// shift descends while flying.
    pub fn movement_intent(&self) -> MovementIntent {
        MovementIntent {
            strafe: self.axis(KeyCode::KeyA, KeyCode::KeyD),
            forward: self.axis(KeyCode::KeyW, KeyCode::KeyS),
            jump: self.get_key_state(KeyCode::Space).is_active(),
            descend: self.get_key_state(KeyCode::ShiftLeft).is_active(),
        }
    }

    /// Whether flying was toggled this frame.
    pub fn fly_toggled(&self) -> bool {
        self.get_key_state(KeyCode::KeyF).is_just_pressed()
    }

    /// The hotbar slot whose number key was pressed this frame, if any.
    pub fn selected_hotbar_slot(&self) -> Option<usize> {
        HOTBAR_KEYS
            .iter()
            .position(|key| self.get_key_state(*key).is_just_pressed())
    }
}

/// Tracks the state of mouse inputs including buttons, scroll, and the cursor.
#[derive(Debug, Clone, Default)]
pub struct MouseInput {
    /// Previous state of each mouse button (pressed/released)
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Current state of each mouse button (pressed/released)
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,

    /// Scroll in wheel lines not yet reported as whole steps
    pub scroll_accumulator: f64,

    /// Last known cursor position in window pixels
    pub cursor_position: (f64, f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(keys: &[(KeyCode, RawInputState)]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn transitions_follow_the_previous_state() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(RawInputState::Held.is_active());
        assert!(!RawInputState::Released.is_active());
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let intent = input(&[
            (KeyCode::KeyA, RawInputState::Held),
            (KeyCode::KeyD, RawInputState::Pressed),
            (KeyCode::KeyW, RawInputState::Held),
            (KeyCode::Space, RawInputState::Pressed),
        ])
        .movement_intent();

        assert_eq!(intent.strafe, 0.0);
        assert_eq!(intent.forward, -1.0);
        assert!(intent.jump);
        assert!(!intent.descend);
    }

    #[test]
    fn toggles_fire_only_on_the_press() {
        let pressed = input(&[(KeyCode::KeyF, RawInputState::Pressed)]);
        let held = input(&[(KeyCode::KeyF, RawInputState::Held)]);
        assert!(pressed.fly_toggled());
        assert!(!held.fly_toggled());
    }

    #[test]
    fn number_keys_pick_hotbar_slots() {
        assert_eq!(input(&[]).selected_hotbar_slot(), None);
        let third = input(&[(KeyCode::Digit3, RawInputState::Pressed)]);
        assert_eq!(third.selected_hotbar_slot(), Some(2));
    }
}
