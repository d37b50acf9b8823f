//! Per-frame keyboard and mouse state.

use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Tracks held keys and edges between two rendered frames.
///
/// Window events arrive between frames, so "just pressed" means pressed at
/// least once since the last [`end_frame`](Self::end_frame).
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
    buttons_held: u32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.key(*code, *state, *repeat),
            WindowEvent::MouseInput { state, .. } => self.button(*state),
            WindowEvent::Focused(false) => self.clear(),
            _ => (),
        }
    }

    pub fn key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat && self.held.insert(code) {
                    self.just_pressed.insert(code);
                }
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    pub fn button(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => self.buttons_held += 1,
            ElementState::Released => self.buttons_held = self.buttons_held.saturating_sub(1),
        }
    }

    pub fn key_just_pressed(&self, code: KeyCode) -> bool {
        self.just_pressed.contains(&code)
    }

    /// True while any mouse button is down, which turns mouse motion into a drag.
    pub fn dragging(&self) -> bool {
        self.buttons_held > 0
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.buttons_held = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_visible_until_end_of_frame() {
        let mut input = InputState::new();
        input.key(KeyCode::Escape, ElementState::Pressed, false);
        assert!(input.key_just_pressed(KeyCode::Escape));
        input.end_frame();
        assert!(!input.key_just_pressed(KeyCode::Escape));
    }

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.key(KeyCode::Escape, ElementState::Pressed, false);
        input.end_frame();
        input.key(KeyCode::Escape, ElementState::Pressed, true);
        assert!(!input.key_just_pressed(KeyCode::Escape));
    }

    #[test]
    fn release_then_press_counts_again() {
        let mut input = InputState::new();
        input.key(KeyCode::Escape, ElementState::Pressed, false);
        input.end_frame();
        input.key(KeyCode::Escape, ElementState::Released, false);
        input.key(KeyCode::Escape, ElementState::Pressed, false);
        assert!(input.key_just_pressed(KeyCode::Escape));
    }

    #[test]
    fn dragging_follows_buttons() {
        let mut input = InputState::new();
        assert!(!input.dragging());
        input.button(ElementState::Pressed);
        assert!(input.dragging());
        input.button(ElementState::Released);
        input.button(ElementState::Released);
        assert!(!input.dragging());
    }
}
