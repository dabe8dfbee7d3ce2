//! Toolkit-independent input events and button state.

use crate::projection::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PointerButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    /// A printable key, uppercased
    Char(char),
    Home,
    Control,
    Shift,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Modifiers {
    pub(crate) control: bool,
    pub(crate) shift: bool,
}

/// Input delivered to the editor, in viewport coordinates (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum InputEvent {
    Pressed { button: PointerButton, x: f32, y: f32 },
    Released { button: PointerButton, x: f32, y: f32 },
    Moved { x: f32, y: f32 },
    KeyPressed(Key),
    KeyReleased(Key),
    ModifiersChanged(Modifiers),
    Resized(Viewport),
}

pub(crate) trait InputHandler {
    /// Applies one event; returns whether the scene needs redrawing
    fn handle_event(&mut self, event: &InputEvent) -> bool;
}

/// Which buttons are down, plus the current and previous cursor positions
#[derive(Debug, Clone, Default)]
pub(crate) struct InputState {
    left: bool,
    middle: bool,
    right: bool,
    mouse: (f32, f32),
    last_mouse: (f32, f32),
    modifiers: Modifiers,
}

impl InputState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn button_mut(&mut self, button: PointerButton) -> &mut bool {
        match button {
            PointerButton::Left => &mut self.left,
            PointerButton::Middle => &mut self.middle,
            PointerButton::Right => &mut self.right,
        }
    }

    pub(crate) fn is_pressed(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Left => self.left,
            PointerButton::Middle => self.middle,
            PointerButton::Right => self.right,
        }
    }

    /// Marks the button down; false if it already was
    pub(crate) fn press(&mut self, button: PointerButton) -> bool {
        !std::mem::replace(self.button_mut(button), true)
    }

    /// Marks the button up; false if it was not down
    pub(crate) fn release(&mut self, button: PointerButton) -> bool {
        std::mem::replace(self.button_mut(button), false)
    }

    /// Records a new cursor position, keeping the previous one
    pub(crate) fn update_mouse_position(&mut self, x: f32, y: f32) {
        self.last_mouse = self.mouse;
        self.mouse = (x, y);
    }

    pub(crate) fn mouse_position(&self) -> (f32, f32) {
        self.mouse
    }

    pub(crate) fn last_mouse_position(&self) -> (f32, f32) {
        self.last_mouse
    }

    pub(crate) fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub(crate) fn set_control(&mut self, pressed: bool) {
        self.modifiers.control = pressed;
    }

    pub(crate) fn set_shift(&mut self, pressed: bool) {
        self.modifiers.shift = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_are_tracked_independently() {
        let mut input = InputState::new();
        assert!(input.press(PointerButton::Left));
        assert!(input.press(PointerButton::Right));
        assert!(!input.press(PointerButton::Left));
        assert!(input.is_pressed(PointerButton::Left));
        assert!(!input.is_pressed(PointerButton::Middle));

        assert!(input.release(PointerButton::Left));
        assert!(!input.release(PointerButton::Left));
        assert!(input.is_pressed(PointerButton::Right));
    }

    #[test]
    fn previous_position_is_kept() {
        let mut input = InputState::new();
        input.update_mouse_position(10.0, 20.0);
        input.update_mouse_position(15.0, 18.0);
        assert_eq!(input.last_mouse_position(), (10.0, 20.0));
        assert_eq!(input.mouse_position(), (15.0, 18.0));
    }
}
