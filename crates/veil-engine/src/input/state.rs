use std::collections::HashSet;

use crate::coords::Point;

use super::types::{Buttons, InputEvent, Key, Modifiers, MouseButton, PointerState};

/// Current input state tracked by a backend.
///
/// Holds "is down" information and the pointer position so that synthetic
/// events (e.g. a pointer refresh after a dialog closes) can be built without
/// asking the platform.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Pointer position in pixels.
    pub pointer_pos: Point,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons: Buttons,
}

impl InputState {
    /// Applies an event to the tracked state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::PointerMoved { pos, buttons } => {
                self.pointer_pos = *pos;
                self.buttons = *buttons;
            }
            InputEvent::PointerPressed { pos, button } => {
                self.pointer_pos = *pos;
                self.buttons |= Buttons::from(*button);
            }
            InputEvent::PointerReleased { pos, button } => {
                self.pointer_pos = *pos;
                self.buttons -= Buttons::from(*button);
            }
            InputEvent::KeyDown { key, modifiers, .. } => {
                self.modifiers = *modifiers;
                self.keys_down.insert(*key);
            }
            InputEvent::KeyUp { key, modifiers } => {
                self.modifiers = *modifiers;
                self.keys_down.remove(key);
            }
            InputEvent::Tick | InputEvent::Quit | InputEvent::Other => {}
        }
    }

    /// Drops every held key and button, e.g. on focus loss.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.buttons = Buttons::empty();
    }

    pub fn pointer(&self) -> PointerState {
        PointerState { pos: self.pointer_pos, buttons: self.buttons }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons.contains(Buttons::from(btn))
    }
}
