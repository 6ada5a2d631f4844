use std::fmt;

use bitflags::bitflags;

use crate::coords::Point;

/// Keyboard key identifier.
///
/// The runtime maps platform keycodes into these variants where possible.
/// For unsupported keys, use `Key::Unknown(u32)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers as keys
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

bitflags! {
    /// Set of held pointer buttons, carried by every pointer-move event.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const PRIMARY   = 0b0001;
        const MIDDLE    = 0b0010;
        const SECONDARY = 0b0100;
        const EXTRA     = 0b1000;
    }
}

impl From<MouseButton> for Buttons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Buttons::PRIMARY,
            MouseButton::Middle => Buttons::MIDDLE,
            MouseButton::Right => Buttons::SECONDARY,
            MouseButton::Back | MouseButton::Forward | MouseButton::Other(_) => Buttons::EXTRA,
        }
    }
}

/// Modifier keys state.
///
/// This is stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true, ctrl: false, alt: false, meta: false };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Pointer position plus held buttons, as last reported by the platform.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PointerState {
    pub pos: Point,
    pub buttons: Buttons,
}

/// Platform-agnostic input events delivered by an
/// [`EventSource`](crate::backend::EventSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer moved. `buttons` is the set held at the time of the move.
    PointerMoved { pos: Point, buttons: Buttons },
    PointerPressed { pos: Point, button: MouseButton },
    PointerReleased { pos: Point, button: MouseButton },

    /// Key pressed. `ch` is the printable character it produced, if any.
    KeyDown { key: Key, ch: Option<char>, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },

    /// Periodic timer tick (see `EventSource::set_timer`).
    Tick,

    /// The user asked the application to terminate.
    Quit,

    /// Anything the engine does not route (focus changes, resizes, ...).
    Other,
}

/// Discriminant of [`InputEvent`], used to drain backlogs of one kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    PointerMoved,
    PointerPressed,
    PointerReleased,
    KeyDown,
    KeyUp,
    Tick,
    Quit,
    Other,
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::PointerMoved { .. } => EventKind::PointerMoved,
            InputEvent::PointerPressed { .. } => EventKind::PointerPressed,
            InputEvent::PointerReleased { .. } => EventKind::PointerReleased,
            InputEvent::KeyDown { .. } => EventKind::KeyDown,
            InputEvent::KeyUp { .. } => EventKind::KeyUp,
            InputEvent::Tick => EventKind::Tick,
            InputEvent::Quit => EventKind::Quit,
            InputEvent::Other => EventKind::Other,
        }
    }

    /// Key-down without a produced character.
    pub fn key_down(key: Key) -> Self {
        InputEvent::KeyDown { key, ch: None, modifiers: Modifiers::NONE }
    }

    /// Key-down that produced `ch`.
    pub fn char_down(key: Key, ch: char) -> Self {
        InputEvent::KeyDown { key, ch: Some(ch), modifiers: Modifiers::NONE }
    }

    pub fn key_up(key: Key) -> Self {
        InputEvent::KeyUp { key, modifiers: Modifiers::NONE }
    }

    /// Pointer position carried by the event, if it has one.
    pub fn pos(&self) -> Option<Point> {
        match self {
            InputEvent::PointerMoved { pos, .. }
            | InputEvent::PointerPressed { pos, .. }
            | InputEvent::PointerReleased { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Modifiers carried by a key event.
    pub fn modifiers(&self) -> Modifiers {
        match self {
            InputEvent::KeyDown { modifiers, .. } | InputEvent::KeyUp { modifiers, .. } => *modifiers,
            _ => Modifiers::NONE,
        }
    }
}
