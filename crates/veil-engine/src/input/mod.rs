//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Backends translate platform events into [`InputEvent`]s and keep an
//! [`InputState`] so they can answer pointer queries between events.

pub(crate) mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{Buttons, EventKind, InputEvent, Key, Modifiers, MouseButton, PointerState};
