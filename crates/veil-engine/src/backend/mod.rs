//! Platform seams: where input events come from and where frames go.
//!
//! The UI layer only talks to these traits. Two implementations ship with the
//! engine: [`HeadlessBackend`] (scripted, for tests and tooling) and
//! [`crate::window::WinitBackend`] (a real window).

mod error;
mod headless;

use std::time::Duration;

use crate::coords::Size;
use crate::input::{EventKind, InputEvent, PointerState};
use crate::surface::Surface;

pub use error::BackendError;
pub use headless::HeadlessBackend;

/// Serial stream of input events.
pub trait EventSource {
    /// Blocks until the next event is available.
    fn wait(&mut self) -> Result<InputEvent, BackendError>;

    /// Drops every pending event of `kind` (backlog coalescing).
    fn discard(&mut self, kind: EventKind);

    /// Appends a synthetic event to the queue.
    fn post(&mut self, event: InputEvent);

    /// Arms (`Some`) or disarms (`None`) the periodic tick timer.
    fn set_timer(&mut self, interval: Option<Duration>);

    /// Last known pointer position and held buttons.
    fn pointer(&self) -> PointerState;
}

/// Presentation target owned by the top-level widget.
pub trait Display {
    fn screen_size(&self) -> Size;

    fn fullscreen(&self) -> bool;

    /// Called when the root widget rebuilds its buffers.
    fn configure(&mut self, size: Size, fullscreen: bool) -> Result<(), BackendError>;

    /// Shows a finished frame.
    fn present(&mut self, frame: &Surface) -> Result<(), BackendError>;
}

/// Everything the UI needs from a platform.
pub trait Backend: EventSource + Display {}

impl<T: EventSource + Display> Backend for T {}
