//! Test fixtures: a [`Ui`] over a headless backend the test can still inspect.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use veil_engine::backend::{BackendError, Display, EventSource, HeadlessBackend};
use veil_engine::coords::Size;
use veil_engine::input::{EventKind, InputEvent, PointerState};
use veil_engine::surface::Surface;

use crate::config::UiConfig;
use crate::ui::Ui;

pub(crate) const SCREEN: Size = Size::new(200, 100);

/// Shares one [`HeadlessBackend`] between the `Ui` and the test body.
#[derive(Clone)]
pub(crate) struct SharedBackend(pub(crate) Rc<RefCell<HeadlessBackend>>);

impl EventSource for SharedBackend {
    fn wait(&mut self) -> Result<InputEvent, BackendError> {
        self.0.borrow_mut().wait()
    }

    fn discard(&mut self, kind: EventKind) {
        self.0.borrow_mut().discard(kind);
    }

    fn post(&mut self, event: InputEvent) {
        self.0.borrow_mut().post(event);
    }

    fn set_timer(&mut self, interval: Option<Duration>) {
        self.0.borrow_mut().set_timer(interval);
    }

    fn pointer(&self) -> PointerState {
        self.0.borrow().pointer()
    }
}

impl Display for SharedBackend {
    fn screen_size(&self) -> Size {
        self.0.borrow().screen_size()
    }

    fn fullscreen(&self) -> bool {
        self.0.borrow().fullscreen()
    }

    fn configure(&mut self, size: Size, fullscreen: bool) -> Result<(), BackendError> {
        self.0.borrow_mut().configure(size, fullscreen)
    }

    fn present(&mut self, frame: &Surface) -> Result<(), BackendError> {
        self.0.borrow_mut().present(frame)
    }
}

/// A `Ui` that never sleeps, plus a handle on its backend.
pub(crate) fn test_ui() -> (Ui, Rc<RefCell<HeadlessBackend>>) {
    let backend = Rc::new(RefCell::new(HeadlessBackend::new(SCREEN)));
    let config = UiConfig { motion_coalesce: None, ..UiConfig::default() };
    (Ui::with_config(SharedBackend(backend.clone()), config), backend)
}

/// Scripts ticks one at a time; back-to-back ticks would be coalesced.
pub(crate) fn ticks(n: usize) -> impl Iterator<Item = InputEvent> {
    (0..n).flat_map(|_| [InputEvent::Tick, InputEvent::Other])
}
