//! Dialog state carried by dialog nodes.
//!
//! [`Modal`] is what [`Ui::call_dialog`] runs. [`DialogState`] holds a
//! dialog's handlers, fade state and focus chain, and [`KeyRepeat`] turns a
//! held key into repeated key-downs on timer ticks.

use std::rc::Rc;

use veil_engine::input::InputEvent;
use veil_engine::surface::Surface;

use crate::error::UiError;
use crate::focus::FocusChain;
use crate::handler::{DialogOutcome, HandlerRegistry};
use crate::ui::Ui;
use crate::widget::WidgetId;

/// Something [`Ui::call_dialog`] can run.
///
/// A bare dialog id runs the plain loop. Stock dialogs override `show` to
/// reset their state before entering it.
pub trait Modal {
    fn dialog(&self) -> WidgetId;

    fn show(&self, ui: &mut Ui) -> Result<DialogOutcome, UiError> {
        ui.show(self.dialog())
    }
}

impl Modal for WidgetId {
    fn dialog(&self) -> WidgetId {
        *self
    }
}

/// Held-key tracking for synthetic repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeyRepeat {
    held: Option<InputEvent>,
    counter: i32,
}

impl KeyRepeat {
    pub(crate) fn press(&mut self, event: InputEvent, start: i32) {
        self.held = Some(event);
        self.counter = start;
    }

    pub(crate) fn release(&mut self) {
        self.held = None;
    }

    pub(crate) fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Advances one tick; yields the held key-down when a repeat is due.
    pub(crate) fn tick(&mut self, threshold: i32) -> Option<InputEvent> {
        let held = self.held.as_ref()?;
        self.counter += 1;
        if self.counter >= threshold {
            self.counter = 0;
            Some(held.clone())
        } else {
            None
        }
    }
}

/// Everything a dialog node carries beyond a plain widget.
#[derive(Default)]
pub(crate) struct DialogState {
    pub(crate) handlers: HandlerRegistry,
    pub(crate) faded: bool,
    pub(crate) needs_remask: bool,
    pub(crate) fade_mask: Option<Rc<Surface>>,
    /// Cached "has tick handlers"; reset whenever the tick list changes.
    pub(crate) needs_timer: Option<bool>,
    pub(crate) focus: Option<FocusChain>,
    pub(crate) repeat: KeyRepeat,
}

impl DialogState {
    pub(crate) fn new() -> Self {
        Self { needs_remask: true, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_engine::input::Key;

    #[test]
    fn first_repeat_waits_longer_than_the_rest() {
        let mut r = KeyRepeat::default();
        r.press(InputEvent::key_down(Key::ArrowDown), -10);

        let mut fired = Vec::new();
        for tick in 1..=25 {
            if r.tick(5).is_some() {
                fired.push(tick);
            }
        }
        assert_eq!(fired, vec![15, 20, 25]);
    }

    #[test]
    fn release_stops_repeats() {
        let mut r = KeyRepeat::default();
        r.press(InputEvent::key_down(Key::A), 4);
        r.release();
        assert!(!r.is_held());
        assert_eq!(r.tick(5), None);
    }
}
