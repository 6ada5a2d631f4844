use std::collections::VecDeque;
use std::time::Duration;

use crate::coords::Size;
use crate::input::{EventKind, InputEvent, InputState, PointerState};
use crate::surface::Surface;

use super::{BackendError, Display, EventSource};

/// Deterministic backend driven by a pre-recorded event script.
///
/// `wait` pops the next scripted event and returns
/// [`BackendError::Exhausted`] once the script runs dry, which unwinds any
/// modal loop still waiting. Timer ticks are never generated on their own;
/// script them explicitly.
#[derive(Debug)]
pub struct HeadlessBackend {
    screen: Size,
    fullscreen: bool,
    queue: VecDeque<InputEvent>,
    input: InputState,

    /// Every `set_timer` call, in order.
    pub timer_log: Vec<Option<Duration>>,
    /// Number of presented frames.
    pub presents: usize,
    /// The most recently presented frame.
    pub last_frame: Option<Surface>,
    /// Sizes passed to `configure`.
    pub configured: Vec<Size>,
}

impl HeadlessBackend {
    pub fn new(screen: Size) -> Self {
        Self {
            screen,
            fullscreen: false,
            queue: VecDeque::new(),
            input: InputState::default(),
            timer_log: Vec::new(),
            presents: 0,
            last_frame: None,
            configured: Vec::new(),
        }
    }

    /// Appends events to the script.
    pub fn script(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.queue.extend(events);
    }

    /// Events not yet delivered.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether the tick timer is currently armed.
    pub fn timer_armed(&self) -> bool {
        matches!(self.timer_log.last(), Some(Some(_)))
    }
}

impl EventSource for HeadlessBackend {
    fn wait(&mut self) -> Result<InputEvent, BackendError> {
        let ev = self.queue.pop_front().ok_or(BackendError::Exhausted)?;
        self.input.apply_event(&ev);
        Ok(ev)
    }

    /// Only the run of `kind` at the head of the script counts as backlog;
    /// later events of the same kind stand for input that has not arrived yet.
    fn discard(&mut self, kind: EventKind) {
        while let Some(ev) = self.queue.pop_front() {
            if ev.kind() != kind {
                self.queue.push_front(ev);
                break;
            }
            // Keep the tracked pointer in sync with what gets coalesced away.
            self.input.apply_event(&ev);
        }
    }

    fn post(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    fn set_timer(&mut self, interval: Option<Duration>) {
        self.timer_log.push(interval);
    }

    fn pointer(&self) -> PointerState {
        self.input.pointer()
    }
}

impl Display for HeadlessBackend {
    fn screen_size(&self) -> Size {
        self.screen
    }

    fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn configure(&mut self, size: Size, fullscreen: bool) -> Result<(), BackendError> {
        self.configured.push(size);
        self.fullscreen = fullscreen;
        Ok(())
    }

    fn present(&mut self, frame: &Surface) -> Result<(), BackendError> {
        self.presents += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
