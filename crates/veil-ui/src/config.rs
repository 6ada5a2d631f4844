//! Tunables for the dialog loop.

use std::time::Duration;

use veil_engine::input::Key;
use veil_engine::paint::Color;
use veil_engine::time::interval_for_fps;

/// Dialog loop configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    /// Tick rate while a timer is armed; also the default motion coalesce delay.
    pub fps: u32,
    /// Overlay drawn over masked widgets of a faded dialog.
    pub fade_color: Color,
    /// Repeat counter value for a freshly pressed key. Negative values delay
    /// the first repeat.
    pub repeat_start: i32,
    /// Ticks between repeats once the counter is running.
    pub repeat_threshold: i32,
    /// Sleep before draining pointer-move backlog. `None` skips the sleep.
    pub motion_coalesce: Option<Duration>,
    /// Key that cycles a focus chain.
    pub focus_key: Key,
}

impl UiConfig {
    pub fn frame_interval(&self) -> Duration {
        interval_for_fps(self.fps)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        let fps = 30;
        Self {
            fps,
            fade_color: Color::rgba(0, 0, 0, 175),
            repeat_start: -10,
            repeat_threshold: 5,
            motion_coalesce: Some(interval_for_fps(fps)),
            focus_key: Key::Tab,
        }
    }
}
