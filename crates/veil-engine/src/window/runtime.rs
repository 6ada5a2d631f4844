use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result, anyhow, bail};
use softbuffer::{Context, Surface as SoftSurface};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop, OwnedDisplayHandle};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use crate::backend::{BackendError, Display, EventSource};
use crate::coords::Size;
use crate::input::platform::winit::translate_window_event;
use crate::input::{EventKind, InputEvent, InputState, PointerState};
use crate::surface::Surface;
use crate::time::TickClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Inner size in physical pixels; this is the screen size the UI lays out against.
    pub size: Size,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "veil".to_string(),
            size: Size::new(800, 600),
            fullscreen: false,
        }
    }
}

/// Window handles. Fields drop in declaration order: surface, context, window.
struct WindowSlot {
    surface: SoftSurface<OwnedDisplayHandle, Arc<Window>>,
    _context: Context<OwnedDisplayHandle>,
    window: Arc<Window>,
}

/// `ApplicationHandler` that only records: events are translated and queued,
/// the UI pulls them out through `wait`.
struct PumpHandler {
    config: WindowConfig,
    slot: Option<WindowSlot>,
    create_error: Option<String>,
    input: InputState,
    queue: VecDeque<InputEvent>,
    screen: Size,
}

impl PumpHandler {
    fn new(config: WindowConfig) -> Self {
        let screen = config.size;
        Self {
            config,
            slot: None,
            create_error: None,
            input: InputState::default(),
            queue: VecDeque::new(),
            screen,
        }
    }
}

fn create_slot(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<WindowSlot> {
    let mut attrs = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.size.w.max(1) as u32, config.size.h.max(1) as u32))
        .with_resizable(false);
    if config.fullscreen {
        attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    let window = Arc::new(
        event_loop
            .create_window(attrs)
            .context("failed to create window")?,
    );
    let context = Context::new(event_loop.owned_display_handle())
        .map_err(|e| anyhow!("failed to create softbuffer context: {e}"))?;
    let surface = SoftSurface::new(&context, window.clone())
        .map_err(|e| anyhow!("failed to create softbuffer surface: {e}"))?;

    Ok(WindowSlot { surface, _context: context, window })
}

impl ApplicationHandler for PumpHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.slot.is_some() {
            return;
        }
        match create_slot(event_loop, &self.config) {
            Ok(slot) => self.slot = Some(slot),
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.create_error = Some(format!("{e:#}"));
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::Resized(size) = &event {
            self.screen = Size::new(size.width as i32, size.height as i32);
        }
        if let Some(ev) = translate_window_event(&mut self.input, &event) {
            self.input.apply_event(&ev);
            self.queue.push_back(ev);
        }
    }
}

/// A single window driven by pumping the winit event loop.
///
/// `wait` blocks inside `pump_app_events` until the platform delivers an
/// event or the tick timer comes due, so any number of nested modal loops
/// can share one window.
pub struct WinitBackend {
    handler: PumpHandler,
    clock: TickClock,
    event_loop: EventLoop<()>,
}

impl WinitBackend {
    pub fn new(config: WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = PumpHandler::new(config);

        // resumed() fires during the first pumps on desktop platforms.
        for _ in 0..20 {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::from_millis(50)), &mut handler)
            {
                bail!("event loop exited during startup (code {code})");
            }
            if handler.slot.is_some() || handler.create_error.is_some() {
                break;
            }
        }

        if let Some(err) = handler.create_error.take() {
            bail!("{err}");
        }
        if handler.slot.is_none() {
            bail!("window was not created during startup");
        }

        Ok(Self { handler, clock: TickClock::new(), event_loop })
    }

    fn pump(&mut self, timeout: Option<Duration>) -> bool {
        matches!(
            self.event_loop.pump_app_events(timeout, &mut self.handler),
            PumpStatus::Continue
        )
    }
}

impl EventSource for WinitBackend {
    fn wait(&mut self) -> Result<InputEvent, BackendError> {
        loop {
            if self.clock.poll(Instant::now()) {
                self.handler.queue.push_back(InputEvent::Tick);
            }
            if let Some(ev) = self.handler.queue.pop_front() {
                return Ok(ev);
            }
            let timeout = self.clock.remaining(Instant::now());
            if !self.pump(timeout) {
                return Ok(InputEvent::Quit);
            }
        }
    }

    fn discard(&mut self, kind: EventKind) {
        // Pull in whatever the platform already has so the backlog is complete.
        if !self.pump(Some(Duration::ZERO)) {
            self.handler.queue.push_back(InputEvent::Quit);
        }
        self.handler.queue.retain(|ev| ev.kind() != kind);
    }

    fn post(&mut self, event: InputEvent) {
        self.handler.queue.push_back(event);
    }

    fn set_timer(&mut self, interval: Option<Duration>) {
        self.clock.set(interval, Instant::now());
    }

    fn pointer(&self) -> PointerState {
        self.handler.input.pointer()
    }
}

impl Display for WinitBackend {
    fn screen_size(&self) -> Size {
        self.handler.screen
    }

    fn fullscreen(&self) -> bool {
        self.handler.config.fullscreen
    }

    fn configure(&mut self, size: Size, fullscreen: bool) -> Result<(), BackendError> {
        let slot = self
            .handler
            .slot
            .as_ref()
            .ok_or_else(|| BackendError::Window("window is gone".to_string()))?;
        if slot
            .window
            .request_inner_size(PhysicalSize::new(size.w.max(1) as u32, size.h.max(1) as u32))
            .is_none()
        {
            log::debug!("resize to {}x{} requested, applied asynchronously", size.w, size.h);
        }
        slot.window
            .set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
        self.handler.config.fullscreen = fullscreen;
        Ok(())
    }

    fn present(&mut self, frame: &Surface) -> Result<(), BackendError> {
        let slot = self
            .handler
            .slot
            .as_mut()
            .ok_or_else(|| BackendError::Window("window is gone".to_string()))?;

        let size = frame.size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.w as u32), NonZeroU32::new(size.h as u32)) else {
            return Ok(());
        };
        slot.surface
            .resize(w, h)
            .map_err(|e| BackendError::Present(e.to_string()))?;

        let mut buffer = slot
            .surface
            .buffer_mut()
            .map_err(|e| BackendError::Present(e.to_string()))?;
        frame.write_0rgb(&mut buffer);

        slot.window.pre_present_notify();
        buffer.present().map_err(|e| BackendError::Present(e.to_string()))
    }
}
