//! The UI context and the modal dialog loop.
//!
//! [`Ui`] owns the widget tree, the backend and the identity of the
//! top-level dialog. Each [`Ui::show`] runs one blocking loop:
//!
//! 1. redraw the top-level dialog,
//! 2. wait for the next event,
//! 3. gather the applicable handlers of the running dialog and run them in
//!    priority order until one handles the event or exits the loop.
//!
//! Nested dialogs are nested calls: a handler calls [`Ui::call_dialog`],
//! which fades the caller and runs the new dialog's loop to completion.

use std::time::Duration;

use veil_engine::backend::{Backend, Display as _, EventSource as _};
use veil_engine::input::{Buttons, EventKind, InputEvent};

use crate::config::UiConfig;
use crate::dialog::Modal;
use crate::error::UiError;
use crate::handler::{
    Category, DEFAULT_PRIORITY, DialogOutcome, Dispatch, HandlerId, HandlerResult, KeyBinding, share,
};
use crate::layout::Layout;
use crate::tree::WidgetTree;
use crate::widget::WidgetId;

pub struct Ui {
    tree: WidgetTree,
    backend: Box<dyn Backend>,
    top: Option<WidgetId>,
    /// Interval the backend's tick timer is armed with.
    timer: Option<Duration>,
    config: UiConfig,
}

impl Ui {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::with_config(backend, UiConfig::default())
    }

    pub fn with_config(backend: impl Backend + 'static, config: UiConfig) -> Self {
        let mut tree = WidgetTree::new(backend.screen_size());
        tree.fade_color = config.fade_color;
        Self { tree, backend: Box::new(backend), top: None, timer: None, config }
    }

    #[inline]
    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    #[inline]
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Plain widget under `parent`.
    pub fn add_widget(&mut self, parent: WidgetId, layout: Layout) -> Result<WidgetId, UiError> {
        self.tree.insert(Some(parent), layout)
    }

    /// Dialog under `parent`, or a parentless one that can become top-level.
    pub fn add_dialog(&mut self, parent: Option<WidgetId>, layout: Layout) -> Result<WidgetId, UiError> {
        self.tree.insert_dialog(parent, layout, false)
    }

    /// Dialog with a focus chain. The focus key cycles it (Shift reverses).
    pub fn add_focus_dialog(&mut self, parent: Option<WidgetId>, layout: Layout) -> Result<WidgetId, UiError> {
        let id = self.tree.insert_dialog(parent, layout, true)?;
        let key = self.config.focus_key;
        self.add_key_handler_at(id, key, 0, move |ui, ev| {
            let InputEvent::KeyDown { modifiers, .. } = ev else {
                return Ok(HandlerResult::Continue);
            };
            ui.tree_mut().cycle_focus(id, modifiers.shift)?;
            Ok(HandlerResult::Handled)
        })?;
        Ok(id)
    }

    /// Frees `id` and its subtree, along with every handler registered on
    /// them.
    pub fn destroy(&mut self, id: WidgetId) -> Result<(), UiError> {
        self.tree.destroy(id)?;
        if self.top == Some(id) {
            self.top = None;
        }
        Ok(())
    }

    // ── Top-level dialog ──────────────────────────────────────────────────

    pub fn top(&self) -> Option<WidgetId> {
        self.top
    }

    /// Makes `dialog` the one that owns the display.
    pub fn make_top(&mut self, dialog: WidgetId) -> Result<(), UiError> {
        self.tree.dialog(dialog)?;
        if self.tree.parent(dialog)?.is_some() {
            return Err(UiError::ParentedTopLevel(dialog));
        }
        self.top = Some(dialog);
        self.tree.mark_full_redraw(dialog)
    }

    /// Runs the redraw pipeline on the top-level dialog.
    pub fn redraw(&mut self) -> Result<(), UiError> {
        let top = self.top.ok_or(UiError::NoTopLevel)?;
        self.tree.redraw(top, self.backend.as_mut())
    }

    // ── Handler registration ──────────────────────────────────────────────

    fn owning_dialog(&self, widget: WidgetId) -> Result<WidgetId, UiError> {
        self.tree.nearest_dialog(widget)?.ok_or_else(|| {
            log::warn!("handler registered on {widget}, which has no enclosing dialog");
            UiError::NoEnclosingDialog(widget)
        })
    }

    /// Registers `f` at the default priority with the dialog that owns `widget`.
    pub fn add_handler<F>(&mut self, widget: WidgetId, category: Category, f: F) -> Result<HandlerId, UiError>
    where
        F: FnMut(&mut Ui, &InputEvent) -> Result<HandlerResult, UiError> + 'static,
    {
        self.add_handler_at(widget, category, DEFAULT_PRIORITY, f)
    }

    /// Lower priorities run first.
    pub fn add_handler_at<F>(
        &mut self,
        widget: WidgetId,
        category: Category,
        priority: i32,
        f: F,
    ) -> Result<HandlerId, UiError>
    where
        F: FnMut(&mut Ui, &InputEvent) -> Result<HandlerResult, UiError> + 'static,
    {
        let dialog = self.owning_dialog(widget)?;
        let state = self.tree.dialog_mut(dialog)?;
        if category == Category::Tick {
            state.needs_timer = None;
        }
        Ok(state.handlers.add(category, priority, widget, share(f)))
    }

    /// Returns whether the handler was registered.
    pub fn remove_handler(&mut self, widget: WidgetId, category: Category, id: HandlerId) -> Result<bool, UiError> {
        let dialog = self.owning_dialog(widget)?;
        let state = self.tree.dialog_mut(dialog)?;
        if category == Category::Tick {
            state.needs_timer = None;
        }
        Ok(state.handlers.remove(category, id))
    }

    pub fn add_key_handler<F>(
        &mut self,
        widget: WidgetId,
        binding: impl Into<KeyBinding>,
        f: F,
    ) -> Result<HandlerId, UiError>
    where
        F: FnMut(&mut Ui, &InputEvent) -> Result<HandlerResult, UiError> + 'static,
    {
        self.add_key_handler_at(widget, binding, DEFAULT_PRIORITY, f)
    }

    pub fn add_key_handler_at<F>(
        &mut self,
        widget: WidgetId,
        binding: impl Into<KeyBinding>,
        priority: i32,
        f: F,
    ) -> Result<HandlerId, UiError>
    where
        F: FnMut(&mut Ui, &InputEvent) -> Result<HandlerResult, UiError> + 'static,
    {
        let dialog = self.owning_dialog(widget)?;
        let state = self.tree.dialog_mut(dialog)?;
        Ok(state.handlers.add_key(binding.into(), priority, widget, share(f)))
    }

    pub fn remove_key_handler(
        &mut self,
        widget: WidgetId,
        binding: impl Into<KeyBinding>,
        id: HandlerId,
    ) -> Result<bool, UiError> {
        let dialog = self.owning_dialog(widget)?;
        let state = self.tree.dialog_mut(dialog)?;
        Ok(state.handlers.remove_key(binding.into(), id))
    }

    // ── Timer ─────────────────────────────────────────────────────────────

    /// Arms the tick timer if `dialog` has tick handlers, or unconditionally
    /// with `force`.
    pub fn start_timer(&mut self, dialog: WidgetId, force: bool) -> Result<(), UiError> {
        let state = self.tree.dialog_mut(dialog)?;
        let needs = match state.needs_timer {
            Some(needs) => needs,
            None => {
                let needs = state.handlers.has(Category::Tick);
                state.needs_timer = Some(needs);
                needs
            }
        };
        if needs || force {
            let interval = self.config.frame_interval();
            self.set_timer(Some(interval));
        }
        Ok(())
    }

    pub fn stop_timer(&mut self) {
        self.set_timer(None);
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    fn set_timer(&mut self, interval: Option<Duration>) {
        self.timer = interval;
        self.backend.set_timer(interval);
    }

    pub fn reset_timer(&mut self, dialog: WidgetId) -> Result<(), UiError> {
        self.stop_timer();
        self.start_timer(dialog, false)
    }

    // ── Loop ──────────────────────────────────────────────────────────────

    /// Shows `dialog` and runs its loop until a handler exits it.
    ///
    /// A parentless dialog is the top-level dialog for the duration of the
    /// loop. The dialog is hidden again on return.
    pub fn show(&mut self, dialog: WidgetId) -> Result<DialogOutcome, UiError> {
        self.tree.dialog(dialog)?;
        let swapped_top = if self.tree.parent(dialog)?.is_none() && self.top != Some(dialog) {
            let previous = self.top.replace(dialog);
            self.tree.mark_full_redraw(dialog)?;
            Some(previous)
        } else {
            None
        };

        self.tree.set_visible(dialog, true)?;
        self.tree.dialog_mut(dialog)?.repeat.release();
        self.start_timer(dialog, false)?;
        log::debug!("entering loop of {dialog}");

        let result = self.run_loop(dialog);

        if self.tree.contains(dialog) {
            self.tree.set_visible(dialog, false)?;
        }
        if let Some(previous) = swapped_top {
            self.top = previous;
            if let Some(top) = previous {
                self.tree.mark_full_redraw(top)?;
            }
        }
        log::debug!("left loop of {dialog}: {result:?}");
        result
    }

    fn run_loop(&mut self, dialog: WidgetId) -> Result<DialogOutcome, UiError> {
        loop {
            self.redraw()?;
            let event = self.backend.wait()?;
            if let Some(outcome) = self.dispatch(dialog, &event, false)? {
                return Ok(outcome);
            }
        }
    }

    /// Feeds one event to `dialog`'s handlers, outside of any loop.
    ///
    /// Returns the exit outcome if a handler asked to leave the loop.
    pub fn handle(&mut self, dialog: WidgetId, event: &InputEvent) -> Result<Option<DialogOutcome>, UiError> {
        self.tree.dialog(dialog)?;
        self.dispatch(dialog, event, false)
    }

    fn dispatch(
        &mut self,
        dialog: WidgetId,
        event: &InputEvent,
        repeated: bool,
    ) -> Result<Option<DialogOutcome>, UiError> {
        let mut delivered = event.clone();
        let handlers: Vec<Dispatch> = match event {
            InputEvent::PointerMoved { .. } => {
                if let Some(delay) = self.config.motion_coalesce {
                    std::thread::sleep(delay);
                }
                self.backend.discard(EventKind::PointerMoved);
                let pointer = self.backend.pointer();
                delivered = InputEvent::PointerMoved { pos: pointer.pos, buttons: pointer.buttons };

                let mut categories = vec![Category::PointerMotion];
                if pointer.buttons.contains(Buttons::PRIMARY) {
                    categories.push(Category::Drag);
                }
                self.tree.dialog(dialog)?.handlers.gather(&categories, &[])
            }
            InputEvent::Tick => {
                self.backend.discard(EventKind::Tick);
                let handlers = self.tree.dialog(dialog)?.handlers.gather(&[Category::Tick], &[]);

                let threshold = self.config.repeat_threshold;
                let due = self.tree.dialog_mut(dialog)?.repeat.tick(threshold);
                if let Some(held) = due {
                    if let Some(outcome) = self.dispatch(dialog, &held, true)? {
                        return Ok(Some(outcome));
                    }
                }
                handlers
            }
            InputEvent::KeyDown { key, ch, .. } => {
                let mut keys = Vec::with_capacity(2);
                if let Some(ch) = ch {
                    keys.push(KeyBinding::Char(*ch));
                }
                keys.push(KeyBinding::Code(*key));
                let handlers = self
                    .tree
                    .dialog(dialog)?
                    .handlers
                    .gather(&[Category::Key, Category::KeyDown], &keys);

                if !repeated {
                    let start = self.config.repeat_start;
                    self.tree.dialog_mut(dialog)?.repeat.press(event.clone(), start);
                    self.start_timer(dialog, true)?;
                }
                handlers
            }
            InputEvent::KeyUp { key, .. } => {
                self.tree.dialog_mut(dialog)?.repeat.release();
                self.reset_timer(dialog)?;
                self.tree
                    .dialog(dialog)?
                    .handlers
                    .gather(&[Category::Key, Category::KeyUp], &[KeyBinding::Code(*key)])
            }
            InputEvent::PointerReleased { .. } => {
                self.tree.dialog(dialog)?.handlers.gather(&[Category::Click], &[])
            }
            InputEvent::Quit => {
                log::info!("quit requested, terminating");
                std::process::exit(0);
            }
            InputEvent::PointerPressed { .. } | InputEvent::Other => Vec::new(),
        };

        for Dispatch { id, handler } in handlers {
            let result = match handler.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(self, &delivered)?,
                Err(_) => {
                    log::warn!("handler {id:?} is already running, skipped");
                    continue;
                }
            };
            match result {
                HandlerResult::Continue => {}
                HandlerResult::Handled => break,
                HandlerResult::ExitWith(value) => return Ok(Some(DialogOutcome::Value(value))),
                HandlerResult::ExitEmpty => return Ok(Some(DialogOutcome::NoValue)),
            }
        }
        Ok(None)
    }

    // ── Nesting ───────────────────────────────────────────────────────────

    /// Runs `dialog` on top of the dialog that encloses `invoker`.
    ///
    /// The enclosing dialog is faded and its timer stopped for the duration
    /// of the nested loop. Afterwards it is unfaded, its timer re-evaluated,
    /// and a synthetic pointer move is queued so hover state catches up.
    /// Without an invoker the timer is left as the nested loop found it.
    pub fn call_dialog<M: Modal + ?Sized>(
        &mut self,
        dialog: &M,
        invoker: Option<WidgetId>,
    ) -> Result<DialogOutcome, UiError> {
        let parent_dialog = match invoker {
            Some(w) => self.tree.nearest_dialog(w)?,
            None => None,
        };

        let timer = self.timer;
        if let Some(p) = parent_dialog {
            self.tree.set_faded(p, true)?;
            self.stop_timer();
        }

        let result = dialog.show(self);

        if let Some(p) = parent_dialog {
            self.stop_timer();
            self.tree.set_faded(p, false)?;
            self.start_timer(p, false)?;
            self.fake_mouse();
        } else if self.timer != timer {
            self.set_timer(timer);
        }
        result
    }

    /// Queues a pointer move at the current pointer position.
    pub fn fake_mouse(&mut self) {
        let pointer = self.backend.pointer();
        self.backend.post(InputEvent::PointerMoved { pos: pointer.pos, buttons: pointer.buttons });
    }

    /// One frame at the configured rate.
    pub fn frame_interval(&self) -> Duration {
        self.config.frame_interval()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use veil_engine::backend::BackendError;
    use veil_engine::coords::Point;
    use veil_engine::input::{Key, Modifiers, MouseButton};

    use super::*;
    use crate::dialogs::NullDialog;
    use crate::handler::ExitValue;
    use crate::testing::{test_ui, ticks};
    use crate::widgets::TextField;

    fn top_dialog(ui: &mut Ui) -> WidgetId {
        let root = ui.add_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        root
    }

    fn moved(x: i32, buttons: Buttons) -> InputEvent {
        InputEvent::PointerMoved { pos: Point::new(x, 0), buttons }
    }

    #[test]
    fn handlers_run_in_priority_order_until_handled() {
        let (mut ui, _) = test_ui();
        let root = top_dialog(&mut ui);
        let log = Rc::new(RefCell::new(Vec::new()));

        for (priority, name, result) in [
            (50, "b", HandlerResult::Continue),
            (10, "a", HandlerResult::Continue),
            (60, "c", HandlerResult::Handled),
            (70, "d", HandlerResult::Continue),
        ] {
            let log = log.clone();
            ui.add_handler_at(root, Category::KeyDown, priority, move |_, _| {
                log.borrow_mut().push(name);
                Ok(result.clone())
            })
            .unwrap();
        }

        let outcome = ui.handle(root, &InputEvent::key_down(Key::A)).unwrap();
        assert_eq!(outcome, None);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn exit_leaves_the_loop_with_a_value_and_hides_the_dialog() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        ui.add_key_handler(root, Key::Enter, |_, _| Ok(HandlerResult::ExitWith(ExitValue::Bool(true))))
            .unwrap();
        backend.borrow_mut().script([InputEvent::Other, InputEvent::key_down(Key::Enter)]);

        let outcome = ui.show(root).unwrap();
        assert_eq!(outcome, DialogOutcome::Value(ExitValue::Bool(true)));
        assert!(!ui.tree().is_visible(root).unwrap());
        assert_eq!(backend.borrow().presents, 1);
    }

    #[test]
    fn exhausted_event_stream_is_an_error() {
        let (mut ui, _) = test_ui();
        let root = top_dialog(&mut ui);
        let err = ui.show(root).unwrap_err();
        assert_eq!(err, UiError::Backend(BackendError::Exhausted));
    }

    #[test]
    fn handler_errors_propagate_out_of_the_loop() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        ui.add_handler(root, Category::Click, |_, _| Err(UiError::NoTopLevel)).unwrap();
        backend.borrow_mut().script([InputEvent::PointerReleased { pos: Point::zero(), button: MouseButton::Left }]);

        assert_eq!(ui.show(root), Err(UiError::NoTopLevel));
        assert!(!ui.tree().is_visible(root).unwrap());
    }

    #[test]
    fn timer_arms_only_with_tick_handlers() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);

        ui.start_timer(root, false).unwrap();
        assert!(backend.borrow().timer_log.is_empty());

        let tick = ui.add_handler(root, Category::Tick, |_, _| Ok(HandlerResult::Continue)).unwrap();
        ui.start_timer(root, false).unwrap();
        assert_eq!(backend.borrow().timer_log, vec![Some(ui.frame_interval())]);

        ui.stop_timer();
        assert!(!backend.borrow().timer_armed());

        ui.remove_handler(root, Category::Tick, tick).unwrap();
        ui.start_timer(root, false).unwrap();
        assert!(!backend.borrow().timer_armed());

        ui.start_timer(root, true).unwrap();
        assert!(backend.borrow().timer_armed());
    }

    #[test]
    fn held_key_repeats_on_ticks() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let count = Rc::new(Cell::new(0));
        {
            let count = count.clone();
            ui.add_key_handler(root, 'a', move |_, _| {
                count.set(count.get() + 1);
                Ok(HandlerResult::Handled)
            })
            .unwrap();
        }
        {
            let mut b = backend.borrow_mut();
            b.script([InputEvent::char_down(Key::A, 'a')]);
            b.script(ticks(15));
        }

        assert!(ui.show(root).is_err());
        assert_eq!(count.get(), 2);
        assert!(backend.borrow().timer_armed());
    }

    #[test]
    fn key_up_stops_repeating() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let count = Rc::new(Cell::new(0));
        {
            let count = count.clone();
            ui.add_key_handler(root, Key::ArrowDown, move |_, ev| {
                if matches!(ev, InputEvent::KeyDown { .. }) {
                    count.set(count.get() + 1);
                }
                Ok(HandlerResult::Handled)
            })
            .unwrap();
        }
        {
            let mut b = backend.borrow_mut();
            b.script([InputEvent::key_down(Key::ArrowDown), InputEvent::key_up(Key::ArrowDown)]);
            b.script(ticks(30));
        }

        assert!(ui.show(root).is_err());
        assert_eq!(count.get(), 1);
        assert!(!backend.borrow().timer_armed());
    }

    #[test]
    fn pointer_motion_is_coalesced() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let drags = Rc::new(Cell::new(0));
        {
            let seen = seen.clone();
            ui.add_handler(root, Category::PointerMotion, move |_, ev| {
                seen.borrow_mut().push(ev.pos());
                Ok(HandlerResult::Continue)
            })
            .unwrap();
        }
        {
            let drags = drags.clone();
            ui.add_handler(root, Category::Drag, move |_, _| {
                drags.set(drags.get() + 1);
                Ok(HandlerResult::Continue)
            })
            .unwrap();
        }
        backend.borrow_mut().script([
            moved(1, Buttons::empty()),
            moved(2, Buttons::empty()),
            moved(3, Buttons::empty()),
            InputEvent::Other,
            moved(7, Buttons::PRIMARY),
        ]);

        assert!(ui.show(root).is_err());
        assert_eq!(*seen.borrow(), vec![Some(Point::new(3, 0)), Some(Point::new(7, 0))]);
        assert_eq!(drags.get(), 1);
    }

    #[test]
    fn focus_key_cycles_the_chain() {
        let (mut ui, backend) = test_ui();
        let root = ui.add_focus_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        let first = TextField::new(&mut ui, root, Layout::new((0.0, 0.0), (0.5, 0.2))).unwrap();
        let second = TextField::new(&mut ui, root, Layout::new((0.0, 0.5), (0.5, 0.2))).unwrap();
        assert_eq!(ui.tree().focused(root).unwrap(), Some(second.id()));

        let tab = InputEvent::KeyDown { key: Key::Tab, ch: Some('\t'), modifiers: Modifiers::NONE };
        let back_tab = InputEvent::KeyDown { key: Key::Tab, ch: Some('\t'), modifiers: Modifiers::SHIFT };
        backend.borrow_mut().script([
            tab,
            InputEvent::char_down(Key::X, 'x'),
            back_tab,
            InputEvent::char_down(Key::Y, 'y'),
        ]);

        assert!(ui.show(root).is_err());
        assert_eq!(first.text(), "x");
        assert_eq!(second.text(), "y");
        assert!(ui.tree().has_focus(second.id()));
        assert!(!ui.tree().has_focus(first.id()));
    }

    #[test]
    fn call_dialog_fades_the_invoker_for_the_nested_loop() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let inner = ui.add_dialog(Some(root), Layout::new((0.25, 0.25), (0.5, 0.5))).unwrap();

        let faded_inside = Rc::new(Cell::new(false));
        {
            let faded_inside = faded_inside.clone();
            ui.add_key_handler(inner, Key::Escape, move |ui, _| {
                faded_inside.set(ui.tree().is_faded(root)?);
                Ok(HandlerResult::ExitEmpty)
            })
            .unwrap();
        }
        let faded_after = Rc::new(Cell::new(true));
        {
            let faded_after = faded_after.clone();
            ui.add_key_handler(root, 'n', move |ui, _| {
                let outcome = ui.call_dialog(&inner, Some(root))?;
                faded_after.set(ui.tree().is_faded(root)?);
                Ok(HandlerResult::ExitWith(ExitValue::Bool(outcome == DialogOutcome::NoValue)))
            })
            .unwrap();
        }
        backend.borrow_mut().script([InputEvent::char_down(Key::N, 'n'), InputEvent::key_down(Key::Escape)]);

        let outcome = ui.show(root).unwrap();
        assert_eq!(outcome, DialogOutcome::Value(ExitValue::Bool(true)));
        assert!(faded_inside.get());
        assert!(!faded_after.get());
        assert!(!ui.tree().is_visible(inner).unwrap());
        assert_eq!(backend.borrow().pending(), 1);
        assert_eq!(ui.top(), Some(root));
    }

    #[test]
    fn parentless_dialog_is_top_level_while_it_runs() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let popup = ui.add_dialog(None, Layout::new((0.0, 0.0), (0.5, 0.5))).unwrap();
        let top_inside = Rc::new(Cell::new(None));
        {
            let top_inside = top_inside.clone();
            ui.add_key_handler(popup, Key::Escape, move |ui, _| {
                top_inside.set(ui.top());
                Ok(HandlerResult::ExitEmpty)
            })
            .unwrap();
        }
        backend.borrow_mut().script([InputEvent::key_down(Key::Escape)]);

        assert_eq!(ui.show(popup), Ok(DialogOutcome::NoValue));
        assert_eq!(top_inside.get(), Some(popup));
        assert_eq!(ui.top(), Some(root));
    }

    #[test]
    fn call_dialog_without_invoker_keeps_the_running_timer() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        ui.add_handler(root, Category::Tick, |_, _| Ok(HandlerResult::Continue)).unwrap();
        let popup = ui.add_dialog(None, Layout::new((0.0, 0.0), (0.5, 0.5))).unwrap();
        ui.add_key_handler(popup, Key::Escape, |_, _| Ok(HandlerResult::ExitEmpty)).unwrap();

        let armed_after = Rc::new(Cell::new(false));
        {
            let armed_after = armed_after.clone();
            ui.add_key_handler(root, 'n', move |ui, _| {
                ui.call_dialog(&popup, None)?;
                armed_after.set(ui.timer_armed());
                Ok(HandlerResult::ExitEmpty)
            })
            .unwrap();
        }
        backend.borrow_mut().script([InputEvent::char_down(Key::N, 'n'), InputEvent::key_down(Key::Escape)]);

        assert_eq!(ui.show(root), Ok(DialogOutcome::NoValue));
        assert!(armed_after.get());
        assert!(backend.borrow().timer_armed());
    }

    #[test]
    fn destroyed_widget_handlers_do_not_follow_a_reused_id() {
        let (mut ui, _) = test_ui();
        let root = top_dialog(&mut ui);
        let old = ui.add_widget(root, Layout::fill()).unwrap();
        let child = ui.add_widget(old, Layout::fill()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (widget, name) in [(old, "old"), (child, "child")] {
            let log = log.clone();
            ui.add_handler(widget, Category::Click, move |_, _| {
                log.borrow_mut().push(name);
                Ok(HandlerResult::Continue)
            })
            .unwrap();
        }

        ui.destroy(old).unwrap();
        let new = ui.add_widget(root, Layout::fill()).unwrap();
        assert_eq!(new, old);
        {
            let log = log.clone();
            ui.add_handler(new, Category::Click, move |_, _| {
                log.borrow_mut().push("new");
                Ok(HandlerResult::Continue)
            })
            .unwrap();
        }

        let click = InputEvent::PointerReleased { pos: Point::new(1, 1), button: MouseButton::Left };
        assert_eq!(ui.handle(root, &click), Ok(None));
        assert_eq!(*log.borrow(), vec!["new"]);
    }

    #[test]
    fn destroying_a_tick_handler_owner_stops_the_timer_need() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let beat = ui.add_widget(root, Layout::fill()).unwrap();
        ui.add_handler(beat, Category::Tick, |_, _| Ok(HandlerResult::Continue)).unwrap();
        ui.start_timer(root, false).unwrap();
        assert!(backend.borrow().timer_armed());

        ui.destroy(beat).unwrap();
        ui.reset_timer(root).unwrap();
        assert!(!backend.borrow().timer_armed());
    }

    #[test]
    fn null_dialog_returns_without_reading_events() {
        let (mut ui, backend) = test_ui();
        let root = top_dialog(&mut ui);
        let null = NullDialog::new(&mut ui, Some(root)).unwrap();
        backend.borrow_mut().script([InputEvent::Other]);

        assert_eq!(ui.call_dialog(&null, Some(root)), Ok(DialogOutcome::NoValue));
        assert!(!ui.tree().is_faded(root).unwrap());
        assert_eq!(backend.borrow().pending(), 2);
    }

    #[test]
    fn parented_dialog_cannot_be_top_level() {
        let (mut ui, _) = test_ui();
        let root = top_dialog(&mut ui);
        let inner = ui.add_dialog(Some(root), Layout::fill()).unwrap();
        assert_eq!(ui.make_top(inner), Err(UiError::ParentedTopLevel(inner)));
        assert_eq!(ui.top(), Some(root));
    }

    #[test]
    fn handlers_need_an_enclosing_dialog() {
        let (mut ui, _) = test_ui();
        let loose = ui.tree_mut().insert(None, Layout::fill()).unwrap();
        let err = ui.add_handler(loose, Category::Click, |_, _| Ok(HandlerResult::Continue)).unwrap_err();
        assert_eq!(err, UiError::NoEnclosingDialog(loose));
    }

    #[test]
    fn redraw_without_top_level_fails() {
        let (mut ui, _) = test_ui();
        assert_eq!(ui.redraw(), Err(UiError::NoTopLevel));
    }
}
