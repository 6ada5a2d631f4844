//! A list of choices next to a description of the selected one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use veil_engine::coords::{Point, Rect, Size};
use veil_engine::input::{InputEvent, Key, MouseButton};
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

use crate::dialog::Modal;
use crate::error::UiError;
use crate::handler::{Category, DialogOutcome, ExitValue, HandlerResult};
use crate::layout::{Anchor, Layout};
use crate::ui::Ui;
use crate::widget::{ContentPainter, PaintCtx, WidgetId};
use crate::widgets::{Borders, Button, Decoration, cell_size, draw_cells};

use super::{dialog_layout, is_key_down};

/// Fills the description pane for a selected key.
pub type DescribeFn = dyn FnMut(&mut Ui, WidgetId, &str) -> Result<(), UiError>;

const ROW_HEIGHT: i32 = 20;
const HIGHLIGHT: Color = Color::rgb(0, 0, 160);

/// Initial selection applied on every show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChoiceDefault {
    #[default]
    First,
    Index(usize),
    /// The first entry equal to the value, or the first entry if none is.
    Value(String),
}

struct Choices {
    list: RefCell<Vec<String>>,
    keys: RefCell<Option<Vec<String>>>,
    selected: Cell<usize>,
    describe: RefCell<Box<DescribeFn>>,
}

impl Choices {
    fn key_at(&self, index: usize) -> Option<String> {
        let list = self.list.borrow();
        if index >= list.len() {
            return None;
        }
        match &*self.keys.borrow() {
            Some(keys) => {
                assert!(keys.len() >= list.len(), "key list must be at least as long as the choice list");
                Some(keys[index].clone())
            }
            None => Some(list[index].clone()),
        }
    }
}

struct ListPainter {
    choices: Rc<Choices>,
}

impl ContentPainter for ListPainter {
    fn paint(&self, canvas: &mut Surface, ctx: &PaintCtx) {
        let cell = cell_size(ROW_HEIGHT);
        let selected = self.choices.selected.get();
        for (row, item) in self.choices.list.borrow().iter().enumerate() {
            let y = row as i32 * ROW_HEIGHT;
            if y >= ctx.size.h {
                break;
            }
            if row == selected {
                canvas.fill_rect(Rect::from_origin_size(Point::new(0, y), Size::new(ctx.size.w, ROW_HEIGHT)), HIGHLIGHT);
            }
            draw_cells(canvas, item, Point::new(4, y + (ROW_HEIGHT - cell.h) / 2), cell, Color::WHITE);
        }
    }
}

/// Scrolling-free choice list with OK (`Index(selection)`) and Back
/// (`NoValue`) buttons.
///
/// Whenever the selection changes the description pane is emptied and the
/// describe callback is asked to fill it for the selected key. Keys come from
/// the key list when one is set, otherwise from the displayed entries.
pub struct ChoiceDialog {
    id: WidgetId,
    listbox: WidgetId,
    pane: WidgetId,
    choices: Rc<Choices>,
    default: RefCell<ChoiceDefault>,
    ok: Button,
    back: Button,
}

impl ChoiceDialog {
    pub fn new<F>(ui: &mut Ui, parent: Option<WidgetId>, list: Vec<String>, describe: F) -> Result<Self, UiError>
    where
        F: FnMut(&mut Ui, WidgetId, &str) -> Result<(), UiError> + 'static,
    {
        let id = ui.add_dialog(parent, dialog_layout())?;
        let choices = Rc::new(Choices {
            list: RefCell::new(list),
            keys: RefCell::new(None),
            selected: Cell::new(0),
            describe: RefCell::new(Box::new(describe)),
        });

        let listbox = ui.add_widget(id, Layout::new((0.0, 0.0), (-0.53, -0.85)).anchor(Anchor::TOP_LEFT))?;
        ui.tree_mut()
            .set_decoration(listbox, Some(Decoration::new(Color::BLACK).borders(Borders::all())))?;
        ui.tree_mut()
            .set_painter(listbox, Some(Box::new(ListPainter { choices: choices.clone() })))?;

        let pane = ui.add_widget(id, Layout::new((-1.0, 0.0), (-0.45, -0.85)).anchor(Anchor::TOP_RIGHT))?;
        ui.tree_mut().set_decoration(pane, Some(Decoration::default()))?;

        let selection = choices.clone();
        let ok = Button::builder("OK")
            .layout(Layout::new((-0.49, -1.0), (-0.3, -0.1)).anchor(Anchor::BOTTOM_RIGHT))
            .hotkey('o')
            .exit_with(ui, id, move || DialogOutcome::Value(ExitValue::Index(selection.selected.get())))?;
        let back = Button::builder("Back")
            .layout(Layout::new((-0.51, -1.0), (-0.3, -0.1)).anchor(Anchor::BOTTOM_LEFT))
            .hotkey('b')
            .exit(ui, id, DialogOutcome::NoValue)?;

        for (key, step) in [(Key::ArrowUp, -1), (Key::ArrowDown, 1)] {
            let choices = choices.clone();
            ui.add_key_handler(id, key, move |ui, ev| {
                if !is_key_down(ev) {
                    return Ok(HandlerResult::Continue);
                }
                let len = choices.list.borrow().len();
                if len == 0 {
                    return Ok(HandlerResult::Handled);
                }
                let current = choices.selected.get() as isize;
                let next = (current + step).clamp(0, len as isize - 1) as usize;
                select(ui, &choices, listbox, pane, next)?;
                Ok(HandlerResult::Handled)
            })?;
        }

        {
            let choices = choices.clone();
            ui.add_handler(listbox, Category::Click, move |ui, ev| {
                let InputEvent::PointerReleased { pos, button: MouseButton::Left } = ev else {
                    return Ok(HandlerResult::Continue);
                };
                if !ui.tree().is_over(listbox, *pos) {
                    return Ok(HandlerResult::Continue);
                }
                let top = ui.tree().collision_rect(listbox)?.origin.y;
                let row = ((pos.y - top) / ROW_HEIGHT) as usize;
                if row < choices.list.borrow().len() {
                    select(ui, &choices, listbox, pane, row)?;
                }
                Ok(HandlerResult::Handled)
            })?;
        }

        Ok(Self {
            id,
            listbox,
            pane,
            choices,
            default: RefCell::new(ChoiceDefault::First),
            ok,
            back,
        })
    }

    /// Keys handed to the describe callback instead of the displayed
    /// entries. Must be at least as long as the list.
    pub fn with_keys(self, keys: Vec<String>) -> Self {
        assert!(
            keys.len() >= self.choices.list.borrow().len(),
            "key list must be at least as long as the choice list"
        );
        *self.choices.keys.borrow_mut() = Some(keys);
        self
    }

    pub fn with_default(self, default: ChoiceDefault) -> Self {
        *self.default.borrow_mut() = default;
        self
    }

    pub fn set_default(&self, default: ChoiceDefault) {
        *self.default.borrow_mut() = default;
    }

    /// Replaces the entries; the key list, if any, must still cover them.
    pub fn set_list(&self, ui: &mut Ui, list: Vec<String>) -> Result<(), UiError> {
        if let Some(keys) = &*self.choices.keys.borrow() {
            assert!(keys.len() >= list.len(), "key list must be at least as long as the choice list");
        }
        *self.choices.list.borrow_mut() = list;
        let selected = self.choices.selected.get();
        select(ui, &self.choices, self.listbox, self.pane, selected)
    }

    pub fn list(&self) -> Vec<String> {
        self.choices.list.borrow().clone()
    }

    pub fn selected(&self) -> usize {
        self.choices.selected.get()
    }

    /// Moves the selection and refreshes the description pane.
    pub fn select(&self, ui: &mut Ui, index: usize) -> Result<(), UiError> {
        select(ui, &self.choices, self.listbox, self.pane, index)
    }

    pub fn description_pane(&self) -> WidgetId {
        self.pane
    }

    pub fn ok_button(&self) -> &Button {
        &self.ok
    }

    pub fn back_button(&self) -> &Button {
        &self.back
    }

    fn initial_selection(&self) -> usize {
        match &*self.default.borrow() {
            ChoiceDefault::First => 0,
            ChoiceDefault::Index(i) => *i,
            ChoiceDefault::Value(v) => self.choices.list.borrow().iter().position(|item| item == v).unwrap_or(0),
        }
    }
}

fn select(ui: &mut Ui, choices: &Choices, listbox: WidgetId, pane: WidgetId, index: usize) -> Result<(), UiError> {
    choices.selected.set(index);
    ui.tree_mut().mark_rebuild(listbox)?;

    let Some(key) = choices.key_at(index) else {
        return Ok(());
    };
    let stale: Vec<WidgetId> = ui.tree().children(pane)?.to_vec();
    for child in stale {
        ui.destroy(child)?;
    }
    let Ok(mut describe) = choices.describe.try_borrow_mut() else {
        log::warn!("description callback re-entered, ignored");
        return Ok(());
    };
    (&mut *describe)(ui, pane, &key)?;
    ui.tree_mut().mark_rebuild(pane)
}

impl Modal for ChoiceDialog {
    fn dialog(&self) -> WidgetId {
        self.id
    }

    fn show(&self, ui: &mut Ui) -> Result<DialogOutcome, UiError> {
        let initial = self.initial_selection();
        select(ui, &self.choices, self.listbox, self.pane, initial)?;
        ui.show(self.id)
    }
}

#[cfg(test)]
mod tests {
    use veil_engine::backend::HeadlessBackend;

    use super::*;
    use crate::testing::test_ui;

    type Described = Rc<RefCell<Vec<String>>>;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn setup(items: &[&str]) -> (Ui, Rc<RefCell<HeadlessBackend>>, WidgetId, ChoiceDialog, Described) {
        let (mut ui, backend) = test_ui();
        let root = ui.add_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        let described = Described::default();
        let log = described.clone();
        let dialog = ChoiceDialog::new(&mut ui, Some(root), strings(items), move |ui, pane, key| {
            log.borrow_mut().push(key.to_string());
            ui.add_widget(pane, Layout::fill())?;
            Ok(())
        })
        .unwrap();
        (ui, backend, root, dialog, described)
    }

    #[test]
    fn arrows_move_selection_and_ok_returns_it() {
        let (mut ui, backend, root, dialog, described) = setup(&["a", "b", "c"]);
        let dialog = dialog.with_keys(strings(&["ka", "kb", "kc"])).with_default(ChoiceDefault::Value("b".into()));
        backend.borrow_mut().script([
            InputEvent::key_down(Key::ArrowDown),
            InputEvent::key_down(Key::ArrowDown),
            InputEvent::char_down(Key::O, 'o'),
        ]);

        let outcome = ui.call_dialog(&dialog, Some(root)).unwrap();
        assert_eq!(outcome, DialogOutcome::Value(ExitValue::Index(2)));
        assert_eq!(*described.borrow(), strings(&["kb", "kc", "kc"]));
        assert_eq!(ui.tree().children(dialog.description_pane()).unwrap().len(), 1);
    }

    #[test]
    fn up_stops_at_the_first_entry_and_back_returns_nothing() {
        let (mut ui, backend, root, dialog, described) = setup(&["a", "b"]);
        backend
            .borrow_mut()
            .script([InputEvent::key_down(Key::ArrowUp), InputEvent::char_down(Key::B, 'b')]);

        assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::NoValue));
        assert_eq!(dialog.selected(), 0);
        assert_eq!(*described.borrow(), strings(&["a", "a"]));
    }

    #[test]
    fn default_is_reapplied_on_every_show() {
        let (mut ui, backend, root, dialog, _) = setup(&["a", "b", "c"]);
        dialog.set_default(ChoiceDefault::Index(1));
        backend.borrow_mut().script([InputEvent::key_down(Key::ArrowDown), InputEvent::char_down(Key::O, 'o')]);
        assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::Value(ExitValue::Index(2))));

        backend.borrow_mut().script([InputEvent::char_down(Key::O, 'o')]);
        assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::Value(ExitValue::Index(1))));
    }

    #[test]
    fn unknown_default_value_selects_the_first_entry() {
        let (mut ui, backend, root, dialog, _) = setup(&["a", "b"]);
        dialog.set_default(ChoiceDefault::Value("zzz".into()));
        backend.borrow_mut().script([InputEvent::char_down(Key::O, 'o')]);
        assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::Value(ExitValue::Index(0))));
    }

    #[test]
    fn clicking_a_row_selects_it() {
        let (mut ui, backend, root, dialog, _) = setup(&["a", "b", "c"]);
        // The dialog sits at y = 10 on the 200x100 screen; rows are 20px.
        backend.borrow_mut().script([
            InputEvent::PointerReleased { pos: Point::new(5, 35), button: MouseButton::Left },
            InputEvent::char_down(Key::O, 'o'),
        ]);
        assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::Value(ExitValue::Index(1))));
    }

    #[test]
    fn description_buttons_answer_for_the_current_choice() {
        let (mut ui, backend) = test_ui();
        let root = ui.add_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        let dialog = ChoiceDialog::new(&mut ui, Some(root), strings(&["a", "b"]), |ui, pane, key| {
            let key = key.to_string();
            Button::builder(key.clone())
                .layout(Layout::fill())
                .exit_with(ui, pane, move || DialogOutcome::Value(ExitValue::Text(key.clone())))?;
            Ok(())
        })
        .unwrap();
        // The pane covers x 110..200, y 10..86.
        backend.borrow_mut().script([
            InputEvent::key_down(Key::ArrowDown),
            InputEvent::PointerReleased { pos: Point::new(150, 30), button: MouseButton::Left },
        ]);

        assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::Value(ExitValue::Text("b".into()))));
    }

    #[test]
    #[should_panic(expected = "key list must be at least as long")]
    fn short_key_list_is_rejected() {
        let (_ui, _, _, dialog, _) = setup(&["a", "b", "c"]);
        let _ = dialog.with_keys(strings(&["ka"]));
    }
}
