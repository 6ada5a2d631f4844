use std::cell::{Cell, RefCell};
use std::rc::Rc;

use veil_engine::input::Key;

use crate::dialog::Modal;
use crate::error::UiError;
use crate::handler::{DialogOutcome, ExitValue, HandlerResult};
use crate::layout::{Anchor, Layout};
use crate::ui::Ui;
use crate::widget::WidgetId;
use crate::widgets::Button;

use super::{is_key_down, set_text, text_dialog, text_dialog_layout};

/// Question with Yes (`Bool(true)`) and No (`Bool(false)`) buttons.
///
/// Enter presses Yes and Escape presses No, unless inverted.
pub struct YesNoDialog {
    id: WidgetId,
    text: Rc<RefCell<String>>,
    yes: Rc<Button>,
    no: Rc<Button>,
    invert_enter: Rc<Cell<bool>>,
    invert_escape: Rc<Cell<bool>>,
}

impl YesNoDialog {
    pub fn new(ui: &mut Ui, parent: Option<WidgetId>, text: impl Into<String>) -> Result<Self, UiError> {
        let (id, text) = text_dialog(ui, parent, text_dialog_layout(), text.into(), false)?;

        let yes = Rc::new(
            Button::builder("Yes")
                .layout(Layout::new((-0.1, -1.0), (-0.3, -0.1)).anchor(Anchor::BOTTOM_LEFT))
                .hotkey('y')
                .exit(ui, id, DialogOutcome::Value(ExitValue::Bool(true)))?,
        );
        let no = Rc::new(
            Button::builder("No")
                .layout(Layout::new((-0.9, -1.0), (-0.3, -0.1)).anchor(Anchor::BOTTOM_RIGHT))
                .hotkey('n')
                .exit(ui, id, DialogOutcome::Value(ExitValue::Bool(false)))?,
        );

        let invert_enter = Rc::new(Cell::new(false));
        let invert_escape = Rc::new(Cell::new(false));

        // (key, invert flag, default button, inverted button)
        let bindings = [
            (Key::Enter, invert_enter.clone(), yes.clone(), no.clone()),
            (Key::Escape, invert_escape.clone(), no.clone(), yes.clone()),
        ];
        for (key, invert, normal, inverted) in bindings {
            ui.add_key_handler(id, key, move |ui, ev| {
                if !is_key_down(ev) {
                    return Ok(HandlerResult::Continue);
                }
                if invert.get() { inverted.activate(ui) } else { normal.activate(ui) }
            })?;
        }

        Ok(Self { id, text, yes, no, invert_enter, invert_escape })
    }

    /// Enter presses No instead of Yes.
    pub fn set_invert_enter(&self, invert: bool) {
        self.invert_enter.set(invert);
    }

    /// Escape presses Yes instead of No.
    pub fn set_invert_escape(&self, invert: bool) {
        self.invert_escape.set(invert);
    }

    pub fn yes_button(&self) -> &Button {
        &self.yes
    }

    pub fn no_button(&self) -> &Button {
        &self.no
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, ui: &mut Ui, text: impl Into<String>) -> Result<(), UiError> {
        set_text(ui, self.id, &self.text, text.into())
    }
}

impl Modal for YesNoDialog {
    fn dialog(&self) -> WidgetId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use veil_engine::input::InputEvent;

    use super::*;
    use crate::testing::test_ui;

    fn run(invert: Option<(bool, bool)>, events: Vec<InputEvent>) -> DialogOutcome {
        let (mut ui, backend) = test_ui();
        let root = ui.add_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        let dialog = YesNoDialog::new(&mut ui, Some(root), "Overwrite?").unwrap();
        if let Some((enter, escape)) = invert {
            dialog.set_invert_enter(enter);
            dialog.set_invert_escape(escape);
        }
        backend.borrow_mut().script(events);
        ui.call_dialog(&dialog, Some(root)).unwrap()
    }

    const YES: DialogOutcome = DialogOutcome::Value(ExitValue::Bool(true));
    const NO: DialogOutcome = DialogOutcome::Value(ExitValue::Bool(false));

    #[test]
    fn enter_means_yes_and_escape_means_no() {
        assert_eq!(run(None, vec![InputEvent::key_down(Key::Enter)]), YES);
        assert_eq!(run(None, vec![InputEvent::key_down(Key::Escape)]), NO);
    }

    #[test]
    fn inverted_keys_swap_buttons() {
        assert_eq!(run(Some((true, false)), vec![InputEvent::key_down(Key::Enter)]), NO);
        assert_eq!(run(Some((false, true)), vec![InputEvent::key_down(Key::Escape)]), YES);
    }

    #[test]
    fn hotkeys_pick_a_button() {
        assert_eq!(run(None, vec![InputEvent::char_down(Key::N, 'n')]), NO);
        assert_eq!(run(None, vec![InputEvent::key_up(Key::Enter), InputEvent::char_down(Key::Y, 'y')]), YES);
    }
}
