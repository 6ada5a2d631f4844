use std::cell::RefCell;
use std::rc::Rc;

use veil_engine::input::Key;

use crate::dialog::Modal;
use crate::error::UiError;
use crate::handler::{DialogOutcome, HandlerResult};
use crate::layout::{Anchor, Layout};
use crate::ui::Ui;
use crate::widget::WidgetId;
use crate::widgets::Button;

use super::{is_key_down, set_text, text_dialog, text_dialog_layout};

/// Text with a single OK button. Enter and Escape both press it.
pub struct MessageDialog {
    id: WidgetId,
    text: Rc<RefCell<String>>,
    ok: Rc<Button>,
}

impl MessageDialog {
    pub fn new(ui: &mut Ui, parent: Option<WidgetId>, text: impl Into<String>) -> Result<Self, UiError> {
        let (id, text) = text_dialog(ui, parent, text_dialog_layout(), text.into(), false)?;
        let ok = Rc::new(
            Button::builder("OK")
                .layout(Layout::new((-0.5, -1.0), (-0.3, -0.1)).anchor(Anchor::BOTTOM_CENTER))
                .hotkey('o')
                .exit(ui, id, DialogOutcome::NoValue)?,
        );
        for key in [Key::Enter, Key::Escape] {
            let ok = ok.clone();
            ui.add_key_handler(id, key, move |ui, ev| {
                if !is_key_down(ev) {
                    return Ok(HandlerResult::Continue);
                }
                ok.activate(ui)
            })?;
        }
        Ok(Self { id, text, ok })
    }

    pub fn ok_button(&self) -> &Button {
        &self.ok
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, ui: &mut Ui, text: impl Into<String>) -> Result<(), UiError> {
        set_text(ui, self.id, &self.text, text.into())
    }
}

impl Modal for MessageDialog {
    fn dialog(&self) -> WidgetId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use veil_engine::input::InputEvent;

    use super::*;
    use crate::testing::test_ui;

    #[test]
    fn enter_escape_and_hotkey_all_dismiss() {
        for event in [
            InputEvent::key_down(Key::Enter),
            InputEvent::key_down(Key::Escape),
            InputEvent::char_down(Key::O, 'o'),
        ] {
            let (mut ui, backend) = test_ui();
            let root = ui.add_dialog(None, Layout::fill()).unwrap();
            ui.make_top(root).unwrap();
            let dialog = MessageDialog::new(&mut ui, Some(root), "Saved.").unwrap();
            backend.borrow_mut().script([InputEvent::Other, event]);
            assert_eq!(ui.call_dialog(&dialog, Some(root)), Ok(DialogOutcome::NoValue));
        }
    }

    #[test]
    fn set_text_rebuilds_the_dialog() {
        let (mut ui, _) = test_ui();
        let root = ui.add_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        let dialog = MessageDialog::new(&mut ui, Some(root), "one").unwrap();
        ui.redraw().unwrap();

        dialog.set_text(&mut ui, "two").unwrap();
        assert_eq!(dialog.text(), "two");
        assert!(ui.tree().dirty(dialog.dialog()).unwrap().contains(crate::widget::Dirty::REBUILD));
    }
}
