use std::cell::RefCell;
use std::rc::Rc;

use veil_engine::input::Key;

use crate::dialog::Modal;
use crate::error::UiError;
use crate::handler::{DialogOutcome, ExitValue, HandlerResult};
use crate::layout::{Anchor, Layout};
use crate::ui::Ui;
use crate::widget::WidgetId;
use crate::widgets::TextField;

use super::{is_key_down, set_text, text_dialog};

/// Prompt with a single-line text field.
///
/// Enter exits with `Text(field)`, Escape exits with `Text("")`. Every show
/// starts from the default text with the caret at its end.
pub struct TextEntryDialog {
    id: WidgetId,
    text: Rc<RefCell<String>>,
    field: Rc<TextField>,
    default_text: RefCell<String>,
}

impl TextEntryDialog {
    pub fn new(ui: &mut Ui, parent: Option<WidgetId>, prompt: impl Into<String>) -> Result<Self, UiError> {
        let layout = Layout::new((0.5, 0.1), (0.2, 0.1)).anchor(Anchor::TOP_CENTER);
        let (id, text) = text_dialog(ui, parent, layout, prompt.into(), true)?;
        let field = Rc::new(TextField::new(
            ui,
            id,
            Layout::new((-0.5, -1.0), (-1.0, -0.5)).anchor(Anchor::BOTTOM_CENTER),
        )?);

        let entered = field.clone();
        ui.add_key_handler(id, Key::Enter, move |_, ev| {
            if !is_key_down(ev) {
                return Ok(HandlerResult::Continue);
            }
            Ok(HandlerResult::ExitWith(ExitValue::Text(entered.text())))
        })?;
        ui.add_key_handler(id, Key::Escape, |_, ev| {
            if !is_key_down(ev) {
                return Ok(HandlerResult::Continue);
            }
            Ok(HandlerResult::ExitWith(ExitValue::Text(String::new())))
        })?;

        Ok(Self { id, text, field, default_text: RefCell::new(String::new()) })
    }

    pub fn with_default_text(self, text: impl Into<String>) -> Self {
        *self.default_text.borrow_mut() = text.into();
        self
    }

    pub fn default_text(&self) -> String {
        self.default_text.borrow().clone()
    }

    pub fn set_default_text(&self, text: impl Into<String>) {
        *self.default_text.borrow_mut() = text.into();
    }

    pub fn field(&self) -> &TextField {
        &self.field
    }

    pub fn set_prompt(&self, ui: &mut Ui, prompt: impl Into<String>) -> Result<(), UiError> {
        set_text(ui, self.id, &self.text, prompt.into())
    }
}

impl Modal for TextEntryDialog {
    fn dialog(&self) -> WidgetId {
        self.id
    }

    fn show(&self, ui: &mut Ui) -> Result<DialogOutcome, UiError> {
        let default = self.default_text.borrow().clone();
        self.field.set_text(ui, default)?;
        ui.show(self.id)
    }
}
