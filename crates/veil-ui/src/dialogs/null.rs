use crate::dialog::Modal;
use crate::error::UiError;
use crate::handler::DialogOutcome;
use crate::ui::Ui;
use crate::widget::WidgetId;

use super::dialog_layout;

/// A dialog that returns [`DialogOutcome::NoValue`] at once, without
/// entering a loop. Stands in where a dialog is required but nothing should
/// happen.
pub struct NullDialog {
    id: WidgetId,
}

impl NullDialog {
    pub fn new(ui: &mut Ui, parent: Option<WidgetId>) -> Result<Self, UiError> {
        Ok(Self { id: ui.add_dialog(parent, dialog_layout())? })
    }
}

impl Modal for NullDialog {
    fn dialog(&self) -> WidgetId {
        self.id
    }

    fn show(&self, _ui: &mut Ui) -> Result<DialogOutcome, UiError> {
        Ok(DialogOutcome::NoValue)
    }
}
