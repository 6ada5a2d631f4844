//! Stock dialogs.
//!
//! Each one is a handle around a dialog node and the widgets it owns, and
//! implements [`Modal`](crate::Modal) so it can be run with
//! [`Ui::call_dialog`](crate::Ui::call_dialog).

pub mod choice;
pub mod message;
pub mod null;
pub mod text_entry;
pub mod yes_no;

pub use choice::{ChoiceDefault, ChoiceDialog};
pub use message::MessageDialog;
pub use null::NullDialog;
pub use text_entry::TextEntryDialog;
pub use yes_no::YesNoDialog;

use std::cell::RefCell;
use std::rc::Rc;

use veil_engine::coords::{Point, Size};
use veil_engine::input::InputEvent;
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

use crate::error::UiError;
use crate::layout::{Anchor, Layout};
use crate::ui::Ui;
use crate::widget::{ContentPainter, PaintCtx, WidgetId};
use crate::widgets::{Decoration, draw_cells};

/// Layout of a full-width dialog hanging from the top of the screen.
pub fn dialog_layout() -> Layout {
    Layout::new((0.5, 0.1), (1.0, 0.9)).anchor(Anchor::TOP_CENTER)
}

/// Layout of a half-screen text dialog.
pub fn text_dialog_layout() -> Layout {
    Layout::new((0.5, 0.1), (0.5, 0.5)).anchor(Anchor::TOP_CENTER)
}

#[inline]
pub(crate) fn is_key_down(ev: &InputEvent) -> bool {
    matches!(ev, InputEvent::KeyDown { .. })
}

const TEXT_CELL: Size = Size::new(9, 16);
const TEXT_MARGIN: i32 = 6;

/// Word-agnostic wrapped text, one cell per character.
struct WrappedText {
    text: Rc<RefCell<String>>,
    color: Color,
}

impl ContentPainter for WrappedText {
    fn paint(&self, canvas: &mut Surface, ctx: &PaintCtx) {
        let columns = ((ctx.size.w - 2 * TEXT_MARGIN) / TEXT_CELL.w).max(1) as usize;
        let text = self.text.borrow();
        let mut y = TEXT_MARGIN;
        for line in text.lines() {
            let chars: Vec<char> = line.chars().collect();
            for row in chars.chunks(columns).map(|c| c.iter().collect::<String>()) {
                draw_cells(canvas, &row, Point::new(TEXT_MARGIN, y), TEXT_CELL, self.color);
                y += TEXT_CELL.h;
            }
            if chars.is_empty() {
                y += TEXT_CELL.h;
            }
        }
    }
}

/// Creates a dialog with a translucent background and a body text. Returns
/// the dialog and the shared text.
pub(crate) fn text_dialog(
    ui: &mut Ui,
    parent: Option<WidgetId>,
    layout: Layout,
    text: String,
    focus: bool,
) -> Result<(WidgetId, Rc<RefCell<String>>), UiError> {
    let id = if focus {
        ui.add_focus_dialog(parent, layout)?
    } else {
        ui.add_dialog(parent, layout)?
    };
    let text = Rc::new(RefCell::new(text));
    ui.tree_mut()
        .set_decoration(id, Some(Decoration::new(Color::rgba(0, 0, 0, 128))))?;
    ui.tree_mut()
        .set_painter(id, Some(Box::new(WrappedText { text: text.clone(), color: Color::WHITE })))?;
    Ok((id, text))
}

/// Replaces a dialog's body text.
pub(crate) fn set_text(ui: &mut Ui, id: WidgetId, shared: &RefCell<String>, text: String) -> Result<(), UiError> {
    if *shared.borrow() != text {
        *shared.borrow_mut() = text;
        ui.tree_mut().mark_rebuild(id)?;
    }
    Ok(())
}
