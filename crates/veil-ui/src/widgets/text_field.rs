use std::cell::RefCell;
use std::rc::Rc;

use veil_engine::coords::{Point, Rect};
use veil_engine::input::{InputEvent, Key};
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

use crate::error::UiError;
use crate::handler::{Category, HandlerId, HandlerResult};
use crate::layout::Layout;
use crate::ui::Ui;
use crate::widget::{ContentPainter, PaintCtx, WidgetId};
use crate::widgets::{Borders, Decoration, cell_size, draw_cells};

/// Text plus a caret measured in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Editor {
    text: String,
    cursor: usize,
}

impl Editor {
    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, index: usize) -> usize {
        self.text.char_indices().nth(index).map_or(self.text.len(), |(i, _)| i)
    }

    fn set(&mut self, text: String) {
        self.text = text;
        self.cursor = self.len();
    }

    /// Applies an editing key. Returns whether the key was consumed.
    fn apply(&mut self, key: Key, ch: Option<char>) -> bool {
        match key {
            Key::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_at(self.cursor);
                    self.text.remove(at);
                }
            }
            Key::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_at(self.cursor);
                    self.text.remove(at);
                }
            }
            Key::ArrowLeft => self.cursor = self.cursor.saturating_sub(1),
            Key::ArrowRight => self.cursor = (self.cursor + 1).min(self.len()),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = self.len(),
            _ => match ch {
                Some(c) if !c.is_control() => {
                    let at = self.byte_at(self.cursor);
                    self.text.insert(at, c);
                    self.cursor += 1;
                }
                _ => return false,
            },
        }
        true
    }
}

struct TextPainter {
    editor: Rc<RefCell<Editor>>,
    color: Color,
}

impl ContentPainter for TextPainter {
    fn paint(&self, canvas: &mut Surface, ctx: &PaintCtx) {
        let editor = self.editor.borrow();
        let cell = cell_size(ctx.size.h);
        let origin = Point::new(3, (ctx.size.h - cell.h) / 2);
        draw_cells(canvas, &editor.text, origin, cell, self.color);
        if ctx.focused {
            let x = origin.x + editor.cursor as i32 * cell.w;
            canvas.fill_rect(Rect::new(x, origin.y, 1, cell.h), self.color);
        }
    }
}

/// Focusable single-line text entry.
///
/// While focused it consumes printable characters and the editing keys
/// (Backspace, Delete, arrows, Home, End); everything else passes through to
/// lower-priority handlers.
pub struct TextField {
    id: WidgetId,
    editor: Rc<RefCell<Editor>>,
    handler: HandlerId,
}

impl TextField {
    pub fn new(ui: &mut Ui, parent: WidgetId, layout: Layout) -> Result<Self, UiError> {
        let id = ui.add_widget(parent, layout)?;
        let editor = Rc::new(RefCell::new(Editor::default()));
        ui.tree_mut()
            .set_decoration(id, Some(Decoration::new(Color::BLACK).borders(Borders::all())))?;
        ui.tree_mut()
            .set_painter(id, Some(Box::new(TextPainter { editor: editor.clone(), color: Color::WHITE })))?;
        ui.tree_mut().make_focusable(id)?;

        let handler = {
            let editor = editor.clone();
            ui.add_handler(id, Category::KeyDown, move |ui, ev| {
                let InputEvent::KeyDown { key, ch, .. } = ev else {
                    return Ok(HandlerResult::Continue);
                };
                if !ui.tree().has_focus(id) || !editor.borrow_mut().apply(*key, *ch) {
                    return Ok(HandlerResult::Continue);
                }
                ui.tree_mut().mark_rebuild(id)?;
                Ok(HandlerResult::Handled)
            })?
        };

        Ok(Self { id, editor, handler })
    }

    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn text(&self) -> String {
        self.editor.borrow().text.clone()
    }

    /// Caret position in characters.
    pub fn cursor(&self) -> usize {
        self.editor.borrow().cursor
    }

    /// Replaces the text and moves the caret to the end.
    pub fn set_text(&self, ui: &mut Ui, text: impl Into<String>) -> Result<(), UiError> {
        self.editor.borrow_mut().set(text.into());
        ui.tree_mut().mark_rebuild(self.id)
    }

    /// Unregisters the key handler and frees the widget.
    pub fn remove(self, ui: &mut Ui) -> Result<(), UiError> {
        ui.remove_handler(self.id, Category::KeyDown, self.handler)?;
        ui.destroy(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_at_caret() {
        let mut e = Editor::default();
        e.set("ac".into());
        e.apply(Key::ArrowLeft, None);
        assert!(e.apply(Key::B, Some('b')));
        assert_eq!(e.text, "abc");
        assert_eq!(e.cursor, 2);
    }

    #[test]
    fn backspace_and_delete_respect_bounds() {
        let mut e = Editor::default();
        e.set("xy".into());
        e.apply(Key::Delete, None);
        assert_eq!(e.text, "xy");
        e.apply(Key::Home, None);
        e.apply(Key::Backspace, None);
        assert_eq!(e.text, "xy");
        e.apply(Key::Delete, None);
        assert_eq!(e.text, "y");
        e.apply(Key::End, None);
        e.apply(Key::Backspace, None);
        assert_eq!(e.text, "");
    }

    #[test]
    fn multibyte_characters_edit_by_char() {
        let mut e = Editor::default();
        e.set("héllo".into());
        e.apply(Key::Home, None);
        e.apply(Key::ArrowRight, None);
        e.apply(Key::Delete, None);
        assert_eq!(e.text, "hllo");
    }

    #[test]
    fn control_keys_pass_through() {
        let mut e = Editor::default();
        assert!(!e.apply(Key::Enter, Some('\r')));
        assert!(!e.apply(Key::Escape, None));
        assert!(!e.apply(Key::Tab, Some('\t')));
    }
}
