//! Stock widgets built on the tree's capability records.

pub mod button;
pub mod decoration;
pub mod text_field;

pub use button::{Button, ButtonBuilder, ButtonStyle};
pub use decoration::{Borders, Decoration};
pub use text_field::TextField;

use veil_engine::coords::{Point, Rect, Size};
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

/// Glyph cell size for a line of text in a box of height `h`.
pub(crate) fn cell_size(h: i32) -> Size {
    let ch = (h - 4).clamp(3, 16);
    Size::new((ch * 3 / 5).max(2), ch)
}

/// Draws `text` as one filled cell per visible character, starting at
/// `origin`. Font rendering is left to applications; cells are enough to see
/// layout and editing state.
pub(crate) fn draw_cells(canvas: &mut Surface, text: &str, origin: Point, cell: Size, color: Color) {
    for (i, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let x = origin.x + i as i32 * cell.w;
        canvas.fill_rect(Rect::new(x + 1, origin.y + 1, cell.w - 2, cell.h - 2), color);
    }
}
