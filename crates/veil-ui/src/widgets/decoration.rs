use bitflags::bitflags;
use veil_engine::coords::Rect;
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

bitflags! {
    /// Edges that get a one-pixel border.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct Borders: u8 {
        const TOP    = 0b0001;
        const LEFT   = 0b0010;
        const RIGHT  = 0b0100;
        const BOTTOM = 0b1000;
    }
}

/// Background and border art painted into a widget's content buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub background: Color,
    pub borders: Borders,
    pub border_color: Color,
}

impl Decoration {
    pub const fn new(background: Color) -> Self {
        Self { background, borders: Borders::empty(), border_color: Color::WHITE }
    }

    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    pub fn paint(&self, canvas: &mut Surface) {
        canvas.fill(self.background);

        let size = canvas.size();
        let (w, h) = (size.w, size.h);
        let edges = [
            (Borders::TOP, Rect::new(0, 0, w, 1)),
            (Borders::LEFT, Rect::new(0, 0, 1, h)),
            (Borders::RIGHT, Rect::new(w - 1, 0, 1, h)),
            (Borders::BOTTOM, Rect::new(0, h - 1, w, 1)),
        ];
        for (edge, rect) in edges {
            if self.borders.contains(edge) {
                canvas.fill_rect(rect, self.border_color);
            }
        }
    }
}

impl Default for Decoration {
    fn default() -> Self {
        Self::new(Color::BLUE)
    }
}
