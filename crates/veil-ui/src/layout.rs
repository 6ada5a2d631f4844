//! Declarative geometry and its resolution to pixels.
//!
//! Each axis of `pos` and `size` is a signed fraction. A non-negative value is
//! a fraction of the screen; a negative value `-v` is `v` times the parent's
//! resolved size. Results are truncated toward zero.

use veil_engine::coords::{Point, Size};

// ── Anchor ────────────────────────────────────────────────────────────────

/// Which edge of the widget's box the position refers to, per axis.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

impl Align {
    #[inline]
    fn offset(self, extent: i32) -> i32 {
        match self {
            Align::Start => 0,
            Align::Center => extent / 2,
            Align::End => extent,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub h: Align,
    pub v: Align,
}

impl Anchor {
    pub const TOP_LEFT: Anchor = Anchor::new(Align::Start, Align::Start);
    pub const TOP_CENTER: Anchor = Anchor::new(Align::Center, Align::Start);
    pub const TOP_RIGHT: Anchor = Anchor::new(Align::End, Align::Start);
    pub const MID_LEFT: Anchor = Anchor::new(Align::Start, Align::Center);
    pub const CENTER: Anchor = Anchor::new(Align::Center, Align::Center);
    pub const MID_RIGHT: Anchor = Anchor::new(Align::End, Align::Center);
    pub const BOTTOM_LEFT: Anchor = Anchor::new(Align::Start, Align::End);
    pub const BOTTOM_CENTER: Anchor = Anchor::new(Align::Center, Align::End);
    pub const BOTTOM_RIGHT: Anchor = Anchor::new(Align::End, Align::End);

    pub const fn new(h: Align, v: Align) -> Self {
        Self { h, v }
    }
}

// ── Layout ────────────────────────────────────────────────────────────────

/// Position, size and anchor of a widget, as fractions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Layout {
    pub pos: (f64, f64),
    pub size: (f64, f64),
    pub anchor: Anchor,
}

impl Layout {
    pub fn new(pos: (f64, f64), size: (f64, f64)) -> Self {
        Self { pos, size, anchor: Anchor::TOP_LEFT }
    }

    /// Covers the whole parent.
    pub fn fill() -> Self {
        Self::new((0.0, 0.0), (-1.0, -1.0))
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::fill()
    }
}

// ── Resolution ────────────────────────────────────────────────────────────

#[inline]
fn fraction(value: f64, screen: i32, parent: i32) -> i32 {
    if value >= 0.0 {
        (value * screen as f64) as i32
    } else {
        (-value * parent as f64) as i32
    }
}

/// Pixel size for `size`, given the screen and the parent's resolved size.
pub fn resolve_size(size: (f64, f64), screen: Size, parent: Size) -> Size {
    Size::new(
        fraction(size.0, screen.w, parent.w),
        fraction(size.1, screen.h, parent.h),
    )
}

/// Offset of the widget's top-left corner inside its parent.
pub fn resolve_position(
    pos: (f64, f64),
    anchor: Anchor,
    own: Size,
    screen: Size,
    parent: Size,
) -> Point {
    Point::new(
        fraction(pos.0, screen.w, parent.w) - anchor.h.offset(own.w),
        fraction(pos.1, screen.h, parent.h) - anchor.v.offset(own.h),
    )
}
