//! Widget nodes.
//!
//! Widgets live in the [`crate::tree::WidgetTree`] arena and are addressed by
//! [`WidgetId`]. "Kinds" of widget are capability records on the node: a
//! decoration, a custom painter, focus state, dialog state.

use std::fmt;

use bitflags::bitflags;
use veil_engine::coords::{Point, Rect, Size};
use veil_engine::surface::Surface;

use crate::dialog::DialogState;
use crate::layout::Layout;
use crate::widgets::Decoration;

// ── WidgetId ──────────────────────────────────────────────────────────────

/// Handle to a widget in a [`crate::tree::WidgetTree`].
///
/// Ids are reused after a widget is destroyed; holding one past `destroy`
/// is a logic error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Flags ─────────────────────────────────────────────────────────────────

bitflags! {
    /// Pending pipeline work. Only the redraw pipeline clears these.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
    pub struct Dirty: u8 {
        /// Buffers and content must be recreated.
        const REBUILD     = 0b001;
        /// Display buffer must be recomposed.
        const REDRAW      = 0b010;
        /// Redraw that also forces every descendant to recompose.
        const FULL_REDRAW = 0b100;
    }
}

/// Fade-mask participation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MaskFlags {
    /// Drawn after the parent's fade overlay.
    pub is_above_mask: bool,
    /// Exempt from the enclosing dialog's fade mask.
    pub self_mask: bool,
    /// With `self_mask`, children are still masked individually.
    pub mask_children: bool,
}

// ── Painting ──────────────────────────────────────────────────────────────

/// What a painter gets to know about its widget.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PaintCtx {
    pub size: Size,
    pub focused: bool,
}

/// Custom content drawn into a widget's content buffer on rebuild, after
/// its decoration.
pub trait ContentPainter {
    fn paint(&self, canvas: &mut Surface, ctx: &PaintCtx);
}

// ── Node ──────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct FocusState {
    pub(crate) has_focus: bool,
}

pub(crate) struct Node {
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    /// False while detached from the parent's child list.
    pub(crate) attached: bool,

    pub(crate) layout: Layout,
    pub(crate) dirty: Dirty,
    pub(crate) visible: bool,
    pub(crate) mask: MaskFlags,

    pub(crate) real_size: Size,
    pub(crate) real_pos: Point,
    pub(crate) collision_rect: Rect,

    /// Widget's own art, rebuilt on demand.
    pub(crate) content: Surface,
    /// Content plus composited children, blitted onto the parent.
    pub(crate) display: Surface,

    pub(crate) decoration: Option<Decoration>,
    pub(crate) painter: Option<Box<dyn ContentPainter>>,
    pub(crate) focus: Option<FocusState>,
    pub(crate) dialog: Option<Box<DialogState>>,
}

impl Node {
    pub(crate) fn new(parent: Option<WidgetId>, layout: Layout) -> Self {
        Self {
            parent,
            children: Vec::new(),
            attached: true,
            layout,
            dirty: Dirty::empty(),
            visible: true,
            mask: MaskFlags::default(),
            real_size: Size::default(),
            real_pos: Point::zero(),
            collision_rect: Rect::default(),
            content: Surface::default(),
            display: Surface::default(),
            decoration: None,
            painter: None,
            focus: None,
            dialog: None,
        }
    }

    pub(crate) fn has_focus(&self) -> bool {
        self.focus.is_some_and(|f| f.has_focus)
    }
}
