//! The widget arena.
//!
//! Parent/child containment, change-detecting property setters and the
//! dirty-flag rules. The redraw pipeline lives in [`crate::redraw`], the fade
//! mask in [`crate::fade`].
//!
//! Flag rules:
//! - setting `REBUILD` also sets `REDRAW`;
//! - setting `REDRAW` sets `REDRAW` on every ancestor;
//! - setting `FULL_REDRAW` sets `REDRAW` too when it is not pending yet.

use slab::Slab;
use veil_engine::coords::{Point, Rect, Size};
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

use crate::dialog::DialogState;
use crate::error::UiError;
use crate::focus::FocusChain;
use crate::layout::{Anchor, Layout};
use crate::widget::{ContentPainter, Dirty, FocusState, MaskFlags, Node, WidgetId};
use crate::widgets::Decoration;

pub struct WidgetTree {
    nodes: Slab<Node>,
    screen: Size,
    pub(crate) fade_color: Color,
}

impl WidgetTree {
    pub fn new(screen: Size) -> Self {
        Self {
            nodes: Slab::new(),
            screen,
            fade_color: Color::rgba(0, 0, 0, 175),
        }
    }

    #[inline]
    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains(id.0)
    }

    // ── Node access ───────────────────────────────────────────────────────

    pub(crate) fn node(&self, id: WidgetId) -> Result<&Node, UiError> {
        self.nodes.get(id.0).ok_or(UiError::UnknownWidget(id))
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> Result<&mut Node, UiError> {
        self.nodes.get_mut(id.0).ok_or(UiError::UnknownWidget(id))
    }

    #[inline]
    pub(crate) fn raw(&self, id: WidgetId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub(crate) fn raw_mut(&mut self, id: WidgetId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Both nodes mutably; `None` when either is missing or they coincide.
    pub(crate) fn pair_mut(&mut self, a: WidgetId, b: WidgetId) -> Option<(&mut Node, &mut Node)> {
        self.nodes.get2_mut(a.0, b.0)
    }

    pub(crate) fn dialog(&self, id: WidgetId) -> Result<&DialogState, UiError> {
        self.node(id)?.dialog.as_deref().ok_or(UiError::NotADialog(id))
    }

    pub(crate) fn dialog_mut(&mut self, id: WidgetId) -> Result<&mut DialogState, UiError> {
        self.node_mut(id)?.dialog.as_deref_mut().ok_or(UiError::NotADialog(id))
    }

    // ── Structure ─────────────────────────────────────────────────────────

    /// Creates a widget as the last child of `parent` (or a new root).
    ///
    /// New widgets start with every dirty flag set.
    pub fn insert(&mut self, parent: Option<WidgetId>, layout: Layout) -> Result<WidgetId, UiError> {
        if let Some(p) = parent {
            self.node(p)?;
        }
        let id = WidgetId(self.nodes.insert(Node::new(parent, layout)));
        if let Some(p) = parent {
            self.raw_mut(p).children.push(id);
            self.mark_redraw_node(p);
            self.invalidate_masks(p);
        }
        self.mark_rebuild_node(id);
        self.mark_full_redraw_node(id);
        Ok(id)
    }

    /// Creates a dialog: hidden, drawn above its parent's mask and exempt
    /// from it. With `focus` it owns a focus chain.
    pub(crate) fn insert_dialog(
        &mut self,
        parent: Option<WidgetId>,
        layout: Layout,
        focus: bool,
    ) -> Result<WidgetId, UiError> {
        let id = self.insert(parent, layout)?;
        let node = self.raw_mut(id);
        let mut state = DialogState::new();
        if focus {
            state.focus = Some(FocusChain::default());
        }
        node.dialog = Some(Box::new(state));
        node.mask = MaskFlags { is_above_mask: true, self_mask: true, mask_children: false };
        self.set_visible(id, false)?;
        Ok(id)
    }

    pub fn parent(&self, id: WidgetId) -> Result<Option<WidgetId>, UiError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: WidgetId) -> Result<&[WidgetId], UiError> {
        Ok(&self.node(id)?.children)
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.nodes.get(id.0).and_then(|n| n.parent), move |p| {
            self.nodes.get(p.0).and_then(|n| n.parent)
        })
    }

    /// `id` and its descendants, pre-order.
    pub(crate) fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(node) = self.nodes.get(n.0) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn is_dialog(&self, id: WidgetId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.dialog.is_some())
    }

    /// The dialog that owns `from`'s handlers: `from` itself if it is a
    /// dialog, else the closest dialog ancestor.
    pub fn nearest_dialog(&self, from: WidgetId) -> Result<Option<WidgetId>, UiError> {
        self.node(from)?;
        Ok(std::iter::once(from)
            .chain(self.ancestors(from))
            .find(|id| self.is_dialog(*id)))
    }

    /// Closest dialog with a focus chain, starting at `from` inclusive.
    pub(crate) fn nearest_focus_dialog(&self, from: Option<WidgetId>) -> Option<WidgetId> {
        let start = from?;
        std::iter::once(start)
            .chain(self.ancestors(start))
            .find(|id| self.chain(*id).is_some())
    }

    pub fn is_attached(&self, id: WidgetId) -> Result<bool, UiError> {
        Ok(self.node(id)?.attached)
    }

    /// Unhooks `id` from its parent and from any focus chain outside its
    /// subtree. The subtree stays alive and can be re-attached.
    pub fn detach(&mut self, id: WidgetId) -> Result<(), UiError> {
        let node = self.node(id)?;
        if !node.attached {
            return Ok(());
        }
        let parent = node.parent;
        self.update_focus_membership(id, false);
        self.raw_mut(id).attached = false;
        if let Some(p) = parent {
            self.raw_mut(p).children.retain(|c| *c != id);
            self.mark_redraw_node(p);
            self.invalidate_masks(p);
        }
        log::debug!("detached {id}");
        Ok(())
    }

    /// Undoes [`detach`](Self::detach): `id` becomes its parent's last child.
    pub fn attach(&mut self, id: WidgetId) -> Result<(), UiError> {
        let node = self.node(id)?;
        if node.attached {
            return Ok(());
        }
        let parent = node.parent;
        if let Some(p) = parent {
            self.node_mut(p)?.children.push(id);
            self.mark_redraw_node(p);
            self.invalidate_masks(p);
        }
        self.raw_mut(id).attached = true;
        self.update_focus_membership(id, true);
        self.mark_full_redraw_node(id);
        log::debug!("attached {id}");
        Ok(())
    }

    /// Detaches `id` and frees it together with all of its descendants.
    ///
    /// Handlers registered on the freed widgets are dropped from the dialog
    /// enclosing `id`.
    pub fn destroy(&mut self, id: WidgetId) -> Result<(), UiError> {
        self.detach(id)?;
        let doomed = self.subtree(id);
        let outer = self.ancestors(id).find(|a| self.is_dialog(*a));
        if let Some(outer) = outer {
            let state = self.dialog_mut(outer)?;
            let (purged, ticks) = state.handlers.purge(&doomed);
            if ticks {
                state.needs_timer = None;
            }
            if purged > 0 {
                log::trace!("dropped {purged} handlers of {id} from {outer}");
            }
        }
        for n in doomed.iter().rev() {
            self.nodes.remove(n.0);
        }
        log::debug!("destroyed {id} ({} nodes)", doomed.len());
        Ok(())
    }

    // ── Layout & visibility ───────────────────────────────────────────────

    pub fn layout(&self, id: WidgetId) -> Result<Layout, UiError> {
        Ok(self.node(id)?.layout)
    }

    pub fn set_pos(&mut self, id: WidgetId, pos: (f64, f64)) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        if node.layout.pos != pos {
            node.layout.pos = pos;
            self.mark_full_redraw_node(id);
            self.invalidate_masks(id);
        }
        Ok(())
    }

    pub fn set_size(&mut self, id: WidgetId, size: (f64, f64)) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        if node.layout.size != size {
            node.layout.size = size;
            self.mark_rebuild_node(id);
            self.invalidate_masks(id);
        }
        Ok(())
    }

    pub fn set_anchor(&mut self, id: WidgetId, anchor: Anchor) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        if node.layout.anchor != anchor {
            node.layout.anchor = anchor;
            self.mark_full_redraw_node(id);
            self.invalidate_masks(id);
        }
        Ok(())
    }

    pub fn is_visible(&self, id: WidgetId) -> Result<bool, UiError> {
        Ok(self.node(id)?.visible)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        if node.visible != visible {
            node.visible = visible;
            self.mark_redraw_node(id);
            self.invalidate_masks(id);
        }
        Ok(())
    }

    pub fn mask_flags(&self, id: WidgetId) -> Result<MaskFlags, UiError> {
        Ok(self.node(id)?.mask)
    }

    pub fn set_mask_flags(&mut self, id: WidgetId, mask: MaskFlags) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        if node.mask != mask {
            node.mask = mask;
            self.mark_redraw_node(id);
            self.invalidate_masks(id);
        }
        Ok(())
    }

    pub fn decoration(&self, id: WidgetId) -> Result<Option<Decoration>, UiError> {
        Ok(self.node(id)?.decoration)
    }

    pub fn set_decoration(&mut self, id: WidgetId, decoration: Option<Decoration>) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        if node.decoration != decoration {
            node.decoration = decoration;
            self.mark_rebuild_node(id);
        }
        Ok(())
    }

    /// Replaces the custom painter. Always schedules a rebuild.
    pub fn set_painter(&mut self, id: WidgetId, painter: Option<Box<dyn ContentPainter>>) -> Result<(), UiError> {
        self.node_mut(id)?.painter = painter;
        self.mark_rebuild_node(id);
        Ok(())
    }

    /// Size computed by the last rebuild.
    pub fn real_size(&self, id: WidgetId) -> Result<Size, UiError> {
        Ok(self.node(id)?.real_size)
    }

    /// Offset inside the parent computed by the last redraw.
    pub fn real_pos(&self, id: WidgetId) -> Result<Point, UiError> {
        Ok(self.node(id)?.real_pos)
    }

    /// Absolute rectangle computed by the last redraw.
    pub fn collision_rect(&self, id: WidgetId) -> Result<Rect, UiError> {
        Ok(self.node(id)?.collision_rect)
    }

    /// Hit test against the last computed collision rect.
    pub fn is_over(&self, id: WidgetId, point: Point) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|n| n.visible && n.collision_rect.contains(point))
    }

    pub fn display_surface(&self, id: WidgetId) -> Result<&Surface, UiError> {
        Ok(&self.node(id)?.display)
    }

    pub fn content_surface(&self, id: WidgetId) -> Result<&Surface, UiError> {
        Ok(&self.node(id)?.content)
    }

    // ── Dirty flags ───────────────────────────────────────────────────────

    pub fn dirty(&self, id: WidgetId) -> Result<Dirty, UiError> {
        Ok(self.node(id)?.dirty)
    }

    pub fn mark_rebuild(&mut self, id: WidgetId) -> Result<(), UiError> {
        self.node(id)?;
        self.mark_rebuild_node(id);
        Ok(())
    }

    pub fn mark_redraw(&mut self, id: WidgetId) -> Result<(), UiError> {
        self.node(id)?;
        self.mark_redraw_node(id);
        Ok(())
    }

    pub fn mark_full_redraw(&mut self, id: WidgetId) -> Result<(), UiError> {
        self.node(id)?;
        self.mark_full_redraw_node(id);
        Ok(())
    }

    pub(crate) fn mark_rebuild_node(&mut self, id: WidgetId) {
        self.raw_mut(id).dirty.insert(Dirty::REBUILD);
        self.mark_redraw_node(id);
    }

    pub(crate) fn mark_redraw_node(&mut self, id: WidgetId) {
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            let Some(node) = self.nodes.get_mut(n.0) else {
                break;
            };
            node.dirty.insert(Dirty::REDRAW);
            cursor = node.parent;
        }
    }

    pub(crate) fn mark_full_redraw_node(&mut self, id: WidgetId) {
        let node = self.raw_mut(id);
        node.dirty.insert(Dirty::FULL_REDRAW);
        if !node.dirty.contains(Dirty::REDRAW) {
            self.mark_redraw_node(id);
        }
    }

    // ── Dialog state ──────────────────────────────────────────────────────

    pub fn is_faded(&self, id: WidgetId) -> Result<bool, UiError> {
        Ok(self.dialog(id)?.faded)
    }

    pub(crate) fn set_faded(&mut self, id: WidgetId, faded: bool) -> Result<(), UiError> {
        let state = self.dialog_mut(id)?;
        if state.faded != faded {
            state.faded = faded;
            self.mark_redraw_node(id);
        }
        Ok(())
    }

    // ── Focus ─────────────────────────────────────────────────────────────

    fn chain(&self, id: WidgetId) -> Option<&FocusChain> {
        self.nodes.get(id.0)?.dialog.as_ref()?.focus.as_ref()
    }

    fn chain_mut(&mut self, id: WidgetId) -> Option<&mut FocusChain> {
        self.nodes.get_mut(id.0)?.dialog.as_mut()?.focus.as_mut()
    }

    pub fn has_focus(&self, id: WidgetId) -> bool {
        self.nodes.get(id.0).is_some_and(Node::has_focus)
    }

    pub fn is_focusable(&self, id: WidgetId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.focus.is_some())
    }

    /// Current holder of `dialog`'s focus chain.
    pub fn focused(&self, dialog: WidgetId) -> Result<Option<WidgetId>, UiError> {
        self.dialog(dialog)?;
        Ok(self.chain(dialog).ok_or(UiError::NoFocusChain(dialog))?.current())
    }

    /// Members of `dialog`'s focus chain, in cycling order.
    pub fn focus_members(&self, dialog: WidgetId) -> Result<&[WidgetId], UiError> {
        self.dialog(dialog)?;
        Ok(self.chain(dialog).ok_or(UiError::NoFocusChain(dialog))?.members())
    }

    /// Turns `id` into a focus widget: joins the nearest focus chain above it
    /// and takes focus.
    pub(crate) fn make_focusable(&mut self, id: WidgetId) -> Result<(), UiError> {
        let node = self.node_mut(id)?;
        node.focus = Some(FocusState::default());
        let parent = node.parent;
        match self.nearest_focus_dialog(parent).and_then(|d| self.chain_mut(d)) {
            Some(chain) => chain.add(id),
            None => log::debug!("{id} is focusable but has no focus chain above it"),
        }
        self.take_focus(id)
    }

    /// Gives `id` focus, clearing the previous holder of its chain.
    pub fn take_focus(&mut self, id: WidgetId) -> Result<(), UiError> {
        let node = self.node(id)?;
        if node.focus.is_none() {
            log::warn!("take_focus on {id}, which is not focusable");
            return Ok(());
        }
        let parent = node.parent;
        self.set_has_focus(id, true);
        let previous = self
            .nearest_focus_dialog(parent)
            .and_then(|d| self.chain_mut(d))
            .and_then(|chain| chain.took_focus(id));
        if let Some(prev) = previous {
            self.set_has_focus(prev, false);
        }
        Ok(())
    }

    /// Advances `dialog`'s focus chain; returns the new holder.
    pub fn cycle_focus(&mut self, dialog: WidgetId, backwards: bool) -> Result<Option<WidgetId>, UiError> {
        self.dialog(dialog)?;
        let chain = self.chain_mut(dialog).ok_or(UiError::NoFocusChain(dialog))?;
        let previous = chain.current();
        let next = chain.cycle(backwards);
        if let Some(next) = next {
            if let Some(prev) = previous.filter(|p| *p != next) {
                self.set_has_focus(prev, false);
            }
            self.set_has_focus(next, true);
        }
        Ok(next)
    }

    fn set_has_focus(&mut self, id: WidgetId, value: bool) {
        let Some(state) = self.nodes.get_mut(id.0).and_then(|n| n.focus.as_mut()) else {
            return;
        };
        if state.has_focus != value {
            state.has_focus = value;
            self.mark_rebuild_node(id);
        }
    }

    /// Adds (or removes) every focus widget in `id`'s subtree to (from) the
    /// chain that sits above `id`.
    fn update_focus_membership(&mut self, id: WidgetId, join: bool) {
        let Some(outer) = self.nearest_focus_dialog(self.raw(id).parent) else {
            return;
        };
        let members: Vec<WidgetId> = self
            .subtree(id)
            .into_iter()
            .filter(|n| self.raw(*n).focus.is_some())
            .filter(|n| self.nearest_focus_dialog(self.raw(*n).parent) == Some(outer))
            .collect();
        let Some(chain) = self.chain_mut(outer) else {
            return;
        };
        for m in members {
            if join {
                chain.add(m);
            } else {
                chain.remove(m);
            }
        }
    }

    // ── Mask bookkeeping ──────────────────────────────────────────────────

    /// Flags every dialog from `from` upwards for a fade-mask rebuild.
    pub(crate) fn invalidate_masks(&mut self, from: WidgetId) {
        let mut cursor = Some(from);
        while let Some(n) = cursor {
            let Some(node) = self.nodes.get_mut(n.0) else {
                break;
            };
            if let Some(state) = node.dialog.as_mut() {
                state.needs_remask = true;
            }
            cursor = node.parent;
        }
    }
}
