//! The redraw pipeline.
//!
//! Per widget: rebuild if needed, then (if a redraw is pending) recompute the
//! collision rect and recompose the display buffer from the content buffer
//! and the visible children, then composite onto the parent (or present, for
//! the root).

use veil_engine::backend::Display;
use veil_engine::coords::{Point, Rect};
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

use crate::error::UiError;
use crate::layout::{resolve_position, resolve_size};
use crate::tree::WidgetTree;
use crate::widget::{Dirty, Node, PaintCtx, WidgetId};

impl WidgetTree {
    /// Runs the pipeline for `id` and everything below it.
    ///
    /// Called on the top-level widget once per loop iteration. `display` is
    /// only touched by a parentless widget: configured on rebuild, presented
    /// after a redraw.
    pub fn redraw<D: Display + ?Sized>(&mut self, id: WidgetId, display: &mut D) -> Result<(), UiError> {
        self.node(id)?;
        self.redraw_node(id, display)
    }

    fn redraw_node<D: Display + ?Sized>(&mut self, id: WidgetId, display: &mut D) -> Result<(), UiError> {
        if self.raw(id).dirty.contains(Dirty::REBUILD) {
            self.rebuild(id, display)?;
        }

        let node = self.raw(id);
        let redrawing = node.dirty.contains(Dirty::REDRAW);
        let full = node.dirty.contains(Dirty::FULL_REDRAW);
        let parent = node.parent;

        if redrawing {
            self.update_collision_rect(id);

            let Node { content, display: composed, .. } = self.raw_mut(id);
            composed.copy_from(content);

            let children = self.raw(id).children.clone();
            let mut above_mask = Vec::new();
            for child in children {
                if full {
                    self.mark_full_redraw_node(child);
                }
                let c = self.raw(child);
                if !c.visible {
                    continue;
                }
                if c.mask.is_above_mask {
                    above_mask.push(child);
                } else {
                    self.redraw_node(child, display)?;
                }
            }

            let node = self.raw(id);
            let draw_mask = node.mask.self_mask && node.dialog.as_ref().is_some_and(|d| d.faded);
            if draw_mask {
                let mask = self.fade_mask(id)?;
                self.raw_mut(id).display.blit(&mask, Point::zero());
            }

            for child in above_mask {
                self.redraw_node(child, display)?;
            }
        }

        match parent {
            Some(p) => {
                if let Some((node, parent)) = self.pair_mut(id, p) {
                    parent.display.blit(&node.display, node.real_pos);
                }
            }
            None if redrawing => display.present(&self.raw(id).display)?,
            None => {}
        }

        self.raw_mut(id).dirty.remove(Dirty::REDRAW | Dirty::FULL_REDRAW);
        Ok(())
    }

    /// Recreates both buffers at the resolved size and repaints content.
    fn rebuild<D: Display + ?Sized>(&mut self, id: WidgetId, display: &mut D) -> Result<(), UiError> {
        let screen = self.screen();
        let node = self.raw(id);
        let parent = node.parent;
        let parent_size = parent.map_or(screen, |p| self.raw(p).real_size);
        let size = resolve_size(node.layout.size, screen, parent_size);

        let background = if parent.is_none() {
            let fullscreen = display.fullscreen();
            display.configure(size, fullscreen)?;
            Color::BLACK
        } else {
            Color::TRANSPARENT
        };

        let node = self.raw_mut(id);
        node.real_size = size;
        node.content = Surface::filled(size, background);
        node.display = Surface::filled(size, background);

        let ctx = PaintCtx { size, focused: node.has_focus() };
        if let Some(decoration) = &node.decoration {
            decoration.paint(&mut node.content);
        }
        if let Some(painter) = &node.painter {
            painter.paint(&mut node.content, &ctx);
        }
        node.dirty.remove(Dirty::REBUILD);

        let children = node.children.clone();
        for child in children {
            self.mark_rebuild_node(child);
        }
        self.mark_redraw_node(id);
        log::trace!("rebuilt {id} at {}x{}", size.w, size.h);
        Ok(())
    }

    fn update_collision_rect(&mut self, id: WidgetId) {
        let screen = self.screen();
        let node = self.raw(id);
        let (origin, parent_size) = match node.parent {
            Some(p) => {
                let parent = self.raw(p);
                (parent.collision_rect.origin, parent.real_size)
            }
            None => (Point::zero(), screen),
        };
        let pos = resolve_position(node.layout.pos, node.layout.anchor, node.real_size, screen, parent_size);
        let rect = Rect::from_origin_size(origin + pos, node.real_size);

        let node = self.raw_mut(id);
        node.real_pos = pos;
        if node.collision_rect != rect {
            node.collision_rect = rect;
            self.invalidate_masks(id);
        }
    }
}
