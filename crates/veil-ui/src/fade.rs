//! Fade masks for inactive dialogs.
//!
//! While a nested dialog runs, its parent dialog is faded: after its
//! below-mask children are composed, a translucent overlay covering every
//! masked descendant is blitted on top. The overlay is cached per dialog and
//! rebuilt only after something that affects it changed.

use std::rc::Rc;

use veil_engine::surface::Surface;

use crate::error::UiError;
use crate::tree::WidgetTree;
use crate::widget::{MaskFlags, WidgetId};

impl WidgetTree {
    /// The dialog's overlay, rebuilt if stale.
    ///
    /// Returns the same `Rc` until a mask-relevant change is made.
    pub fn fade_mask(&mut self, dialog: WidgetId) -> Result<Rc<Surface>, UiError> {
        let state = self.dialog(dialog)?;
        if !state.needs_remask {
            if let Some(mask) = &state.fade_mask {
                return Ok(mask.clone());
            }
        }

        let mask = Rc::new(self.build_fade_mask(dialog));
        let state = self.dialog_mut(dialog)?;
        state.fade_mask = Some(mask.clone());
        state.needs_remask = false;
        log::trace!("rebuilt fade mask for {dialog}");
        Ok(mask)
    }

    /// Walks descendants: a visible widget that does not mask itself gets its
    /// rect filled and its subtree skipped; a self-masking one is descended
    /// into only when it masks its children.
    fn build_fade_mask(&self, dialog: WidgetId) -> Surface {
        let node = self.raw(dialog);
        let origin = node.collision_rect.origin;
        let mut mask = Surface::new(node.real_size);

        let mut pending: Vec<WidgetId> = node.children.clone();
        while let Some(id) = pending.pop() {
            let child = self.raw(id);
            if !child.visible {
                continue;
            }
            if !child.mask.self_mask {
                mask.fill_rect(child.collision_rect.translate(-origin), self.fade_color);
            } else if child.mask.mask_children {
                pending.extend(child.children.iter().copied());
            }
        }
        mask
    }

    /// Lifts `id` above its ancestors' fade masks; its children stay masked
    /// unless lifted themselves.
    pub fn unmask(&mut self, id: WidgetId) -> Result<(), UiError> {
        let mask = self.mask_flags(id)?;
        self.set_mask_flags(id, MaskFlags { self_mask: true, mask_children: true, ..mask })
    }

    /// Lifts `id` and its whole subtree above its ancestors' fade masks.
    pub fn unmask_all(&mut self, id: WidgetId) -> Result<(), UiError> {
        let mask = self.mask_flags(id)?;
        self.set_mask_flags(id, MaskFlags { self_mask: true, mask_children: false, ..mask })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use veil_engine::backend::HeadlessBackend;
    use veil_engine::coords::{Point, Size};
    use veil_engine::input::{InputEvent, Key};
    use veil_engine::paint::Color;

    use super::*;
    use crate::handler::{DialogOutcome, HandlerResult};
    use crate::layout::Layout;
    use crate::testing::test_ui;
    use crate::widgets::Decoration;

    const SCREEN: Size = Size::new(100, 100);
    const FADE: Color = Color::rgba(0, 0, 0, 175);
    const ORANGE: Color = Color::rgb(200, 100, 0);
    const GREEN: Color = Color::rgb(0, 160, 0);

    struct Fixture {
        tree: WidgetTree,
        display: HeadlessBackend,
        dialog: WidgetId,
        left: WidgetId,
        right: WidgetId,
    }

    fn fixture() -> Fixture {
        let mut tree = WidgetTree::new(SCREEN);
        let dialog = tree.insert_dialog(None, Layout::fill(), false).unwrap();
        tree.set_visible(dialog, true).unwrap();
        let left = tree.insert(Some(dialog), Layout::new((0.0, 0.0), (0.5, 0.5))).unwrap();
        let right = tree.insert(Some(dialog), Layout::new((0.5, 0.5), (0.5, 0.5))).unwrap();
        let mut display = HeadlessBackend::new(SCREEN);
        tree.redraw(dialog, &mut display).unwrap();
        Fixture { tree, display, dialog, left, right }
    }

    #[test]
    fn covers_masked_children() {
        let mut f = fixture();
        let mask = f.tree.fade_mask(f.dialog).unwrap();
        assert_eq!(mask.get(Point::new(10, 10)), Some(FADE));
        assert_eq!(mask.get(Point::new(60, 60)), Some(FADE));
        assert_eq!(mask.get(Point::new(60, 10)), Some(Color::TRANSPARENT));
    }

    #[test]
    fn cached_until_something_changes() {
        let mut f = fixture();
        let first = f.tree.fade_mask(f.dialog).unwrap();
        let again = f.tree.fade_mask(f.dialog).unwrap();
        assert!(Rc::ptr_eq(&first, &again));

        f.tree.set_visible(f.right, false).unwrap();
        let changed = f.tree.fade_mask(f.dialog).unwrap();
        assert!(!Rc::ptr_eq(&first, &changed));
        assert_eq!(changed.get(Point::new(60, 60)), Some(Color::TRANSPARENT));
    }

    #[test]
    fn moving_a_descendant_invalidates_after_redraw() {
        let mut f = fixture();
        let first = f.tree.fade_mask(f.dialog).unwrap();
        f.tree.set_pos(f.left, (0.5, 0.0)).unwrap();
        f.tree.redraw(f.dialog, &mut f.display).unwrap();
        let moved = f.tree.fade_mask(f.dialog).unwrap();
        assert!(!Rc::ptr_eq(&first, &moved));
        assert_eq!(moved.get(Point::new(10, 10)), Some(Color::TRANSPARENT));
        assert_eq!(moved.get(Point::new(60, 10)), Some(FADE));
    }

    #[test]
    fn unmask_keeps_children_masked() {
        let mut f = fixture();
        let inner = f.tree.insert(Some(f.left), Layout::new((0.0, 0.0), (-0.5, -0.5))).unwrap();
        f.tree.unmask(f.left).unwrap();
        f.tree.redraw(f.dialog, &mut f.display).unwrap();
        let mask = f.tree.fade_mask(f.dialog).unwrap();
        assert_eq!(mask.get(Point::new(10, 10)), Some(FADE));
        assert_eq!(mask.get(Point::new(40, 40)), Some(Color::TRANSPARENT));
        assert!(f.tree.is_over(inner, Point::new(10, 10)));
    }

    #[test]
    fn unmask_all_exempts_subtree() {
        let mut f = fixture();
        f.tree.insert(Some(f.left), Layout::fill()).unwrap();
        f.tree.unmask_all(f.left).unwrap();
        f.tree.redraw(f.dialog, &mut f.display).unwrap();
        let mask = f.tree.fade_mask(f.dialog).unwrap();
        assert_eq!(mask.get(Point::new(10, 10)), Some(Color::TRANSPARENT));
    }

    #[test]
    fn faded_dialog_dims_masked_children() {
        let mut f = fixture();
        f.tree.set_decoration(f.left, Some(Decoration::new(ORANGE))).unwrap();
        f.tree.redraw(f.dialog, &mut f.display).unwrap();
        let frame = f.display.last_frame.as_ref().unwrap();
        assert_eq!(frame.get(Point::new(10, 10)), Some(ORANGE));

        f.tree.set_faded(f.dialog, true).unwrap();
        f.tree.redraw(f.dialog, &mut f.display).unwrap();
        let frame = f.display.last_frame.as_ref().unwrap();
        let dimmed = FADE.over(ORANGE);
        assert_ne!(dimmed, ORANGE);
        assert_eq!(frame.get(Point::new(10, 10)), Some(dimmed));
        // Outside every child the root shows through unchanged.
        assert_eq!(frame.get(Point::new(60, 10)), Some(Color::BLACK));
        assert_eq!(f.display.presents, 3);
    }

    #[test]
    fn nested_dialog_stays_bright_over_its_faded_caller() {
        let (mut ui, backend) = test_ui();
        let root = ui.add_dialog(None, Layout::fill()).unwrap();
        ui.make_top(root).unwrap();
        let panel = ui.add_widget(root, Layout::new((0.0, 0.0), (0.5, 1.0))).unwrap();
        ui.tree_mut().set_decoration(panel, Some(Decoration::new(ORANGE))).unwrap();
        let modal = ui.add_dialog(Some(root), Layout::new((0.5, 0.0), (0.5, 0.5))).unwrap();
        ui.tree_mut().set_decoration(modal, Some(Decoration::new(GREEN))).unwrap();

        let seen = Rc::new(Cell::new(None));
        {
            let (seen, backend) = (seen.clone(), backend.clone());
            ui.add_key_handler(modal, Key::Escape, move |_, _| {
                let b = backend.borrow();
                let frame = b.last_frame.as_ref().expect("a frame before the first event");
                seen.set(Some((frame.get(Point::new(10, 10)), frame.get(Point::new(150, 10)))));
                Ok(HandlerResult::ExitEmpty)
            })
            .unwrap();
        }
        backend.borrow_mut().script([InputEvent::key_down(Key::Escape)]);

        assert_eq!(ui.call_dialog(&modal, Some(root)), Ok(DialogOutcome::NoValue));
        assert_eq!(seen.get(), Some((Some(FADE.over(ORANGE)), Some(GREEN))));

        ui.redraw().unwrap();
        let b = backend.borrow();
        let frame = b.last_frame.as_ref().unwrap();
        assert_eq!(frame.get(Point::new(10, 10)), Some(ORANGE));
        assert_eq!(frame.get(Point::new(150, 10)), Some(Color::BLACK));
    }
}
