use std::cell::{Cell, RefCell};
use std::rc::Rc;

use veil_engine::coords::Point;
use veil_engine::input::{InputEvent, MouseButton};
use veil_engine::paint::Color;
use veil_engine::surface::Surface;

use crate::error::UiError;
use crate::handler::{Category, DialogOutcome, HandlerId, HandlerResult, KeyBinding};
use crate::layout::{Anchor, Layout};
use crate::ui::Ui;
use crate::widget::{ContentPainter, PaintCtx, WidgetId};
use crate::widgets::{Borders, Decoration, cell_size, draw_cells};

type Action = dyn FnMut(&mut Ui) -> Result<HandlerResult, UiError>;

// ── Style ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ButtonStyle {
    pub normal: Decoration,
    pub hover: Decoration,
    pub text_color: Color,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            normal: Decoration::new(Color::rgb(0, 0, 160)).borders(Borders::all()),
            hover: Decoration::new(Color::rgb(0, 0, 255)).borders(Borders::all()),
            text_color: Color::WHITE,
        }
    }
}

struct Label {
    text: Rc<RefCell<String>>,
    color: Color,
}

impl ContentPainter for Label {
    fn paint(&self, canvas: &mut Surface, ctx: &PaintCtx) {
        let text = self.text.borrow();
        let cell = cell_size(ctx.size.h);
        let width = text.chars().count() as i32 * cell.w;
        let origin = Point::new((ctx.size.w - width) / 2, (ctx.size.h - cell.h) / 2);
        draw_cells(canvas, &text, origin, cell, self.color);
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

/// Configures a [`Button`] before it is placed in the tree.
///
/// # Example
/// ```rust,ignore
/// let ok = Button::builder("OK")
///     .layout(Layout::new((-0.5, -1.0), (-0.3, -0.1)).anchor(Anchor::BOTTOM_CENTER))
///     .hotkey('o')
///     .exit(&mut ui, dialog, DialogOutcome::NoValue)?;
/// ```
pub struct ButtonBuilder {
    label: String,
    layout: Layout,
    style: ButtonStyle,
    hotkey: Option<char>,
}

impl ButtonBuilder {
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.style.normal.background = color;
        self
    }

    pub fn hover_background(mut self, color: Color) -> Self {
        self.style.hover.background = color;
        self
    }

    /// Character that activates the button while its dialog runs.
    pub fn hotkey(mut self, ch: char) -> Self {
        self.hotkey = Some(ch);
        self
    }

    /// Places the button under `parent`; `action` runs on activation.
    ///
    /// An action returning `Continue` is reported as `Handled`.
    pub fn build<F>(self, ui: &mut Ui, parent: WidgetId, action: F) -> Result<Button, UiError>
    where
        F: FnMut(&mut Ui) -> Result<HandlerResult, UiError> + 'static,
    {
        Button::create(ui, parent, self, Rc::new(RefCell::new(action)))
    }

    /// A button that leaves the running dialog with `outcome`.
    pub fn exit(self, ui: &mut Ui, parent: WidgetId, outcome: DialogOutcome) -> Result<Button, UiError> {
        self.build(ui, parent, move |_| Ok(outcome.clone().into()))
    }

    /// A button that leaves the running dialog with a value computed on
    /// activation.
    pub fn exit_with<F>(self, ui: &mut Ui, parent: WidgetId, f: F) -> Result<Button, UiError>
    where
        F: Fn() -> DialogOutcome + 'static,
    {
        self.build(ui, parent, move |_| Ok(f().into()))
    }
}

// ── Button ────────────────────────────────────────────────────────────────

/// Decorated widget that runs an action when clicked or when its hotkey is
/// typed, and highlights while hovered.
pub struct Button {
    id: WidgetId,
    label: Rc<RefCell<String>>,
    hovered: Rc<Cell<bool>>,
    action: Rc<RefCell<Action>>,
    click: HandlerId,
    motion: HandlerId,
    hotkey: Option<(char, HandlerId)>,
}

fn run(action: &Rc<RefCell<Action>>, ui: &mut Ui) -> Result<HandlerResult, UiError> {
    let Ok(mut f) = action.try_borrow_mut() else {
        log::warn!("button action re-entered, ignored");
        return Ok(HandlerResult::Handled);
    };
    Ok(match (&mut *f)(ui)? {
        HandlerResult::Continue => HandlerResult::Handled,
        other => other,
    })
}

impl Button {
    pub fn builder(label: impl Into<String>) -> ButtonBuilder {
        ButtonBuilder {
            label: label.into(),
            layout: Layout::new((0.0, 0.0), (-0.3, -0.1)).anchor(Anchor::TOP_LEFT),
            style: ButtonStyle::default(),
            hotkey: None,
        }
    }

    fn create(
        ui: &mut Ui,
        parent: WidgetId,
        builder: ButtonBuilder,
        action: Rc<RefCell<Action>>,
    ) -> Result<Button, UiError> {
        let id = ui.add_widget(parent, builder.layout)?;
        let style = builder.style;
        let label = Rc::new(RefCell::new(builder.label));
        ui.tree_mut().set_decoration(id, Some(style.normal))?;
        ui.tree_mut()
            .set_painter(id, Some(Box::new(Label { text: label.clone(), color: style.text_color })))?;

        let click = {
            let action = action.clone();
            ui.add_handler(id, Category::Click, move |ui, ev| match ev {
                InputEvent::PointerReleased { pos, button: MouseButton::Left } if ui.tree().is_over(id, *pos) => {
                    run(&action, ui)
                }
                _ => Ok(HandlerResult::Continue),
            })?
        };

        let hovered = Rc::new(Cell::new(false));
        let motion = {
            let hovered = hovered.clone();
            ui.add_handler(id, Category::PointerMotion, move |ui, ev| {
                let over = ev.pos().is_some_and(|p| ui.tree().is_over(id, p));
                if over != hovered.get() {
                    hovered.set(over);
                    let decoration = if over { style.hover } else { style.normal };
                    ui.tree_mut().set_decoration(id, Some(decoration))?;
                }
                Ok(HandlerResult::Continue)
            })?
        };

        let mut button = Button { id, label, hovered, action, click, motion, hotkey: None };
        button.set_hotkey(ui, builder.hotkey)?;
        Ok(button)
    }

    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn set_label(&self, ui: &mut Ui, label: impl Into<String>) -> Result<(), UiError> {
        let label = label.into();
        if *self.label.borrow() != label {
            *self.label.borrow_mut() = label;
            ui.tree_mut().mark_rebuild(self.id)?;
        }
        Ok(())
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    pub fn hotkey(&self) -> Option<char> {
        self.hotkey.map(|(ch, _)| ch)
    }

    /// Rebinds (or with `None` removes) the activation hotkey.
    pub fn set_hotkey(&mut self, ui: &mut Ui, hotkey: Option<char>) -> Result<(), UiError> {
        if let Some((old, handler)) = self.hotkey.take() {
            ui.remove_key_handler(self.id, KeyBinding::Char(old), handler)?;
        }
        if let Some(ch) = hotkey {
            let action = self.action.clone();
            let handler = ui.add_key_handler(self.id, ch, move |ui, _| run(&action, ui))?;
            self.hotkey = Some((ch, handler));
        }
        Ok(())
    }

    /// Runs the action as if clicked.
    pub fn activate(&self, ui: &mut Ui) -> Result<HandlerResult, UiError> {
        run(&self.action, ui)
    }

    /// Unregisters the handlers and frees the widget.
    pub fn remove(mut self, ui: &mut Ui) -> Result<(), UiError> {
        self.set_hotkey(ui, None)?;
        ui.remove_handler(self.id, Category::Click, self.click)?;
        ui.remove_handler(self.id, Category::PointerMotion, self.motion)?;
        ui.destroy(self.id)
    }
}
