//! Veil UI: retained-mode widgets and modal dialogs on top of `veil-engine`.
//!
//! Widgets live in a [`WidgetTree`] arena. Each one owns a content buffer
//! (its own art, rebuilt only when needed) and a display buffer (content
//! plus composited children). Dialogs are widgets that also own an event
//! loop; running one blocks until a handler exits it.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use veil_ui::prelude::*;
//!
//! let mut ui = Ui::new(backend);
//! let root = ui.add_dialog(None, Layout::fill())?;
//! ui.make_top(root)?;
//!
//! let quit = YesNoDialog::new(&mut ui, Some(root), "Really quit?")?;
//! Button::builder("Quit").build(&mut ui, root, move |ui| {
//!     match ui.call_dialog(&quit, Some(root))? {
//!         DialogOutcome::Value(ExitValue::Bool(true)) => Ok(HandlerResult::ExitEmpty),
//!         _ => Ok(HandlerResult::Handled),
//!     }
//! })?;
//!
//! ui.show(root)?;
//! ```
//!
//! # Custom art
//!
//! Implement [`ContentPainter`] and attach it with
//! [`WidgetTree::set_painter`]. It runs on every rebuild of the widget.

mod dialog;
mod fade;
mod focus;
mod redraw;

pub mod config;
pub mod dialogs;
pub mod error;
pub mod handler;
pub mod layout;
pub mod tree;
pub mod ui;
pub mod widget;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use config::UiConfig;
pub use dialog::Modal;
pub use error::UiError;
pub use handler::{Category, DialogOutcome, ExitValue, HandlerId, HandlerResult, KeyBinding};
pub use layout::{Align, Anchor, Layout};
pub use tree::WidgetTree;
pub use ui::Ui;
pub use widget::{ContentPainter, Dirty, MaskFlags, PaintCtx, WidgetId};

/// Everything an application needs. Import this in your dialog modules.
pub mod prelude {
    pub use crate::config::UiConfig;
    pub use crate::dialog::Modal;
    pub use crate::dialogs::{ChoiceDefault, ChoiceDialog, MessageDialog, NullDialog, TextEntryDialog, YesNoDialog};
    pub use crate::error::UiError;
    pub use crate::handler::{Category, DialogOutcome, ExitValue, HandlerId, HandlerResult, KeyBinding};
    pub use crate::layout::{Anchor, Layout};
    pub use crate::tree::WidgetTree;
    pub use crate::ui::Ui;
    pub use crate::widget::{ContentPainter, MaskFlags, PaintCtx, WidgetId};
    pub use crate::widgets::{Borders, Button, ButtonStyle, Decoration, TextField};

    pub use veil_engine::backend::{Backend, Display, EventSource};
    pub use veil_engine::coords::{Point, Rect, Size};
    pub use veil_engine::input::{InputEvent, Key, Modifiers, MouseButton};
    pub use veil_engine::paint::Color;
    pub use veil_engine::surface::Surface;
}
