//! The error type shared by the tree, the dialog loop and stock widgets.

use std::fmt;

use veil_engine::backend::BackendError;

use crate::widget::WidgetId;

/// Errors produced by the widget tree and the dialog loop.
///
/// Loop control (exit, handled) never travels through this type; see
/// [`crate::handler::HandlerResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The event source or display failed (includes a drained headless script).
    Backend(BackendError),
    /// The id does not name a live widget.
    UnknownWidget(WidgetId),
    /// The widget exists but is not a dialog.
    NotADialog(WidgetId),
    /// No dialog on the parent chain of the widget.
    NoEnclosingDialog(WidgetId),
    /// The dialog has no focus chain.
    NoFocusChain(WidgetId),
    /// Only parentless dialogs can become the top-level dialog.
    ParentedTopLevel(WidgetId),
    /// A loop needed to redraw but no top-level dialog is set.
    NoTopLevel,
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::Backend(e) => write!(f, "backend error: {e}"),
            UiError::UnknownWidget(id) => write!(f, "unknown widget {id}"),
            UiError::NotADialog(id) => write!(f, "widget {id} is not a dialog"),
            UiError::NoEnclosingDialog(id) => write!(f, "widget {id} has no enclosing dialog"),
            UiError::NoFocusChain(id) => write!(f, "dialog {id} has no focus chain"),
            UiError::ParentedTopLevel(id) => {
                write!(f, "dialog {id} has a parent and cannot be the top-level dialog")
            }
            UiError::NoTopLevel => write!(f, "no top-level dialog"),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BackendError> for UiError {
    fn from(e: BackendError) -> Self {
        UiError::Backend(e)
    }
}
