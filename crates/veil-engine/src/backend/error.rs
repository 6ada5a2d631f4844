use std::fmt;

/// Failure reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// A scripted event stream has no more events to deliver.
    Exhausted,
    /// The window or its event loop could not be created or driven.
    Window(String),
    /// A frame could not be presented.
    Present(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Exhausted => write!(f, "event stream exhausted"),
            BackendError::Window(msg) => write!(f, "window error: {msg}"),
            BackendError::Present(msg) => write!(f, "present error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
