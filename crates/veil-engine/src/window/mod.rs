//! Real window backend.
//!
//! Owns the `winit` event loop and a `softbuffer` presentation surface, and
//! pumps the loop on demand so the UI's modal loops can block on
//! [`crate::backend::EventSource::wait`].

mod runtime;

pub use runtime::{WindowConfig, WinitBackend};
