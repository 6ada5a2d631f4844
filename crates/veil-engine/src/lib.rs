//! Veil engine crate.
//!
//! Platform-facing primitives used by `veil-ui`: pixel geometry, colours,
//! CPU surfaces, input events, the backend traits, and their headless and
//! winit implementations.

pub mod backend;
pub mod coords;
pub mod input;
pub mod logging;
pub mod paint;
pub mod surface;
pub mod time;
pub mod window;
