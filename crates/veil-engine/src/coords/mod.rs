//! Integer pixel geometry shared by surfaces, layout, and hit-testing.
//!
//! Canonical space:
//! - Physical pixels
//! - Origin top-left
//! - +X right, +Y down

mod point;
mod rect;

pub use point::{Point, Size};
pub use rect::Rect;
