//! Colour representation used by surfaces and decorations.

mod color;

pub use color::Color;
