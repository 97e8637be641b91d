//! Layout: placing a parsed document on a fixed-width page surface.

mod metrics;
mod render;
mod surface;

pub use metrics::FontFace;
pub use render::render;
pub use surface::{ElementKind, PositionedElement, RenderedSurface, TextElement};
