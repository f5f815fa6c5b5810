//! Fonts, glyph atlases and text layout.

pub mod atlas;
mod font;
pub mod layout;
pub mod rasterize;

pub use font::{FontHandle, FontVariant, Glyph, GlyphCbox, RasterizedFont};
pub use layout::{PlacedGlyph, layout_run, text_extent};
