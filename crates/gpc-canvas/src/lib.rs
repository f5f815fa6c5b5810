//! GPU-backed 2D canvas.
//!
//! A [`Canvas`] turns a small vocabulary of drawing commands (filled
//! rectangles, bitmap images, greyscale stamps, text runs, rectangular
//! clipping) into draws against one shared wgpu pipeline. The host owns the
//! device, the window and the present loop; [`device`] has helpers for hosts
//! that do not.
//!
//! The Y-axis convention ([`YAxis`]) is chosen once per canvas and applies to
//! every coordinate the canvas accepts.

pub mod canvas;
pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;

pub use canvas::{Canvas, CanvasConfig};
pub use coords::{Point, Rect, Viewport, YAxis};
pub use error::{CanvasError, Result};
pub use paint::Color;
pub use render::{Direction, ImageFormat, ImageHandle, RenderTarget};
pub use text::{FontHandle, FontVariant, Glyph, GlyphCbox, RasterizedFont};
