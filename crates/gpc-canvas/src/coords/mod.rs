//! Integer pixel geometry shared by the canvas, its helpers and callers.
//!
//! Caller space:
//! - whole pixels
//! - +X right
//! - +Y up or down, fixed per canvas by [`YAxis`]
//!
//! The vertex stage converts to clip space using the viewport uniform.

mod axis;
mod point;
mod rect;
mod viewport;

pub use axis::YAxis;
pub use point::Point;
pub use rect::Rect;
pub use viewport::Viewport;
