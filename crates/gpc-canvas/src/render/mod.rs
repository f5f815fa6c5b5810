//! GPU rendering subsystem.
//!
//! One pipeline serves every draw. A draw is a quad plus a [`DrawMode`]; the
//! mode becomes a per-draw uniform block selected by dynamic offset, so the
//! pipeline is never switched inside a batch.
//!
//! Convention:
//! - geometry is integer caller pixels, relative to the viewport;
//! - the vertex stage maps it to framebuffer NDC using the viewport uniform
//!   and the canvas Y-axis convention.

mod batch;
pub mod geometry;
pub mod mode;
mod pipeline;
mod registry;
mod renderer;
pub mod sampling;
pub mod stamp;
pub mod surface;
mod target;

pub(crate) use batch::{Batch, DrawCall, Geometry};
pub use mode::{DrawMode, RenderMode, Rotation};
pub use registry::{ImageFormat, ImageHandle, validate_image};
pub(crate) use registry::Registry;
pub(crate) use renderer::Renderer;
pub use stamp::{Direction, Stamp};
pub(crate) use surface::SurfaceState;
pub use target::RenderTarget;
