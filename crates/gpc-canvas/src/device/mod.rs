//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the process-wide wgpu instance (created once, never torn down)
//! - creating Adapter/Device/Queue, windowed or headless
//! - creating & configuring a window Surface and acquiring frames
//!
//! The canvas itself only needs a `wgpu::Device`/`wgpu::Queue` pair; hosts
//! that already own one can skip this module entirely.

mod bootstrap;
mod error;
mod frame;
mod gpu;
mod surface;

pub use bootstrap::instance;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::{Gpu, GpuInit, HeadlessGpu};
