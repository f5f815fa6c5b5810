//! Canvas error types.

use thiserror::Error;

use crate::render::{ImageFormat, ImageHandle};
use crate::text::FontHandle;

/// Errors reported by [`Canvas`](crate::Canvas) operations.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// The shared shader program failed to build. `log` holds the compiler or
    /// validator diagnostic.
    #[error("failed to build the canvas pipeline:\n{log}")]
    PipelineBuild { log: String },

    /// An operation that needs GPU objects ran before `init`.
    #[error("canvas used before init()")]
    NotInitialized,

    #[error("canvas init() called twice")]
    AlreadyInitialized,

    /// The handle was never issued by this canvas or has been released.
    #[error("no such image: {0:?}")]
    NoSuchImage(ImageHandle),

    #[error("no such font: {0:?}")]
    NoSuchFont(FontHandle),

    #[error("font {font:?} has no variant {variant}")]
    NoSuchVariant { font: FontHandle, variant: usize },

    #[error("image {handle:?} is {actual:?}, operation requires {expected:?}")]
    ImageFormatMismatch {
        handle: ImageHandle,
        expected: ImageFormat,
        actual: ImageFormat,
    },

    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("invalid font: {reason}")]
    InvalidFont { reason: String },
}

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;
