//! Colour model shared between callers and the pipeline.

pub mod color;

pub use color::Color;
