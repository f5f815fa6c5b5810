//! gpc-studio: a window that exercises every canvas drawing mode.
//!
//! Usage: `gpc-studio [path/to/font.ttf] [--y-up]`

mod runtime;
mod scene;

use anyhow::{Context, Result};

use gpc_canvas::YAxis;
use gpc_canvas::logging::{LoggingConfig, init_logging};
use gpc_canvas::text::rasterize;

use runtime::{Runtime, StudioConfig};

const FONT_SIZES: [f32; 2] = [16.0, 28.0];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut config = StudioConfig::default();
    for arg in std::env::args().skip(1) {
        if arg == "--y-up" {
            config.y_axis = YAxis::Up;
        } else {
            let bytes = std::fs::read(&arg).with_context(|| format!("failed to read font {arg}"))?;
            let font = rasterize::load_font(&bytes)?;
            config.font = Some(rasterize::rasterize_font(&font, &FONT_SIZES, rasterize::ascii())?);
            log::info!("rasterized {arg} at {FONT_SIZES:?}px");
        }
    }

    if config.font.is_none() {
        log::warn!("no font given; text samples are skipped");
    }

    Runtime::run(config)
}
