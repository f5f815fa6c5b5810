//! The demo scene: one panel per drawing mode.

use gpc_canvas::{Canvas, Color, Direction, FontHandle, ImageHandle, Point, RasterizedFont, Result};

const CHECKER_SIZE: u32 = 16;
const ARROW_LENGTH: u32 = 48;
const ARROW_WIDTH: u32 = 24;

const BACKGROUND: Color = Color::rgb(0.94, 0.94, 0.92);
const PANEL: Color = Color::rgb(0.82, 0.84, 0.88);
const ACCENT: Color = Color::rgb(0.15, 0.35, 0.75);

/// Images and fonts the scene draws with, registered once after init.
pub struct Assets {
    checker: ImageHandle,
    arrow: ImageHandle,
    font: Option<FontHandle>,
}

impl Assets {
    pub fn register(canvas: &mut Canvas, font: Option<RasterizedFont>) -> Result<Self> {
        let checker = canvas.register_rgba_image(CHECKER_SIZE, CHECKER_SIZE, &checker_pixels(CHECKER_SIZE))?;
        let arrow = canvas.register_mono8_image(ARROW_LENGTH, ARROW_WIDTH, &arrow_pixels(ARROW_LENGTH, ARROW_WIDTH))?;
        let font = font.map(|f| canvas.register_font(f)).transpose()?;

        log::debug!("scene assets registered (checker {checker:?}, arrow {arrow:?}, font {font:?})");
        Ok(Self { checker, arrow, font })
    }
}

#[derive(Default)]
pub struct Scene {
    assets: Option<Assets>,
    frame: u32,
}

impl Scene {
    pub fn new(assets: Assets) -> Self {
        Self {
            assets: Some(assets),
            frame: 0,
        }
    }

    /// Records one frame. Coordinates are laid out from the top-left under
    /// Y-down and from the bottom-left under Y-up; both read the same way.
    pub fn draw(&mut self, canvas: &mut Canvas, width: i32, height: i32) -> Result<()> {
        self.frame = self.frame.wrapping_add(1);

        canvas.clear(BACKGROUND);
        let Some(assets) = &self.assets else { return Ok(()) };

        // fills; the bars track the window edges
        canvas.fill_rect(16, 16, width - 32, 8, ACCENT);
        canvas.fill_rect(16, height - 24, width - 32, 8, ACCENT);
        canvas.fill_rect(16, 40, 120, 80, Color::rgba(0.9, 0.2, 0.2, 0.8));
        canvas.fill_rect(76, 70, 120, 80, Color::rgba(0.2, 0.7, 0.3, 0.6));

        // paste: 1:1, tiled, then scrolling through the offset
        canvas.fill_rect(220, 40, 240, 112, PANEL);
        canvas.draw_image(228, 48, 16, 16, assets.checker)?;
        canvas.draw_image(252, 48, 96, 96, assets.checker)?;
        let scroll = (self.frame / 2 % CHECKER_SIZE) as i32;
        canvas.draw_image_with_offset(356, 48, 96, 96, assets.checker, Point::new(scroll, scroll))?;

        // one mono image in all four directions around a shared anchor
        let anchor = Point::new(560, 100);
        canvas.fill_rect(anchor.x - 56, anchor.y - 56, 112, 112, PANEL);
        for (direction, color) in Direction::ALL.into_iter().zip(arrow_colors()) {
            canvas.draw_greyscale_image(
                direction,
                anchor.x,
                anchor.y,
                ARROW_LENGTH as i32,
                ARROW_WIDTH as i32,
                assets.arrow,
                color,
                Point::zero(),
            )?;
        }
        canvas.modulate_greyscale_image(640, 60, 96, 24, assets.arrow, ACCENT, Point::zero())?;

        // clipping: a fill wider than its box only shows inside
        canvas.set_clipping_rect(16, 170, 200, 40);
        canvas.fill_rect(0, 160, width, 60, Color::rgb(0.95, 0.6, 0.1));
        canvas.cancel_clipping();

        let Some(font) = assets.font else { return Ok(()) };

        canvas.set_text_color(Color::BLACK);
        canvas.draw_text(font, 16, 260, "The quick brown fox jumps over the lazy dog", None)?;

        let label = "gpc canvas";
        let extent = canvas.text_extent(font, label)?;
        canvas.fill_rect(16, 280, extent, 2, ACCENT);
        canvas.draw_text_variant(font, 1, 16, 320, label, None)?;

        // truncated run, then the same run clipped mid-glyph
        canvas.set_text_color(ACCENT);
        canvas.draw_text(font, 16, 360, "truncated after one hundred pixels", Some(100))?;
        canvas.set_clipping_rect(240, 340, 100, 30);
        canvas.draw_text(font, 240, 360, "clipped after one hundred pixels", None)?;
        canvas.cancel_clipping();

        Ok(())
    }
}

fn arrow_colors() -> [Color; 4] {
    [
        Color::rgb(0.8, 0.1, 0.1),
        Color::rgb(0.1, 0.6, 0.2),
        Color::rgb(0.1, 0.3, 0.8),
        Color::rgb(0.6, 0.2, 0.7),
    ]
}

/// Two-tone RGBA checkerboard with 4-texel cells and a marked first texel.
fn checker_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let texel = if x == 0 && y == 0 {
                [220, 30, 30, 255]
            } else if (x / 4 + y / 4) % 2 == 0 {
                [40, 40, 48, 255]
            } else {
                [250, 250, 250, 255]
            };
            pixels.extend_from_slice(&texel);
        }
    }
    pixels
}

/// Right-pointing arrow coverage: a shaft over the first two thirds and a
/// head narrowing to a point.
fn arrow_pixels(length: u32, width: u32) -> Vec<u8> {
    let mid = width as f32 / 2.0;
    let head_start = length * 2 / 3;
    let mut pixels = Vec::with_capacity((length * width) as usize);
    for y in 0..width {
        let dy = (y as f32 + 0.5 - mid).abs();
        for x in 0..length {
            let half = if x < head_start {
                mid / 3.0
            } else {
                mid * (length - x) as f32 / (length - head_start) as f32
            };
            pixels.push(if dy <= half { 255 } else { 0 });
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_has_rgba_texels_and_marked_origin() {
        let pixels = checker_pixels(CHECKER_SIZE);
        assert_eq!(pixels.len(), (CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
        assert_eq!(&pixels[..4], &[220, 30, 30, 255]);
        // (4, 0) sits in the second cell column
        assert_eq!(&pixels[16..20], &[250, 250, 250, 255]);
    }

    #[test]
    fn arrow_is_symmetric_and_points_right() {
        let pixels = arrow_pixels(ARROW_LENGTH, ARROW_WIDTH);
        let (l, w) = (ARROW_LENGTH as usize, ARROW_WIDTH as usize);
        assert_eq!(pixels.len(), l * w);

        for y in 0..w {
            assert_eq!(pixels[y * l..(y + 1) * l], pixels[(w - 1 - y) * l..(w - y) * l]);
        }

        let covered = |x: usize| (0..w).filter(|&y| pixels[y * l + x] > 0).count();
        assert!(covered(l * 2 / 3) > covered(0));
        assert!(covered(l - 1) < covered(l * 2 / 3));
    }
}
