//! CPU mirrors of the fragment stage's texel addressing.
//!
//! Each function computes, for one caller pixel, the same texel or byte index
//! as the matching helper in `canvas.wgsl`. Used to reason about (and test)
//! what a draw samples without a GPU.

use crate::coords::Point;
use crate::text::GlyphCbox;

use super::mode::Rotation;

/// Wrap addressing: `((t % d) + d) % d` per axis.
#[inline]
pub fn wrap(t: Point, width: u32, height: u32) -> (u32, u32) {
    let w = width.max(1) as i32;
    let h = height.max(1) as i32;
    (t.x.rem_euclid(w) as u32, t.y.rem_euclid(h) as u32)
}

/// Texel read by paste mode at caller pixel `pixel`.
pub fn paste_texel(pixel: Point, position: Point, offset: Point, dims: (u32, u32)) -> (u32, u32) {
    wrap(pixel - position + offset, dims.0, dims.1)
}

/// Texel read by modulate mode at caller pixel `pixel` (sampled at its centre).
pub fn modulate_texel(
    pixel: Point,
    position: Point,
    offset: Point,
    rotation: Rotation,
    dims: (u32, u32),
) -> (u32, u32) {
    let rel = [
        pixel.x as f32 + 0.5 - position.x as f32,
        pixel.y as f32 + 0.5 - position.y as f32,
    ];
    let [tx, ty] = rotation.apply(rel);
    let t = Point::new(tx.floor() as i32, ty.floor() as i32) + offset;
    wrap(t, dims.0, dims.1)
}

/// Byte index into a font variant's pixel buffer read by text mode, or `None`
/// outside the glyph's ink box.
pub fn glyph_pixel_index(
    pixel: Point,
    position: Point,
    cbox: GlyphCbox,
    glyph_base: u32,
    y_axis_down: bool,
) -> Option<u32> {
    let px = pixel - position;
    let width = cbox.width();
    let col = px.x - cbox.x_min;
    let row = if y_axis_down {
        px.y + cbox.y_max
    } else {
        (cbox.y_max - 1) - px.y
    };

    if col < 0 || col >= width || row < 0 || row >= cbox.height() {
        return None;
    }
    Some(glyph_base + (row * width + col) as u32)
}
