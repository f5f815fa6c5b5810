//! Glyph atlas construction.
//!
//! Each font variant's pixels become one read-only storage buffer; all glyph
//! quads of all variants go into one vertex buffer, variant after variant, so
//! glyph `i` of variant `v` starts at vertex `4 * (variant_base[v] + i)`.

use wgpu::util::DeviceExt;

use crate::coords::{Rect, YAxis};
use crate::error::Result;
use crate::render::geometry::{QuadVertex, VERTICES_PER_QUAD, rect_corners};

use super::font::{GlyphCbox, RasterizedFont};

/// Packs mono8 bytes into little-endian `u32` words, zero padded.
///
/// Always returns at least one word so the storage binding is never empty.
pub fn pack_pixels(pixels: &[u8]) -> Vec<u32> {
    let mut words: Vec<u32> = pixels
        .chunks(4)
        .map(|chunk| {
            let mut bytes = [0u8; 4];
            bytes[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(bytes)
        })
        .collect();

    if words.is_empty() {
        words.push(0);
    }
    words
}

/// Glyph ink box in caller space, relative to the pen.
///
/// The cbox is +Y up; with Y pointing down the box is mirrored about the
/// baseline.
#[inline]
pub fn glyph_rect(cbox: GlyphCbox, axis: YAxis) -> Rect {
    let y = match axis {
        YAxis::Up => cbox.y_min,
        YAxis::Down => -cbox.y_max,
    };
    Rect::new(cbox.x_min, y, cbox.width(), cbox.height())
}

/// Quads for every glyph of every variant, plus each variant's base glyph
/// index into the result.
pub fn build_glyph_quads(font: &RasterizedFont, axis: YAxis) -> (Vec<QuadVertex>, Vec<u32>) {
    let total: usize = font.variants.iter().map(|v| v.glyphs.len()).sum();
    let mut vertices = Vec::with_capacity(total * VERTICES_PER_QUAD as usize);
    let mut bases = Vec::with_capacity(font.variants.len());

    for variant in &font.variants {
        bases.push((vertices.len() / VERTICES_PER_QUAD as usize) as u32);
        for glyph in &variant.glyphs {
            vertices.extend_from_slice(&rect_corners(glyph_rect(glyph.cbox, axis)));
        }
    }

    (vertices, bases)
}

/// GPU side of one variant.
pub(crate) struct GpuVariant {
    /// Index of this variant's first glyph quad in the font vertex buffer.
    pub base_glyph: u32,
    pub pixel_group: wgpu::BindGroup,
    _pixels: wgpu::Buffer,
}

/// A registered font: GPU buffers plus the metrics used for layout.
pub(crate) struct ManagedFont {
    pub font: RasterizedFont,
    pub variants: Vec<GpuVariant>,
    pub vertices: wgpu::Buffer,
}

impl ManagedFont {
    /// Validates `font` and uploads its pixels and glyph quads.
    pub fn upload(
        device: &wgpu::Device,
        font_layout: &wgpu::BindGroupLayout,
        font: RasterizedFont,
        axis: YAxis,
    ) -> Result<Self> {
        font.validate()?;

        let (quads, bases) = build_glyph_quads(&font, axis);
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpc font glyph quads"),
            contents: bytemuck::cast_slice(&quads),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let variants = font
            .variants
            .iter()
            .zip(bases)
            .map(|(variant, base_glyph)| {
                let words = pack_pixels(&variant.pixels);
                let pixels = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gpc font pixels"),
                    contents: bytemuck::cast_slice(&words),
                    usage: wgpu::BufferUsages::STORAGE,
                });
                let pixel_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("gpc font pixels bind group"),
                    layout: font_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: pixels.as_entire_binding(),
                    }],
                });
                GpuVariant {
                    base_glyph,
                    pixel_group,
                    _pixels: pixels,
                }
            })
            .collect();

        log::debug!(
            "uploaded font: {} variant(s), {} glyph(s) each",
            font.variants.len(),
            font.glyph_count()
        );

        Ok(Self { font, variants, vertices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::font::tests::sample_font;

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn pack_is_little_endian_and_padded() {
        assert_eq!(pack_pixels(&[1, 2, 3, 4, 5]), vec![0x0403_0201, 0x0000_0005]);
    }

    #[test]
    fn pack_of_nothing_is_one_zero_word() {
        assert_eq!(pack_pixels(&[]), vec![0]);
    }

    #[test]
    fn packed_byte_lookup_matches_shader_addressing() {
        let bytes: Vec<u8> = (0..=20).collect();
        let words = pack_pixels(&bytes);
        for (i, &b) in bytes.iter().enumerate() {
            let word = words[i / 4];
            assert_eq!(((word >> ((i % 4) * 8)) & 0xff) as u8, b);
        }
    }

    // ── quads ─────────────────────────────────────────────────────────────

    #[test]
    fn glyph_rect_is_mirrored_about_the_baseline_for_y_down() {
        let cbox = GlyphCbox { x_min: 1, x_max: 3, y_min: -1, y_max: 4 };
        assert_eq!(glyph_rect(cbox, YAxis::Up), Rect::new(1, -1, 2, 5));
        assert_eq!(glyph_rect(cbox, YAxis::Down), Rect::new(1, -4, 2, 5));
    }

    #[test]
    fn quads_are_contiguous_per_glyph() {
        let font = sample_font();
        let (quads, bases) = build_glyph_quads(&font, YAxis::Down);
        assert_eq!(bases, vec![0]);
        assert_eq!(quads.len(), 4 * font.glyph_count());

        let second = &font.variants[0].glyphs[1];
        let expected = rect_corners(glyph_rect(second.cbox, YAxis::Down));
        assert_eq!(&quads[4..8], &expected);
    }

    #[test]
    fn later_variants_follow_with_recorded_bases() {
        let mut font = sample_font();
        font.variants.push(font.variants[0].clone());
        let (quads, bases) = build_glyph_quads(&font, YAxis::Up);
        assert_eq!(bases, vec![0, 3]);
        assert_eq!(quads.len(), 4 * 6);
        assert_eq!(&quads[12..16], &quads[0..4]);
    }
}
