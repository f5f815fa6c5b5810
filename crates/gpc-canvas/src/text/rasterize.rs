//! Builds a [`RasterizedFont`] from a TrueType/OpenType font with fontdue.
//!
//! The canvas itself never parses font files; this adapter is a convenience
//! for hosts that have font bytes rather than pre-rasterized glyphs.

use std::collections::HashMap;

use crate::error::{CanvasError, Result};

use super::font::{FontVariant, Glyph, GlyphCbox, RasterizedFont};

/// Printable ASCII, the default character set.
pub fn ascii() -> impl Iterator<Item = char> {
    ' '..='~'
}

/// Parses font bytes with fontdue's default settings.
pub fn load_font(bytes: &[u8]) -> Result<fontdue::Font> {
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
        .map_err(|e| CanvasError::InvalidFont { reason: e.to_string() })
}

/// Rasterizes `chars` at each of `sizes` (pixels per em), one variant per size.
///
/// The fallback glyph is `'?'` when present, otherwise the first character.
pub fn rasterize_font(
    font: &fontdue::Font,
    sizes: &[f32],
    chars: impl IntoIterator<Item = char>,
) -> Result<RasterizedFont> {
    let mut order: Vec<char> = Vec::new();
    let mut codepoints = HashMap::new();
    for ch in chars {
        if !codepoints.contains_key(&ch) {
            codepoints.insert(ch, order.len() as u32);
            order.push(ch);
        }
    }

    if order.is_empty() || sizes.is_empty() {
        return Err(CanvasError::InvalidFont {
            reason: "nothing to rasterize".into(),
        });
    }

    let variants = sizes
        .iter()
        .map(|&px| {
            let mut variant = FontVariant::default();
            for &ch in &order {
                let (metrics, bitmap) = font.rasterize(ch, px);
                let cbox = GlyphCbox {
                    x_min: metrics.xmin,
                    x_max: metrics.xmin + metrics.width as i32,
                    y_min: metrics.ymin,
                    y_max: metrics.ymin + metrics.height as i32,
                };
                variant.glyphs.push(Glyph {
                    cbox,
                    adv_x: metrics.advance_width.round() as i32,
                    pixel_base: variant.pixels.len() as u32,
                });
                variant.pixels.extend_from_slice(&bitmap);
            }
            log::debug!(
                "rasterized {} glyph(s) at {px}px ({} bytes)",
                order.len(),
                variant.pixels.len()
            );
            variant
        })
        .collect();

    let fallback_glyph = codepoints.get(&'?').copied().unwrap_or(0);

    Ok(RasterizedFont {
        variants,
        codepoints,
        fallback_glyph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_covers_printable_range() {
        let chars: Vec<char> = ascii().collect();
        assert_eq!(chars.len(), 95);
        assert_eq!(chars.first(), Some(&' '));
        assert_eq!(chars.last(), Some(&'~'));
    }

    #[test]
    fn garbage_bytes_are_an_invalid_font() {
        assert!(matches!(
            load_font(b"definitely not a font"),
            Err(CanvasError::InvalidFont { .. })
        ));
    }
}
