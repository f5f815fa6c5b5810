use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::error::{CanvasError, Result};

/// Opaque handle to a font registered with a [`Canvas`](crate::Canvas).
///
/// Handles are 1-based; `0` is never issued.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontHandle(pub(crate) NonZeroU32);

impl FontHandle {
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Glyph ink bounds relative to the glyph origin (baseline, +Y up).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct GlyphCbox {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl GlyphCbox {
    #[inline]
    pub const fn width(self) -> i32 {
        self.x_max - self.x_min
    }

    #[inline]
    pub const fn height(self) -> i32 {
        self.y_max - self.y_min
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// `[x_min, x_max, y_min, y_max]`, the `glyph_cbox` uniform layout.
    #[inline]
    pub const fn to_array(self) -> [i32; 4] {
        [self.x_min, self.x_max, self.y_min, self.y_max]
    }
}

/// One rasterized glyph. Its bitmap is `cbox.width() × cbox.height()` bytes,
/// top row first, starting at `pixel_base` in the variant's pixel buffer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Glyph {
    pub cbox: GlyphCbox,
    pub adv_x: i32,
    pub pixel_base: u32,
}

/// A style/size of a font: mono8 pixels plus per-glyph metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontVariant {
    pub pixels: Vec<u8>,
    pub glyphs: Vec<Glyph>,
}

/// Externally rasterized font.
///
/// Every variant holds the same glyph list (glyph `i` is the same character
/// in each), so one codepoint map serves all of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterizedFont {
    pub variants: Vec<FontVariant>,
    pub codepoints: HashMap<char, u32>,
    /// Glyph used for codepoints missing from `codepoints`.
    pub fallback_glyph: u32,
}

impl RasterizedFont {
    /// Glyph index for `ch`, or the fallback glyph.
    #[inline]
    pub fn glyph_index(&self, ch: char) -> u32 {
        self.codepoints.get(&ch).copied().unwrap_or(self.fallback_glyph)
    }

    pub fn glyph_count(&self) -> usize {
        self.variants.first().map_or(0, |v| v.glyphs.len())
    }

    /// Checks the invariants the atlas builder and text mode rely on.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(CanvasError::InvalidFont { reason });

        if self.variants.is_empty() {
            return invalid("font has no variants".into());
        }

        let count = self.glyph_count();
        if count == 0 {
            return invalid("font has no glyphs".into());
        }
        if self.fallback_glyph as usize >= count {
            return invalid(format!("fallback glyph {} out of range", self.fallback_glyph));
        }
        if let Some((ch, &i)) = self.codepoints.iter().find(|(_, i)| **i as usize >= count) {
            return invalid(format!("codepoint {ch:?} maps to missing glyph {i}"));
        }

        for (v, variant) in self.variants.iter().enumerate() {
            if variant.glyphs.len() != count {
                return invalid(format!(
                    "variant {v} has {} glyphs, expected {count}",
                    variant.glyphs.len()
                ));
            }

            for (g, glyph) in variant.glyphs.iter().enumerate() {
                let cbox = glyph.cbox;
                if cbox.width() < 0 || cbox.height() < 0 {
                    return invalid(format!("variant {v} glyph {g} has an inverted cbox"));
                }

                let end = glyph.pixel_base as u64 + cbox.width() as u64 * cbox.height() as u64;
                if end > variant.pixels.len() as u64 {
                    return invalid(format!(
                        "variant {v} glyph {g} overruns the pixel buffer ({end} > {})",
                        variant.pixels.len()
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three glyphs: 'a' (2×2), 'b' (1×3), and an empty space.
    pub(crate) fn sample_font() -> RasterizedFont {
        let glyphs = vec![
            Glyph {
                cbox: GlyphCbox { x_min: 1, x_max: 3, y_min: 0, y_max: 2 },
                adv_x: 4,
                pixel_base: 0,
            },
            Glyph {
                cbox: GlyphCbox { x_min: -1, x_max: 0, y_min: -1, y_max: 2 },
                adv_x: 3,
                pixel_base: 4,
            },
            Glyph {
                cbox: GlyphCbox::default(),
                adv_x: 2,
                pixel_base: 7,
            },
        ];
        RasterizedFont {
            variants: vec![FontVariant { pixels: vec![255; 7], glyphs }],
            codepoints: [('a', 0), ('b', 1), (' ', 2)].into_iter().collect(),
            fallback_glyph: 0,
        }
    }

    #[test]
    fn sample_font_is_valid() {
        assert!(sample_font().validate().is_ok());
    }

    #[test]
    fn unknown_codepoint_uses_fallback() {
        let mut font = sample_font();
        font.fallback_glyph = 2;
        assert_eq!(font.glyph_index('b'), 1);
        assert_eq!(font.glyph_index('z'), 2);
    }

    #[test]
    fn empty_font_is_rejected() {
        let err = RasterizedFont::default().validate();
        assert!(matches!(err, Err(CanvasError::InvalidFont { .. })));
    }

    #[test]
    fn overrunning_glyph_is_rejected() {
        let mut font = sample_font();
        font.variants[0].pixels.truncate(6);
        let Err(CanvasError::InvalidFont { reason }) = font.validate() else {
            panic!("expected InvalidFont");
        };
        assert!(reason.contains("overruns"), "{reason}");
    }

    #[test]
    fn mismatched_variants_are_rejected() {
        let mut font = sample_font();
        let mut second = font.variants[0].clone();
        second.glyphs.pop();
        font.variants.push(second);
        assert!(font.validate().is_err());
    }

    #[test]
    fn dangling_codepoint_is_rejected() {
        let mut font = sample_font();
        font.codepoints.insert('x', 9);
        assert!(font.validate().is_err());
    }
}
