//! Single-line text layout.
//!
//! Pure pen arithmetic over a font variant's metrics; drawing is done by the
//! canvas from the placed glyphs.

use crate::coords::Point;

use super::font::FontVariant;

/// A glyph positioned on the baseline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlacedGlyph {
    pub glyph_index: u32,
    /// Pen position (glyph origin on the baseline).
    pub pen: Point,
}

/// Lays out `text` left to right starting at `origin`.
///
/// The pen starts at `origin.x - x_min(first glyph)` so the first glyph's ink
/// begins exactly at `origin.x`. With `max_width = Some(w)` and `w > 0` the run
/// stops before the first glyph whose pen offset from `origin.x` reaches `w`.
/// Glyph indices outside the variant are skipped.
pub fn layout_run(
    variant: &FontVariant,
    glyph_for: impl Fn(char) -> u32,
    origin: Point,
    text: &str,
    max_width: Option<i32>,
) -> Vec<PlacedGlyph> {
    let limit = max_width.filter(|w| *w > 0);
    let mut placed = Vec::with_capacity(text.len());
    let mut pen_x: Option<i32> = None;

    for ch in text.chars() {
        let glyph_index = glyph_for(ch);
        let Some(glyph) = variant.glyphs.get(glyph_index as usize) else {
            log::warn!("glyph {glyph_index} for {ch:?} is missing from the font");
            continue;
        };

        let x = *pen_x.get_or_insert(origin.x - glyph.cbox.x_min);
        if limit.is_some_and(|w| x - origin.x >= w) {
            break;
        }

        placed.push(PlacedGlyph {
            glyph_index,
            pen: Point::new(x, origin.y),
        });
        pen_x = Some(x + glyph.adv_x);
    }

    placed
}

/// Horizontal advance of `text`: `Σ adv_x - x_min(first glyph)`.
pub fn text_extent(variant: &FontVariant, glyph_for: impl Fn(char) -> u32, text: &str) -> i32 {
    let mut glyphs = text
        .chars()
        .filter_map(|ch| variant.glyphs.get(glyph_for(ch) as usize));

    let Some(first) = glyphs.next() else {
        return 0;
    };
    first.adv_x - first.cbox.x_min + glyphs.map(|g| g.adv_x).sum::<i32>()
}
