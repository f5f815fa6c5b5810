//! Draws recorded between `enter_context` and `leave_context`.

use crate::coords::Rect;
use crate::paint::Color;

use super::geometry::QuadVertex;
use super::mode::{DrawMode, DrawUniforms};

/// Vertex source of one draw.
pub(crate) enum Geometry {
    /// Corners written into the shared quad buffer.
    Quad([QuadVertex; 4]),
    /// A glyph quad already resident in a font's vertex buffer.
    Glyph {
        vertices: wgpu::Buffer,
        base_vertex: i32,
    },
}

/// One recorded draw. GPU objects are cloned handles, so releasing the image
/// or font afterwards does not invalidate the batch.
pub(crate) struct DrawCall {
    pub mode: DrawMode,
    pub geometry: Geometry,
    /// Caller-space clip active when the draw was recorded.
    pub clip: Option<Rect>,
    pub image: Option<wgpu::BindGroup>,
    pub font: Option<wgpu::BindGroup>,
}

impl DrawCall {
    pub fn quad(mode: DrawMode, rect: Rect, clip: Option<Rect>) -> Self {
        Self {
            mode,
            geometry: Geometry::Quad(super::geometry::rect_corners(rect)),
            clip,
            image: None,
            font: None,
        }
    }

    pub fn with_image(mut self, image: &wgpu::BindGroup) -> Self {
        self.image = Some(image.clone());
        self
    }
}

#[derive(Default)]
pub(crate) struct Batch {
    clear: Option<Color>,
    draws: Vec<DrawCall>,
}

impl Batch {
    /// Clears the target before any draw. Draws recorded so far would be
    /// overwritten, so they are dropped.
    pub fn clear(&mut self, color: Color) {
        if !self.draws.is_empty() {
            log::debug!("clear() discards {} earlier draw(s)", self.draws.len());
            self.draws.clear();
        }
        self.clear = Some(color);
    }

    #[inline]
    pub fn push(&mut self, draw: DrawCall) {
        self.draws.push(draw);
    }

    #[inline]
    pub fn clear_color(&self) -> Option<Color> {
        self.clear
    }

    #[inline]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clear.is_none() && self.draws.is_empty()
    }

    /// Corners of every quad draw, in recording order.
    pub fn quad_vertices(&self) -> Vec<QuadVertex> {
        self.draws
            .iter()
            .filter_map(|d| match &d.geometry {
                Geometry::Quad(corners) => Some(corners),
                Geometry::Glyph { .. } => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    pub fn reset(&mut self) {
        self.clear = None;
        self.draws.clear();
    }
}

/// Lays out per-draw uniform blocks `stride` bytes apart.
pub(crate) fn pack_uniforms(uniforms: impl ExactSizeIterator<Item = DrawUniforms>, stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; uniforms.len() * stride];
    for (i, u) in uniforms.enumerate() {
        let block = bytemuck::bytes_of(&u);
        bytes[i * stride..i * stride + block.len()].copy_from_slice(block);
    }
    bytes
}

/// Capacity after growing to fit `required` items.
#[inline]
pub(crate) fn grown_capacity(current: usize, required: usize, minimum: usize) -> usize {
    if required <= current {
        current
    } else {
        required.next_power_of_two().max(minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mode::uniform_stride;

    fn fill(rect: Rect) -> DrawCall {
        DrawCall::quad(DrawMode::Fill { color: Color::WHITE }, rect, None)
    }

    // ── recording ─────────────────────────────────────────────────────────

    #[test]
    fn clear_discards_earlier_draws() {
        let mut batch = Batch::default();
        batch.push(fill(Rect::new(0, 0, 1, 1)));
        batch.clear(Color::BLACK);
        batch.push(fill(Rect::new(0, 0, 2, 2)));

        assert_eq!(batch.draws().len(), 1);
        assert_eq!(batch.clear_color(), Some(Color::BLACK));
    }

    #[test]
    fn quad_vertices_follow_recording_order() {
        let mut batch = Batch::default();
        batch.push(fill(Rect::new(0, 0, 1, 1)));
        batch.push(fill(Rect::new(5, 5, 1, 1)));

        let v = batch.quad_vertices();
        assert_eq!(v.len(), 8);
        assert_eq!(v[0], QuadVertex::new(0, 0));
        assert_eq!(v[4], QuadVertex::new(5, 5));
    }

    #[test]
    fn reset_empties_the_batch() {
        let mut batch = Batch::default();
        batch.clear(Color::WHITE);
        batch.push(fill(Rect::new(0, 0, 1, 1)));
        batch.reset();
        assert!(batch.is_empty());
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn uniforms_are_packed_at_stride() {
        let stride = uniform_stride(256);
        let a = DrawMode::Fill { color: Color::WHITE }.uniforms();
        let b = DrawMode::Fill { color: Color::BLACK }.uniforms();
        let bytes = pack_uniforms([a, b].into_iter(), stride);

        assert_eq!(bytes.len(), 512);
        let size = std::mem::size_of::<DrawUniforms>();
        assert_eq!(&bytes[..size], bytemuck::bytes_of(&a));
        assert_eq!(&bytes[256..256 + size], bytemuck::bytes_of(&b));
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn capacity_grows_to_powers_of_two() {
        assert_eq!(grown_capacity(64, 10, 64), 64);
        assert_eq!(grown_capacity(64, 65, 64), 128);
        assert_eq!(grown_capacity(0, 3, 64), 64);
        assert_eq!(grown_capacity(128, 1000, 64), 1024);
    }
}
