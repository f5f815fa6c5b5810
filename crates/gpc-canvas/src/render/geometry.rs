//! Quad geometry shared by every draw mode.
//!
//! A rectangle is always 4 vertices drawn through the fixed index pattern
//! [`QUAD_INDICES`] as a triangle strip. Modes differ only in the uniforms set
//! before the draw.

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Viewport, YAxis};

/// Strip ordering that turns the corner sequence produced by [`rect_corners`]
/// (or a glyph quad) into two triangles sharing the diagonal.
pub const QUAD_INDICES: [u16; 4] = [0, 1, 3, 2];

pub const VERTICES_PER_QUAD: u32 = 4;

// ── vertex ────────────────────────────────────────────────────────────────

/// Integer pixel vertex, caller space.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [i32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Sint32x2];

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { pos: [x, y] }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Corners of `rect` in strip-source order.
///
/// `(x, y)`, `(x, y + h)`, `(x + w, y + h)`, `(x + w, y)`: top-left,
/// bottom-left, bottom-right, top-right when Y points down; the vertical
/// mirror of that naming when Y points up. The coordinates are identical in
/// both conventions; the vertex stage applies the flip.
#[inline]
pub fn rect_corners(rect: Rect) -> [QuadVertex; 4] {
    let Rect { x, y, w, h } = rect;
    [
        QuadVertex::new(x, y),
        QuadVertex::new(x, y + h),
        QuadVertex::new(x + w, y + h),
        QuadVertex::new(x + w, y),
    ]
}

/// The two triangles a 4-vertex strip produces through [`QUAD_INDICES`].
pub fn strip_triangles<T: Copy>(quad: &[T; 4]) -> [[T; 3]; 2] {
    let v = QUAD_INDICES.map(|i| quad[i as usize]);
    [[v[0], v[1], v[2]], [v[1], v[2], v[3]]]
}

/// Maps a caller-space point to clip space on a `target`-sized attachment.
///
/// CPU mirror of `vs_main` in `canvas.wgsl`. With the viewport covering the
/// whole target this is `y_ndc = 1 - 2y/h` for Y down and `2y/h - 1` for Y up.
pub fn to_clip(pos: [i32; 2], viewport: Viewport, target: (u32, u32), axis: YAxis) -> [f32; 2] {
    let fb_x = viewport.x as f32 + pos[0] as f32;
    let fb_y = match axis {
        YAxis::Down => viewport.y as f32 + pos[1] as f32,
        YAxis::Up => viewport.y as f32 + viewport.height.max(1) as f32 - pos[1] as f32,
    };

    let x = fb_x / target.0.max(1) as f32 * 2.0 - 1.0;
    let y = fb_y / target.1.max(1) as f32 * 2.0 - 1.0;
    [x, -y]
}
