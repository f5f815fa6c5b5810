//! Render-mode dispatch: every visual behavior of the shared pipeline is a
//! [`DrawMode`] compiled down to one [`DrawUniforms`] block.
//!
//! The uniform blocks and resource bindings below are the wire contract with
//! `shaders/canvas.wgsl`. [`UNIFORM_SLOTS`] and [`BINDING_SLOTS`] enumerate it
//! in one place; the pipeline tests check both tables against the shader.

use bytemuck::{Pod, Zeroable};
use std::mem::offset_of;

use crate::coords::{Point, Viewport, YAxis};
use crate::paint::Color;
use crate::text::GlyphCbox;

// ── modes ─────────────────────────────────────────────────────────────────

/// Value of the `render_mode` uniform.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderMode {
    Fill = 1,
    Paste = 2,
    Text = 3,
    Modulate = 4,
}

impl RenderMode {
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Texture-coordinate rotation for modulated images.
///
/// Applied as `[[cos, sin], [-sin, cos]] * (pixel - position)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    pub sin: f32,
    pub cos: f32,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { sin: 0.0, cos: 1.0 };

    /// Column-major 2×2 matrix.
    #[inline]
    pub const fn columns(self) -> [[f32; 2]; 2] {
        [[self.cos, -self.sin], [self.sin, self.cos]]
    }

    /// The columns flattened into the `texcoord_matrix` vector.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        let [c0, c1] = self.columns();
        [c0[0], c0[1], c1[0], c1[1]]
    }

    /// CPU mirror of `texcoord_matrix * v` in the shader.
    #[inline]
    pub fn apply(self, v: [f32; 2]) -> [f32; 2] {
        let [c0, c1] = self.columns();
        [c0[0] * v[0] + c1[0] * v[1], c0[1] * v[0] + c1[1] * v[1]]
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One draw's worth of pipeline state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawMode {
    /// Flat-colour rectangle.
    Fill { color: Color },
    /// RGBA image at 1:1, repeated by wrap addressing.
    Paste { position: Point, offset: Point },
    /// Greyscale image used as coverage for `color`.
    Modulate {
        position: Point,
        offset: Point,
        color: Color,
        rotation: Rotation,
    },
    /// One glyph quad sampled from a font's linear pixel buffer.
    Text {
        glyph_base: u32,
        cbox: GlyphCbox,
        position: Point,
        color: Color,
    },
}

impl DrawMode {
    pub fn render_mode(&self) -> RenderMode {
        match self {
            DrawMode::Fill { .. } => RenderMode::Fill,
            DrawMode::Paste { .. } => RenderMode::Paste,
            DrawMode::Modulate { .. } => RenderMode::Modulate,
            DrawMode::Text { .. } => RenderMode::Text,
        }
    }

    /// Compiles the mode into the uniform block. The only place that writes
    /// mode-specific fields.
    pub fn uniforms(&self) -> DrawUniforms {
        let mut u = DrawUniforms {
            texcoord_matrix: Rotation::IDENTITY.to_array(),
            render_mode: self.render_mode().id(),
            ..DrawUniforms::zeroed()
        };

        match *self {
            DrawMode::Fill { color } => {
                u.color = color.to_array();
            }
            DrawMode::Paste { position, offset } => {
                u.color = Color::TRANSPARENT.to_array();
                u.position = position.to_array();
                u.offset = offset.to_array();
            }
            DrawMode::Modulate { position, offset, color, rotation } => {
                u.color = color.to_array();
                u.position = position.to_array();
                u.offset = offset.to_array();
                u.texcoord_matrix = rotation.to_array();
            }
            DrawMode::Text { glyph_base, cbox, position, color } => {
                u.color = color.to_array();
                u.glyph_base = glyph_base;
                u.glyph_cbox = cbox.to_array();
                u.position = position.to_array();
            }
        }

        u
    }
}

// ── uniform blocks ────────────────────────────────────────────────────────

/// Per-batch uniform block (`Viewport` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub origin: [f32; 2],
    pub size: [f32; 2],
    /// Colour attachment extent; NDC are relative to the whole target.
    pub target_size: [f32; 2],
    pub y_axis_down: u32,
    pub _pad: u32,
}

impl ViewportUniform {
    pub fn new(viewport: Viewport, target: (u32, u32), axis: YAxis) -> Self {
        Self {
            origin: [viewport.x as f32, viewport.y as f32],
            size: [viewport.width.max(1) as f32, viewport.height.max(1) as f32],
            target_size: [target.0.max(1) as f32, target.1.max(1) as f32],
            y_axis_down: axis.uniform_flag(),
            _pad: 0,
        }
    }
}

/// Per-draw uniform block (`DrawUniforms` in WGSL), bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub color: [f32; 4],
    /// `x_min, x_max, y_min, y_max`
    pub glyph_cbox: [i32; 4],
    /// Rotation columns `(c0.x, c0.y, c1.x, c1.y)`.
    pub texcoord_matrix: [f32; 4],
    pub position: [i32; 2],
    pub offset: [i32; 2],
    pub render_mode: u32,
    pub glyph_base: u32,
    pub _pad: [u32; 2],
}

// ── slot tables ───────────────────────────────────────────────────────────

/// One field of a uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    /// WGSL struct name.
    pub block: &'static str,
    /// WGSL member name.
    pub field: &'static str,
    /// Byte offset inside the block.
    pub offset: u32,
}

const fn slot(block: &'static str, field: &'static str, offset: usize) -> UniformSlot {
    UniformSlot { block, field, offset: offset as u32 }
}

pub const UNIFORM_SLOTS: [UniformSlot; 13] = [
    slot("Viewport", "origin", offset_of!(ViewportUniform, origin)),
    slot("Viewport", "size", offset_of!(ViewportUniform, size)),
    slot("Viewport", "target_size", offset_of!(ViewportUniform, target_size)),
    slot("Viewport", "y_axis_down", offset_of!(ViewportUniform, y_axis_down)),
    slot("DrawUniforms", "color", offset_of!(DrawUniforms, color)),
    slot("DrawUniforms", "glyph_cbox", offset_of!(DrawUniforms, glyph_cbox)),
    slot("DrawUniforms", "texcoord_matrix", offset_of!(DrawUniforms, texcoord_matrix)),
    slot("DrawUniforms", "position", offset_of!(DrawUniforms, position)),
    slot("DrawUniforms", "offset", offset_of!(DrawUniforms, offset)),
    slot("DrawUniforms", "render_mode", offset_of!(DrawUniforms, render_mode)),
    slot("DrawUniforms", "glyph_base", offset_of!(DrawUniforms, glyph_base)),
    slot("DrawUniforms", "_pad0", offset_of!(DrawUniforms, _pad)),
    slot("DrawUniforms", "_pad1", offset_of!(DrawUniforms, _pad) + 4),
];

/// A resource binding of the shared pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BindingSlot {
    /// WGSL global name.
    pub name: &'static str,
    pub group: u32,
    pub binding: u32,
}

pub const VIEWPORT_SLOT: BindingSlot = BindingSlot { name: "viewport", group: 0, binding: 0 };
pub const DRAW_SLOT: BindingSlot = BindingSlot { name: "per_draw", group: 0, binding: 1 };
/// The image sampled by paste and modulate.
pub const IMAGE_SLOT: BindingSlot = BindingSlot { name: "image_texture", group: 1, binding: 0 };
/// Linear glyph pixels of the active font variant.
pub const FONT_PIXELS_SLOT: BindingSlot = BindingSlot { name: "font_pixels", group: 2, binding: 0 };

pub const BINDING_SLOTS: [BindingSlot; 4] = [VIEWPORT_SLOT, DRAW_SLOT, IMAGE_SLOT, FONT_PIXELS_SLOT];

/// Stride between consecutive [`DrawUniforms`] in the dynamic uniform buffer.
pub fn uniform_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<DrawUniforms>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}
