//! The single shared render pipeline.
//!
//! The WGSL module is parsed and validated with naga before it reaches wgpu so
//! a broken program surfaces as [`CanvasError::PipelineBuild`] carrying the
//! diagnostic, instead of a device-level panic.

use std::mem::size_of;

use crate::error::{CanvasError, Result};

use super::geometry::QuadVertex;
use super::mode::{
    DRAW_SLOT, DrawUniforms, FONT_PIXELS_SLOT, IMAGE_SLOT, VIEWPORT_SLOT, ViewportUniform,
};

pub(crate) const SHADER_SOURCE: &str = include_str!("shaders/canvas.wgsl");

/// Parses and validates WGSL, returning the diagnostic text on failure.
pub(crate) fn validate_shader(source: &str) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| CanvasError::PipelineBuild {
        log: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| CanvasError::PipelineBuild {
        log: e.emit_to_string(source),
    })?;

    Ok(module)
}

/// Straight (non-premultiplied) alpha: `src * a + dst * (1 - a)`.
fn straight_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn uniform_entry(binding: u32, dynamic: bool, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

/// Pipeline plus the bind group layouts its resources are created against.
pub(crate) struct CanvasPipeline {
    pub pipeline: wgpu::RenderPipeline,
    /// Group 0: viewport + per-draw uniforms.
    pub globals_layout: wgpu::BindGroupLayout,
    /// Group 1: one image texture.
    pub image_layout: wgpu::BindGroupLayout,
    /// Group 2: one font variant's pixel words.
    pub font_layout: wgpu::BindGroupLayout,
}

impl CanvasPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self> {
        validate_shader(SHADER_SOURCE)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gpc canvas shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gpc canvas globals bgl"),
            entries: &[
                uniform_entry(VIEWPORT_SLOT.binding, false, size_of::<ViewportUniform>()),
                uniform_entry(DRAW_SLOT.binding, true, size_of::<DrawUniforms>()),
            ],
        });

        let image_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gpc canvas image bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: IMAGE_SLOT.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let font_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gpc canvas font bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: FONT_PIXELS_SLOT.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(4),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gpc canvas pipeline layout"),
            bind_group_layouts: &[&globals_layout, &image_layout, &font_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gpc canvas pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(straight_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint16),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("canvas pipeline built for {format:?}");

        Ok(Self {
            pipeline,
            globals_layout,
            image_layout,
            font_layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mode::{BINDING_SLOTS, RenderMode, UNIFORM_SLOTS};

    fn module() -> naga::Module {
        match validate_shader(SHADER_SOURCE) {
            Ok(m) => m,
            Err(e) => panic!("{e}"),
        }
    }

    fn struct_members(module: &naga::Module, name: &str) -> (Vec<naga::StructMember>, u32) {
        module
            .types
            .iter()
            .find_map(|(_, ty)| match &ty.inner {
                naga::TypeInner::Struct { members, span } if ty.name.as_deref() == Some(name) => {
                    Some((members.clone(), *span))
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("struct {name} missing from shader"))
    }

    fn u32_constant(module: &naga::Module, name: &str) -> u32 {
        let (_, c) = module
            .constants
            .iter()
            .find(|(_, c)| c.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("constant {name} missing from shader"));
        match module.global_expressions[c.init] {
            naga::Expression::Literal(naga::Literal::U32(v)) => v,
            ref other => panic!("{name} is not a u32 literal: {other:?}"),
        }
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn shader_validates() {
        let m = module();
        let names: Vec<&str> = m.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"vs_main"));
        assert!(names.contains(&"fs_main"));
    }

    #[test]
    fn broken_shader_carries_diagnostic() {
        match validate_shader("fn broken( {") {
            Err(CanvasError::PipelineBuild { log }) => assert!(!log.is_empty()),
            other => panic!("expected PipelineBuild, got {other:?}"),
        }
    }

    #[test]
    fn type_errors_are_reported_by_validation() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1u; }";
        assert!(matches!(
            validate_shader(src),
            Err(CanvasError::PipelineBuild { .. })
        ));
    }

    // ── wire contract ─────────────────────────────────────────────────────

    #[test]
    fn uniform_slots_match_shader_offsets() {
        let m = module();
        for slot in UNIFORM_SLOTS {
            let (members, _) = struct_members(&m, slot.block);
            let member = members
                .iter()
                .find(|mem| mem.name.as_deref() == Some(slot.field))
                .unwrap_or_else(|| panic!("{}.{} missing", slot.block, slot.field));
            assert_eq!(member.offset, slot.offset, "{}.{}", slot.block, slot.field);
        }
    }

    #[test]
    fn uniform_block_sizes_match_host_structs() {
        let m = module();
        assert_eq!(struct_members(&m, "Viewport").1 as usize, size_of::<ViewportUniform>());
        assert_eq!(struct_members(&m, "DrawUniforms").1 as usize, size_of::<DrawUniforms>());
    }

    // GL backends lay out matrix members with std140 column padding, which
    // would shift every later field away from the host struct.
    #[test]
    fn uniform_blocks_hold_no_matrices() {
        let m = module();
        for block in ["Viewport", "DrawUniforms"] {
            let (members, _) = struct_members(&m, block);
            for member in members {
                let inner = &m.types[member.ty].inner;
                assert!(
                    matches!(inner, naga::TypeInner::Scalar(_) | naga::TypeInner::Vector { .. }),
                    "{block}.{:?} is {inner:?}",
                    member.name
                );
            }
        }
    }

    #[test]
    fn binding_slots_match_shader_globals() {
        let m = module();
        for slot in BINDING_SLOTS {
            let (_, var) = m
                .global_variables
                .iter()
                .find(|(_, v)| v.name.as_deref() == Some(slot.name))
                .unwrap_or_else(|| panic!("global {} missing", slot.name));
            let binding = var.binding.as_ref().expect("resource binding");
            assert_eq!((binding.group, binding.binding), (slot.group, slot.binding), "{}", slot.name);
        }
    }

    #[test]
    fn render_mode_ids_match_shader_constants() {
        let m = module();
        assert_eq!(u32_constant(&m, "MODE_FILL"), RenderMode::Fill.id());
        assert_eq!(u32_constant(&m, "MODE_PASTE"), RenderMode::Paste.id());
        assert_eq!(u32_constant(&m, "MODE_TEXT"), RenderMode::Text.id());
        assert_eq!(u32_constant(&m, "MODE_MODULATE"), RenderMode::Modulate.id());
    }
}
