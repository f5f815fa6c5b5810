//! GPU objects owned by an initialized canvas, and batch encoding.

use wgpu::util::DeviceExt;

use crate::error::Result;

use super::batch::{Batch, Geometry, grown_capacity, pack_uniforms};
use super::geometry::{QUAD_INDICES, QuadVertex, VERTICES_PER_QUAD};
use super::mode::{DrawUniforms, ViewportUniform, uniform_stride};
use super::pipeline::CanvasPipeline;
use super::surface::{SurfaceState, scissor_for};
use super::target::RenderTarget;

const MIN_CAPACITY: usize = 64;

pub(crate) struct Renderer {
    pipeline: CanvasPipeline,
    stride: u64,

    viewport_ubo: wgpu::Buffer,
    draw_ubo: wgpu::Buffer,
    draw_capacity: usize,
    globals: wgpu::BindGroup,

    quad_vbo: wgpu::Buffer,
    quad_capacity: usize,
    quad_ibo: wgpu::Buffer,

    // Bound for draws that do not sample an image or a font.
    empty_image: wgpu::BindGroup,
    empty_font: wgpu::BindGroup,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, initial_draws: usize) -> Result<Self> {
        let pipeline = CanvasPipeline::new(device, format)?;
        let stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let capacity = initial_draws.max(MIN_CAPACITY);

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpc viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let draw_ubo = Self::create_draw_ubo(device, capacity, stride);
        let globals = Self::create_globals(device, &pipeline, &viewport_ubo, &draw_ubo);
        let quad_vbo = Self::create_quad_vbo(device, capacity);

        // Uploaded once; fixed for the canvas lifetime.
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpc quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (empty_image, empty_font) = Self::create_placeholders(device, &pipeline);

        Ok(Self {
            pipeline,
            stride,
            viewport_ubo,
            draw_ubo,
            draw_capacity: capacity,
            globals,
            quad_vbo,
            quad_capacity: capacity,
            quad_ibo,
            empty_image,
            empty_font,
        })
    }

    #[inline]
    pub fn image_layout(&self) -> &wgpu::BindGroupLayout {
        &self.pipeline.image_layout
    }

    #[inline]
    pub fn font_layout(&self) -> &wgpu::BindGroupLayout {
        &self.pipeline.font_layout
    }

    /// Encodes `batch` as one render pass on `target`.
    ///
    /// Buffer updates are recorded into the target's encoder, so several
    /// batches may share one submission.
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        batch: &Batch,
        state: &SurfaceState,
        target: &mut RenderTarget<'_>,
    ) {
        if batch.is_empty() {
            return;
        }

        let draws = batch.draws();
        let target_size = target.size();
        let viewport = state.batch_viewport();
        let axis = state.axis();

        let scissors: Vec<_> = draws
            .iter()
            .map(|d| scissor_for(d.clip, viewport, axis, target_size))
            .collect();
        let hidden = scissors.iter().filter(|s| s.is_none()).count();
        if hidden > 0 {
            log::warn!("{hidden} draw(s) skipped: clip or viewport leaves nothing visible");
        }

        let quads = batch.quad_vertices();
        self.ensure_capacity(device, draws.len(), quads.len() / VERTICES_PER_QUAD as usize);

        let viewport_uniform = ViewportUniform::new(viewport, target_size, axis);
        stage(device, target.encoder, &self.viewport_ubo, bytemuck::bytes_of(&viewport_uniform));
        if !draws.is_empty() {
            let uniforms = pack_uniforms(draws.iter().map(|d| d.mode.uniforms()), self.stride);
            stage(device, target.encoder, &self.draw_ubo, &uniforms);
        }
        if !quads.is_empty() {
            stage(device, target.encoder, &self.quad_vbo, bytemuck::cast_slice(&quads));
        }

        let load = match batch.clear_color() {
            Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gpc canvas pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline.pipeline);
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        let mut next_quad = 0i32;
        for (i, (draw, scissor)) in draws.iter().zip(&scissors).enumerate() {
            let (vertices, base_vertex) = match &draw.geometry {
                Geometry::Quad(_) => {
                    let base = next_quad * VERTICES_PER_QUAD as i32;
                    next_quad += 1;
                    (&self.quad_vbo, base)
                }
                Geometry::Glyph { vertices, base_vertex } => (vertices, *base_vertex),
            };

            let Some(s) = scissor else { continue };

            rpass.set_scissor_rect(s.x, s.y, s.width, s.height);
            rpass.set_bind_group(0, &self.globals, &[(i as u64 * self.stride) as u32]);
            rpass.set_bind_group(1, draw.image.as_ref().unwrap_or(&self.empty_image), &[]);
            rpass.set_bind_group(2, draw.font.as_ref().unwrap_or(&self.empty_font), &[]);
            rpass.set_vertex_buffer(0, vertices.slice(..));
            rpass.draw_indexed(0..QUAD_INDICES.len() as u32, base_vertex, 0..1);
        }
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, draws: usize, quads: usize) {
        let draw_capacity = grown_capacity(self.draw_capacity, draws, MIN_CAPACITY);
        if draw_capacity != self.draw_capacity {
            self.draw_ubo = Self::create_draw_ubo(device, draw_capacity, self.stride);
            self.globals = Self::create_globals(device, &self.pipeline, &self.viewport_ubo, &self.draw_ubo);
            self.draw_capacity = draw_capacity;
            log::debug!("draw uniform buffer grown to {draw_capacity} draws");
        }

        let quad_capacity = grown_capacity(self.quad_capacity, quads, MIN_CAPACITY);
        if quad_capacity != self.quad_capacity {
            self.quad_vbo = Self::create_quad_vbo(device, quad_capacity);
            self.quad_capacity = quad_capacity;
            log::debug!("quad vertex buffer grown to {quad_capacity} quads");
        }
    }

    fn create_draw_ubo(device: &wgpu::Device, capacity: usize, stride: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpc draw ubo"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_quad_vbo(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpc quad vbo"),
            size: (capacity * VERTICES_PER_QUAD as usize * std::mem::size_of::<QuadVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_globals(
        device: &wgpu::Device,
        pipeline: &CanvasPipeline,
        viewport_ubo: &wgpu::Buffer,
        draw_ubo: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpc globals bind group"),
            layout: &pipeline.globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: draw_ubo,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                    }),
                },
            ],
        })
    }

    fn create_placeholders(
        device: &wgpu::Device,
        pipeline: &CanvasPipeline,
    ) -> (wgpu::BindGroup, wgpu::BindGroup) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("gpc empty image"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let image = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpc empty image bind group"),
            layout: &pipeline.image_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });

        let words = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpc empty font pixels"),
            contents: bytemuck::bytes_of(&0u32),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let font = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpc empty font bind group"),
            layout: &pipeline.font_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: words.as_entire_binding(),
            }],
        });

        (image, font)
    }
}

/// Copies `bytes` into `dst` through a staging buffer recorded on `encoder`.
fn stage(device: &wgpu::Device, encoder: &mut wgpu::CommandEncoder, dst: &wgpu::Buffer, bytes: &[u8]) {
    let staging = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gpc staging"),
        contents: bytes,
        usage: wgpu::BufferUsages::COPY_SRC,
    });
    encoder.copy_buffer_to_buffer(&staging, 0, dst, 0, bytes.len() as u64);
}
