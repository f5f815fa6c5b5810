//! The public drawing surface.

use crate::coords::{Point, Rect, Viewport, YAxis};
use crate::error::{CanvasError, Result};
use crate::paint::Color;
use crate::render::geometry::VERTICES_PER_QUAD;
use crate::render::{
    Batch, Direction, DrawCall, DrawMode, Geometry, ImageFormat, ImageHandle, Registry, RenderTarget,
    Renderer, Rotation, Stamp, SurfaceState,
};
use crate::text::{FontHandle, RasterizedFont, layout_run, text_extent};

/// Construction-time canvas settings.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Y-axis convention for every coordinate passed to the canvas. Fixed for
    /// the canvas lifetime.
    pub y_axis: YAxis,

    /// Draws per batch the GPU buffers are first sized for. They grow on
    /// demand.
    pub initial_draw_capacity: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            y_axis: YAxis::Down,
            initial_draw_capacity: 256,
        }
    }
}

struct CanvasGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: Renderer,
}

/// A GPU-backed 2D drawing surface.
///
/// Usage per frame:
///
/// ```ignore
/// canvas.define_viewport(0, 0, width, height);
/// canvas.enter_context();
/// canvas.clear(Color::WHITE);
/// canvas.fill_rect(10, 10, 100, 40, Color::rgb(0.2, 0.4, 0.8));
/// canvas.draw_text(font, 10, 80, "hello", None)?;
/// canvas.leave_context(&mut RenderTarget::from_frame(&mut frame))?;
/// ```
///
/// Draw calls are recorded; `leave_context` encodes them into one render pass
/// on the host's target. Presenting stays with the host.
pub struct Canvas {
    state: SurfaceState,
    batch: Batch,
    registry: Registry,
    initial_draw_capacity: usize,
    gpu: Option<CanvasGpu>,
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            state: SurfaceState::new(config.y_axis),
            batch: Batch::default(),
            registry: Registry::default(),
            initial_draw_capacity: config.initial_draw_capacity,
            gpu: None,
        }
    }

    #[inline]
    pub fn y_axis(&self) -> YAxis {
        self.state.axis()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    // ── context ───────────────────────────────────────────────────────────

    /// One-time GPU setup: builds the shared pipeline for `format` and
    /// allocates the reusable quad buffers.
    pub fn init(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> Result<()> {
        if self.gpu.is_some() {
            return Err(CanvasError::AlreadyInitialized);
        }

        let renderer = Renderer::new(device, format, self.initial_draw_capacity)?;
        self.gpu = Some(CanvasGpu {
            device: device.clone(),
            queue: queue.clone(),
            renderer,
        });

        log::info!("canvas initialized ({:?}, {format:?})", self.state.axis());
        Ok(())
    }

    /// Sets the viewport: `x`/`y` are the top-left corner inside the render
    /// target, `width`/`height` its extent. Call on every resize.
    ///
    /// A batch uses the viewport in effect at `enter_context`; a change made
    /// inside the bracket applies from the next batch on.
    pub fn define_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.state.define_viewport(Viewport::new(x, y, width, height));
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.state.viewport()
    }

    /// Starts recording a batch.
    pub fn enter_context(&mut self) {
        self.state.enter();
        self.batch.reset();
    }

    /// Encodes the recorded batch into `target` and ends it.
    pub fn leave_context(&mut self, target: &mut RenderTarget<'_>) -> Result<()> {
        self.state.leave();

        let gpu = self.gpu.as_mut().ok_or(CanvasError::NotInitialized)?;
        gpu.renderer.encode(&gpu.device, &self.batch, &self.state, target);
        self.batch.reset();
        Ok(())
    }

    /// Clears the whole target to `color` when the batch is encoded.
    pub fn clear(&mut self, color: Color) {
        self.batch.clear(color);
    }

    /// Restricts subsequent draws to a rectangle in caller coordinates.
    pub fn set_clipping_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.set_clip(Rect::new(x, y, width, height));
    }

    pub fn cancel_clipping(&mut self) {
        self.state.cancel_clip();
    }

    // ── images ────────────────────────────────────────────────────────────

    /// Uploads tightly packed RGBA8 pixels.
    pub fn register_rgba_image(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<ImageHandle> {
        self.register_image(ImageFormat::Rgba8, width, height, pixels)
    }

    /// Uploads single-channel greyscale pixels.
    pub fn register_mono8_image(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<ImageHandle> {
        self.register_image(ImageFormat::Mono8, width, height, pixels)
    }

    fn register_image(
        &mut self,
        format: ImageFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<ImageHandle> {
        let gpu = self.gpu.as_ref().ok_or(CanvasError::NotInitialized)?;
        self.registry.register_image(
            &gpu.device,
            &gpu.queue,
            gpu.renderer.image_layout(),
            format,
            width,
            height,
            pixels,
        )
    }

    pub fn release_rgba_image(&mut self, handle: ImageHandle) -> Result<()> {
        self.registry.release_image(handle, ImageFormat::Rgba8)
    }

    pub fn release_mono8_image(&mut self, handle: ImageHandle) -> Result<()> {
        self.registry.release_image(handle, ImageFormat::Mono8)
    }

    /// Pixel format and extent of a registered image.
    pub fn image_info(&self, handle: ImageHandle) -> Result<(ImageFormat, u32, u32)> {
        let entry = self.registry.image(handle)?;
        Ok((entry.format, entry.width, entry.height))
    }

    /// Images registered and not yet released.
    pub fn image_count(&self) -> usize {
        self.registry.live_images()
    }

    pub fn font_count(&self) -> usize {
        self.registry.live_fonts()
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn record(&mut self, draw: DrawCall) {
        debug_assert!(self.state.in_context(), "draw call outside enter_context()/leave_context()");
        self.batch.push(draw);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let clip = self.state.clip();
        self.record(DrawCall::quad(DrawMode::Fill { color }, Rect::new(x, y, width, height), clip));
    }

    /// Pastes an RGBA image at 1:1. A destination larger than the image
    /// repeats it.
    pub fn draw_image(&mut self, x: i32, y: i32, width: i32, height: i32, image: ImageHandle) -> Result<()> {
        self.draw_image_with_offset(x, y, width, height, image, Point::zero())
    }

    /// Like [`draw_image`](Self::draw_image), with the image shifted by
    /// `offset` texels.
    pub fn draw_image_with_offset(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        image: ImageHandle,
        offset: Point,
    ) -> Result<()> {
        let entry = self.registry.image_as(image, ImageFormat::Rgba8)?;
        let mode = DrawMode::Paste {
            position: Point::new(x, y),
            offset,
        };
        let draw = DrawCall::quad(mode, Rect::new(x, y, width, height), self.state.clip())
            .with_image(&entry.bind_group);
        self.record(draw);
        Ok(())
    }

    /// Draws a greyscale image as coverage for `color`.
    #[allow(clippy::too_many_arguments)]
    pub fn modulate_greyscale_image(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        image: ImageHandle,
        color: Color,
        offset: Point,
    ) -> Result<()> {
        let stamp = Stamp {
            rect: Rect::new(x, y, width, height),
            origin: Point::new(x, y),
            rotation: Rotation::IDENTITY,
        };
        self.modulate(stamp, image, color, offset)
    }

    fn modulate(&mut self, stamp: Stamp, image: ImageHandle, color: Color, offset: Point) -> Result<()> {
        let entry = self.registry.image_as(image, ImageFormat::Mono8)?;
        let mode = DrawMode::Modulate {
            position: stamp.origin,
            offset,
            color,
            rotation: stamp.rotation,
        };
        let draw = DrawCall::quad(mode, stamp.rect, self.state.clip()).with_image(&entry.bind_group);
        self.record(draw);
        Ok(())
    }

    /// Stamps a `length × width` greyscale image with its length axis
    /// pointing `direction` on screen and its first texel at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_greyscale_image(
        &mut self,
        direction: Direction,
        x: i32,
        y: i32,
        length: i32,
        width: i32,
        image: ImageHandle,
        color: Color,
        offset: Point,
    ) -> Result<()> {
        let stamp = Stamp::new(direction, Point::new(x, y), length, width, self.state.axis());
        self.modulate(stamp, image, color, offset)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_greyscale_image_right(
        &mut self,
        x: i32,
        y: i32,
        length: i32,
        width: i32,
        image: ImageHandle,
        color: Color,
        offset: Point,
    ) -> Result<()> {
        self.draw_greyscale_image(Direction::Right, x, y, length, width, image, color, offset)
    }

    /// Rotated 90° clockwise on screen.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_greyscale_image_down(
        &mut self,
        x: i32,
        y: i32,
        length: i32,
        width: i32,
        image: ImageHandle,
        color: Color,
        offset: Point,
    ) -> Result<()> {
        self.draw_greyscale_image(Direction::Down, x, y, length, width, image, color, offset)
    }

    /// Rotated 180°.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_greyscale_image_left(
        &mut self,
        x: i32,
        y: i32,
        length: i32,
        width: i32,
        image: ImageHandle,
        color: Color,
        offset: Point,
    ) -> Result<()> {
        self.draw_greyscale_image(Direction::Left, x, y, length, width, image, color, offset)
    }

    /// Rotated 270° clockwise on screen.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_greyscale_image_up(
        &mut self,
        x: i32,
        y: i32,
        length: i32,
        width: i32,
        image: ImageHandle,
        color: Color,
        offset: Point,
    ) -> Result<()> {
        self.draw_greyscale_image(Direction::Up, x, y, length, width, image, color, offset)
    }

    // ── text ──────────────────────────────────────────────────────────────

    pub fn register_font(&mut self, font: RasterizedFont) -> Result<FontHandle> {
        let gpu = self.gpu.as_ref().ok_or(CanvasError::NotInitialized)?;
        self.registry
            .register_font(&gpu.device, gpu.renderer.font_layout(), font, self.state.axis())
    }

    pub fn release_font(&mut self, handle: FontHandle) -> Result<()> {
        self.registry.release_font(handle)
    }

    /// Colour used by subsequent text draws. Opaque black by default.
    pub fn set_text_color(&mut self, color: Color) {
        self.state.set_text_color(color);
    }

    #[inline]
    pub fn text_color(&self) -> Color {
        self.state.text_color()
    }

    /// Draws `text` with the font's first variant. `(x, y)` is the left ink
    /// edge on the baseline.
    pub fn draw_text(
        &mut self,
        font: FontHandle,
        x: i32,
        y: i32,
        text: &str,
        max_width: Option<i32>,
    ) -> Result<()> {
        self.draw_text_variant(font, 0, x, y, text, max_width)
    }

    /// Draws `text` with variant `variant` of `font`.
    ///
    /// With `max_width = Some(w)`, `w > 0`, glyphs whose pen offset from `x`
    /// reaches `w` are dropped, never clipped.
    pub fn draw_text_variant(
        &mut self,
        font: FontHandle,
        variant: usize,
        x: i32,
        y: i32,
        text: &str,
        max_width: Option<i32>,
    ) -> Result<()> {
        debug_assert!(self.state.in_context(), "draw call outside enter_context()/leave_context()");

        let managed = self.registry.font(font)?;
        let gpu_variant = managed
            .variants
            .get(variant)
            .ok_or(CanvasError::NoSuchVariant { font, variant })?;
        let metrics = &managed.font.variants[variant];

        let color = self.state.text_color();
        let clip = self.state.clip();
        let placed = layout_run(metrics, |c| managed.font.glyph_index(c), Point::new(x, y), text, max_width);

        for g in placed {
            let Some(glyph) = metrics.glyphs.get(g.glyph_index as usize) else { continue };
            if glyph.cbox.is_empty() {
                continue;
            }

            let base_vertex = (gpu_variant.base_glyph + g.glyph_index) * VERTICES_PER_QUAD;
            self.batch.push(DrawCall {
                mode: DrawMode::Text {
                    glyph_base: glyph.pixel_base,
                    cbox: glyph.cbox,
                    position: g.pen,
                    color,
                },
                geometry: Geometry::Glyph {
                    vertices: managed.vertices.clone(),
                    base_vertex: base_vertex as i32,
                },
                clip,
                image: None,
                font: Some(gpu_variant.pixel_group.clone()),
            });
        }

        Ok(())
    }

    /// Advance width of `text` in the font's first variant.
    pub fn text_extent(&self, font: FontHandle, text: &str) -> Result<i32> {
        let managed = self.registry.font(font)?;
        let metrics = managed
            .font
            .variants
            .first()
            .ok_or(CanvasError::NoSuchVariant { font, variant: 0 })?;
        Ok(text_extent(metrics, |c| managed.font.glyph_index(c), text))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FontHandle;
    use std::num::NonZeroU32;

    fn canvas(axis: YAxis) -> Canvas {
        Canvas::new(CanvasConfig {
            y_axis: axis,
            ..CanvasConfig::default()
        })
    }

    #[test]
    fn new_canvas_is_uninitialized_with_black_text() {
        let c = canvas(YAxis::Up);
        assert!(!c.is_initialized());
        assert_eq!(c.y_axis(), YAxis::Up);
        assert_eq!(c.text_color(), Color::BLACK);
    }

    #[test]
    fn registration_before_init_fails() {
        let mut c = Canvas::default();
        assert!(matches!(
            c.register_rgba_image(1, 1, &[0; 4]),
            Err(CanvasError::NotInitialized)
        ));
        assert!(matches!(
            c.register_font(RasterizedFont::default()),
            Err(CanvasError::NotInitialized)
        ));
    }

    #[test]
    fn unknown_handles_fail_instead_of_drawing() {
        let mut c = Canvas::default();
        c.enter_context();
        let image = ImageHandle(NonZeroU32::MIN);
        let font = FontHandle(NonZeroU32::MIN);

        assert!(matches!(c.draw_image(0, 0, 4, 4, image), Err(CanvasError::NoSuchImage(_))));
        assert!(matches!(
            c.draw_greyscale_image_left(0, 0, 4, 2, image, Color::WHITE, Point::zero()),
            Err(CanvasError::NoSuchImage(_))
        ));
        assert!(matches!(c.draw_text(font, 0, 0, "x", None), Err(CanvasError::NoSuchFont(_))));
        assert!(matches!(c.release_font(font), Err(CanvasError::NoSuchFont(_))));
        assert!(matches!(c.text_extent(font, "x"), Err(CanvasError::NoSuchFont(_))));
    }

    #[test]
    fn empty_canvas_owns_no_resources() {
        let c = Canvas::default();
        assert_eq!(c.image_count(), 0);
        assert_eq!(c.font_count(), 0);
        assert!(matches!(
            c.image_info(ImageHandle(NonZeroU32::MIN)),
            Err(CanvasError::NoSuchImage(_))
        ));
    }

    #[test]
    fn recorded_fills_carry_the_active_clip() {
        let mut c = Canvas::default();
        c.define_viewport(0, 0, 100, 100);
        c.enter_context();
        c.fill_rect(0, 0, 10, 10, Color::WHITE);
        c.set_clipping_rect(5, 5, 20, 20);
        c.fill_rect(0, 0, 10, 10, Color::WHITE);
        c.cancel_clipping();

        let clips: Vec<_> = c.batch.draws().iter().map(|d| d.clip).collect();
        assert_eq!(clips, vec![None, Some(Rect::new(5, 5, 20, 20))]);
    }

    #[test]
    fn enter_context_starts_an_empty_batch() {
        let mut c = Canvas::default();
        c.enter_context();
        c.clear(Color::WHITE);
        c.fill_rect(0, 0, 1, 1, Color::BLACK);
        c.state.leave();

        c.enter_context();
        assert!(c.batch.is_empty());
    }
}
