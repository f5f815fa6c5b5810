use crate::device::GpuFrame;

/// Where a batch is encoded: the host's encoder and colour attachment.
///
/// `width`/`height` are the attachment's extent in pixels; scissor rectangles
/// are clamped to it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            encoder,
            color_view,
            width,
            height,
        }
    }

    /// Targets the surface texture of an acquired frame.
    #[inline]
    pub fn from_frame(frame: &'a mut GpuFrame) -> Self {
        Self {
            encoder: &mut frame.encoder,
            color_view: &frame.view,
            width: frame.width,
            height: frame.height,
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
