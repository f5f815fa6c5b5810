//! Handle-based ownership of images and fonts.
//!
//! Handles are 1-based indices into slot lists. Releasing a resource drops its
//! GPU objects and leaves a tombstone; slots are never reused, so a stale
//! handle reports "no such resource" instead of aliasing a newer one.

use std::num::NonZeroU32;

use crate::coords::YAxis;
use crate::error::{CanvasError, Result};
use crate::text::atlas::ManagedFont;
use crate::text::{FontHandle, RasterizedFont};

/// Opaque handle to a registered image. RGBA and mono images share one
/// namespace.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ImageHandle(pub(crate) NonZeroU32);

impl ImageHandle {
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Pixel layout of a registered image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ImageFormat {
    /// 4 bytes per pixel, straight alpha.
    Rgba8,
    /// 1 byte per pixel, greyscale/coverage.
    Mono8,
}

impl ImageFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::Rgba8 => 4,
            ImageFormat::Mono8 => 1,
        }
    }

    pub(crate) fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            ImageFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
            ImageFormat::Mono8 => wgpu::TextureFormat::R8Unorm,
        }
    }
}

/// Checks that `pixels` is a tightly packed `width × height` image.
pub fn validate_image(format: ImageFormat, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CanvasError::InvalidImage {
            reason: format!("{width}x{height} has no pixels"),
        });
    }

    let expected = width as u64 * height as u64 * format.bytes_per_pixel() as u64;
    if pixels.len() as u64 != expected {
        return Err(CanvasError::InvalidImage {
            reason: format!(
                "{width}x{height} {format:?} needs {expected} bytes, got {}",
                pixels.len()
            ),
        });
    }

    Ok(())
}

// ── slots ─────────────────────────────────────────────────────────────────

/// Append-only slot list with tombstones.
#[derive(Debug)]
pub(crate) struct Slots<T> {
    entries: Vec<Option<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Slots<T> {
    /// Stores `value`, returning its 1-based id.
    pub fn insert(&mut self, value: T) -> NonZeroU32 {
        self.entries.push(Some(value));
        // len >= 1 after the push.
        NonZeroU32::new(self.entries.len() as u32).unwrap_or(NonZeroU32::MIN)
    }

    pub fn get(&self, id: NonZeroU32) -> Option<&T> {
        self.entries.get(id.get() as usize - 1)?.as_ref()
    }

    /// Takes the value out, leaving a tombstone.
    pub fn remove(&mut self, id: NonZeroU32) -> Option<T> {
        self.entries.get_mut(id.get() as usize - 1)?.take()
    }

    pub fn live(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

// ── entries ───────────────────────────────────────────────────────────────

pub(crate) struct ImageEntry {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bind_group: wgpu::BindGroup,
    _texture: wgpu::Texture,
}

impl ImageEntry {
    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image_layout: &wgpu::BindGroupLayout,
        format: ImageFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("gpc image"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * format.bytes_per_pixel() as u32),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpc image bind group"),
            layout: image_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });

        Self {
            format,
            width,
            height,
            bind_group,
            _texture: texture,
        }
    }
}

// ── registry ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct Registry {
    images: Slots<ImageEntry>,
    fonts: Slots<ManagedFont>,
}

impl Registry {
    #[allow(clippy::too_many_arguments)]
    pub fn register_image(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image_layout: &wgpu::BindGroupLayout,
        format: ImageFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<ImageHandle> {
        validate_image(format, width, height, pixels)?;

        let entry = ImageEntry::upload(device, queue, image_layout, format, width, height, pixels);
        let handle = ImageHandle(self.images.insert(entry));
        log::debug!("registered {format:?} image {width}x{height} as {}", handle.get());
        Ok(handle)
    }

    pub fn image(&self, handle: ImageHandle) -> Result<&ImageEntry> {
        self.images.get(handle.0).ok_or(CanvasError::NoSuchImage(handle))
    }

    /// Looks up `handle` and checks its pixel format.
    pub fn image_as(&self, handle: ImageHandle, expected: ImageFormat) -> Result<&ImageEntry> {
        let entry = self.image(handle)?;
        if entry.format != expected {
            return Err(CanvasError::ImageFormatMismatch {
                handle,
                expected,
                actual: entry.format,
            });
        }
        Ok(entry)
    }

    pub fn release_image(&mut self, handle: ImageHandle, expected: ImageFormat) -> Result<()> {
        self.image_as(handle, expected)?;
        self.images.remove(handle.0);
        log::debug!("released image {}", handle.get());
        Ok(())
    }

    pub fn register_font(
        &mut self,
        device: &wgpu::Device,
        font_layout: &wgpu::BindGroupLayout,
        font: RasterizedFont,
        axis: YAxis,
    ) -> Result<FontHandle> {
        let managed = ManagedFont::upload(device, font_layout, font, axis)?;
        let handle = FontHandle(self.fonts.insert(managed));
        log::debug!("registered font {}", handle.get());
        Ok(handle)
    }

    pub fn font(&self, handle: FontHandle) -> Result<&ManagedFont> {
        self.fonts.get(handle.0).ok_or(CanvasError::NoSuchFont(handle))
    }

    pub fn release_font(&mut self, handle: FontHandle) -> Result<()> {
        self.fonts
            .remove(handle.0)
            .map(|_| log::debug!("released font {}", handle.get()))
            .ok_or(CanvasError::NoSuchFont(handle))
    }

    pub fn live_images(&self) -> usize {
        self.images.live()
    }

    pub fn live_fonts(&self) -> usize {
        self.fonts.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    // ── slots ─────────────────────────────────────────────────────────────

    #[test]
    fn ids_are_one_based_and_sequential() {
        let mut slots = Slots::default();
        assert_eq!(slots.insert("a"), id(1));
        assert_eq!(slots.insert("b"), id(2));
        assert_eq!(slots.get(id(2)), Some(&"b"));
    }

    #[test]
    fn released_slots_are_tombstoned_not_reused() {
        let mut slots = Slots::default();
        let a = slots.insert(1);
        let b = slots.insert(2);

        assert_eq!(slots.remove(a), Some(1));
        assert_eq!(slots.get(a), None);
        assert_eq!(slots.remove(a), None);
        assert_eq!(slots.get(b), Some(&2));

        assert_eq!(slots.insert(3), id(3));
        assert_eq!(slots.live(), 2);
    }

    #[test]
    fn unknown_ids_are_absent() {
        let mut slots: Slots<u8> = Slots::default();
        assert_eq!(slots.get(id(7)), None);
        assert_eq!(slots.remove(id(7)), None);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn image_sizes_are_checked_per_format() {
        assert!(validate_image(ImageFormat::Rgba8, 2, 3, &[0; 24]).is_ok());
        assert!(validate_image(ImageFormat::Mono8, 2, 3, &[0; 6]).is_ok());
        assert!(validate_image(ImageFormat::Rgba8, 2, 3, &[0; 6]).is_err());
        assert!(validate_image(ImageFormat::Mono8, 2, 3, &[0; 24]).is_err());
    }

    #[test]
    fn empty_images_are_rejected() {
        let err = validate_image(ImageFormat::Mono8, 0, 4, &[]);
        assert!(matches!(err, Err(CanvasError::InvalidImage { .. })));
    }

    #[test]
    fn empty_registry_reports_missing_handles() {
        let reg = Registry::default();
        let h = ImageHandle(id(1));
        assert!(matches!(reg.image(h), Err(CanvasError::NoSuchImage(x)) if x == h));
        let f = FontHandle(id(1));
        assert!(matches!(reg.font(f), Err(CanvasError::NoSuchFont(x)) if x == f));
    }
}
