use super::SurfaceErrorAction;

/// How well `format` suits the canvas pipeline as a colour attachment; lower
/// is better. The canvas writes 8-bit straight-alpha colour, so plain 8-bit
/// RGBA/BGRA targets come first, ordered by the sRGB preference.
fn format_rank(format: wgpu::TextureFormat, prefer_srgb: bool) -> u8 {
    use wgpu::TextureFormat as F;
    match format {
        F::Bgra8Unorm | F::Rgba8Unorm | F::Bgra8UnormSrgb | F::Rgba8UnormSrgb => {
            if format.is_srgb() == prefer_srgb { 0 } else { 1 }
        }
        _ => 2,
    }
}

/// Best-ranked supported format; ties keep the surface's own order.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .min_by_key(|&f| format_rank(f, prefer_srgb))
}

/// The requested mode if supported, else opaque, else whatever the surface
/// lists first.
pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    let supported = |m: &wgpu::CompositeAlphaMode| caps.alpha_modes.contains(m);
    requested
        .filter(supported)
        .or_else(|| Some(wgpu::CompositeAlphaMode::Opaque).filter(supported))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Applies a new drawable size.
///
/// wgpu refuses to configure a 0x0 surface; in that case only `size` is
/// updated and configuration waits for the next non-empty resize.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut (u32, u32),
    new_size: (u32, u32),
) {
    *size = new_size;
    if new_size.0 == 0 || new_size.1 == 0 {
        return;
    }

    config.width = new_size.0;
    config.height = new_size.1;

    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: (u32, u32),
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.0 > 0 && size.1 > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: &[wgpu::TextureFormat], alpha: &[wgpu::CompositeAlphaMode]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            alpha_modes: alpha.to_vec(),
            ..Default::default()
        }
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn eight_bit_format_matching_srgb_preference_wins() {
        use wgpu::TextureFormat as F;
        let c = caps(&[F::Rgba16Float, F::Bgra8Unorm, F::Bgra8UnormSrgb], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(F::Bgra8Unorm));
    }

    #[test]
    fn other_formats_are_used_when_nothing_better_exists() {
        use wgpu::TextureFormat as F;
        let c = caps(&[F::Rgb10a2Unorm, F::Rgba16Float], &[]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Rgb10a2Unorm));
        assert_eq!(choose_surface_format(&caps(&[], &[]), true), None);
    }

    // ── alpha ─────────────────────────────────────────────────────────────

    #[test]
    fn alpha_mode_falls_back_to_opaque_then_first() {
        use wgpu::CompositeAlphaMode as A;
        let c = caps(&[], &[A::PostMultiplied, A::Opaque]);
        assert_eq!(choose_alpha_mode(&c, Some(A::PostMultiplied)), A::PostMultiplied);
        assert_eq!(choose_alpha_mode(&c, Some(A::PreMultiplied)), A::Opaque);
        assert_eq!(choose_alpha_mode(&caps(&[], &[A::Inherit]), None), A::Inherit);
        assert_eq!(choose_alpha_mode(&caps(&[], &[]), None), A::Auto);
    }
}
