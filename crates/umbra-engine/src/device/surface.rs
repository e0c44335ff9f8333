//! Surface format selection and reconfiguration.

use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

/// First sRGB format if `prefer_srgb`, otherwise (or failing that) the
/// surface's preferred format.
pub(crate) fn choose_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let srgb = prefer_srgb
        .then(|| formats.iter().copied().find(|f| f.is_srgb()))
        .flatten();
    srgb.or_else(|| formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if supported.contains(&mode) => mode,
        _ => supported
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

/// A minimized window reports a zero size; the surface cannot be
/// configured with it.
pub(crate) fn is_drawable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

/// Reconfigures the surface if the error calls for it and reports what the
/// runtime does with the current frame.
pub(crate) fn recover(
    surface: &wgpu::Surface<'_>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    let action = SurfaceErrorAction::classify(&err);
    match action {
        SurfaceErrorAction::Reconfigured => {
            if is_drawable(PhysicalSize::new(config.width, config.height)) {
                surface.configure(device, config);
            }
            log::debug!("surface reconfigured after: {err}");
        }
        SurfaceErrorAction::SkipFrame => log::debug!("skipping frame: {err}"),
        SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
    }
    action
}
