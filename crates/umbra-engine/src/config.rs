//! Engine configuration.
//!
//! Plain structs with `Default`; the demo binary overrides individual fields
//! through the builder-style setters on [`EngineConfig`].

use crate::device::GpuInit;
use crate::render::Color;
use crate::window::RuntimeConfig;

/// G-buffer and presentation settings shared by every scene.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Off-screen target width in pixels.
    pub target_width: u32,
    /// Off-screen target height in pixels.
    pub target_height: u32,
    /// Number of color slots in the G-buffer.
    pub target_slots: usize,

    pub color_format: wgpu::TextureFormat,
    pub depth_stencil_format: wgpu::TextureFormat,

    /// Surface clear color used when the current scene stages no final pass.
    pub background: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            target_width: 1920,
            target_height: 1080,
            target_slots: 2,
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            depth_stencil_format: wgpu::TextureFormat::Depth24PlusStencil8,
            background: Color::BLACK,
        }
    }
}

impl RenderSettings {
    /// Width over height of the off-screen targets.
    pub fn aspect(&self) -> f32 {
        self.target_width.max(1) as f32 / self.target_height.max(1) as f32
    }
}

/// Everything `Runtime::run` needs besides the scenes.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub render: RenderSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.runtime.title = title.into();
        self
    }

    pub fn with_window_size(mut self, width: f64, height: f64) -> Self {
        self.runtime.initial_size = winit::dpi::LogicalSize::new(width, height);
        self
    }

    pub fn with_present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.gpu.present_mode = mode;
        self
    }

    pub fn with_targets(mut self, width: u32, height: u32, slots: usize) -> Self {
        self.render.target_width = width;
        self.render.target_height = height;
        self.render.target_slots = slots;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.render.background = color;
        self
    }
}
