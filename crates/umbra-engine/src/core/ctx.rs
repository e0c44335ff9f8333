use std::sync::Arc;

use crate::config::RenderSettings;
use crate::input::InputState;
use crate::render::FinalPass;
use crate::resource::{Assets, GpuTasks, LoadCtx};
use crate::scene::{Scene, SceneHandle};

/// Window changes requested by a scene; applied by the runtime after `update`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequests {
    pub cursor_visible: Option<bool>,
}

/// CPU-side context for `Scene::initialize` and `Scene::update`.
///
/// Holds no GPU objects; GPU work is queued through [`LoadCtx`].
pub struct SceneCtx<'a> {
    pub input: &'a InputState,
    pub settings: &'a RenderSettings,

    handle: &'a SceneHandle,
    tasks: &'a GpuTasks,
    window: &'a mut WindowRequests,
}

impl<'a> SceneCtx<'a> {
    pub(crate) fn new(
        input: &'a InputState,
        settings: &'a RenderSettings,
        handle: &'a SceneHandle,
        tasks: &'a GpuTasks,
        window: &'a mut WindowRequests,
    ) -> Self {
        Self {
            input,
            settings,
            handle,
            tasks,
            window,
        }
    }

    /// Handle that can be moved to other threads.
    pub fn scenes(&self) -> &SceneHandle {
        self.handle
    }

    pub fn set_scene<T: Scene>(&self) {
        self.handle.set_scene::<T>();
    }

    pub fn exit(&self) {
        self.handle.exit();
    }

    /// Context for loading resources from this or another thread.
    pub fn load_ctx(&self) -> LoadCtx {
        LoadCtx::new(self.tasks.clone())
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.window.cursor_visible = Some(visible);
    }
}

/// GPU-side context for `Scene::draw`.
///
/// Lives for one frame. The encoder is submitted by the runtime together with
/// the final full-screen pass.
pub struct DrawCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub surface_format: wgpu::TextureFormat,
    pub settings: &'a RenderSettings,
    pub assets: &'a Assets,

    final_pass: Option<Arc<FinalPass>>,
}

impl<'a> DrawCtx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        encoder: &'a mut wgpu::CommandEncoder,
        surface_format: wgpu::TextureFormat,
        settings: &'a RenderSettings,
        assets: &'a Assets,
    ) -> Self {
        Self {
            device,
            queue,
            encoder,
            surface_format,
            settings,
            assets,
            final_pass: None,
        }
    }

    /// Stages the full-screen pass the runtime issues into the surface.
    /// A later call replaces an earlier one.
    pub fn stage_final_pass(&mut self, pass: Arc<FinalPass>) {
        self.final_pass = Some(pass);
    }

    pub(crate) fn take_final_pass(&mut self) -> Option<Arc<FinalPass>> {
        self.final_pass.take()
    }
}
