use anyhow::Context;
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{
    DeviceEvent, DeviceId, ElementState, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::EngineConfig;
use crate::core::{DrawCtx, Scheduler};
use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::{EngineError, EngineResult};
use crate::input::{InputEvent, InputState, Key, MouseButton};
use crate::render::finish_surface;
use crate::resource::{Assets, UploadCtx};

/// Pixel wheel deltas are divided by this to get lines.
const PIXELS_PER_LINE: f32 = 20.0;

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `scheduler` until a scene exits or the window closes.
    ///
    /// Returns `Ok(())` without doing anything if another scheduler is
    /// already running in this process.
    pub fn run(config: EngineConfig, mut scheduler: Scheduler) -> EngineResult<()> {
        if !scheduler.begin() {
            return Ok(());
        }

        let event_loop = match EventLoop::new().context("failed to create winit EventLoop") {
            Ok(event_loop) => event_loop,
            Err(e) => {
                scheduler.end();
                return Err(EngineError::Setup(e));
            }
        };

        let mut state = AppState::new(config, scheduler);
        let result = event_loop.run_app(&mut state);

        state.teardown();

        result?;
        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: EngineConfig,
    scheduler: Scheduler,

    input: InputState,
    assets: Assets,

    entry: Option<WindowEntry>,
    error: Option<EngineError>,
}

impl AppState {
    fn new(config: EngineConfig, scheduler: Scheduler) -> Self {
        Self {
            config,
            scheduler,
            input: InputState::default(),
            assets: Assets::new(),
            entry: None,
            error: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<WindowEntry> {
        let runtime = &self.config.runtime;
        let attrs = Window::default_attributes()
            .with_title(runtime.title.clone())
            .with_inner_size(runtime.initial_size)
            .with_visible(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;
        entry.borrow_gpu().check_target_formats(&self.config.render)?;

        entry.borrow_window().set_visible(true);
        Ok(entry)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        log::error!("{err}");
        self.error.get_or_insert(err);
        self.scheduler.exit();
        event_loop.exit();
    }

    /// Stops the clock, hides the window and releases the scheduler guard.
    fn teardown(&mut self) {
        if let Some(entry) = &self.entry {
            entry.borrow_window().set_visible(false);
        }
        self.scheduler.end();
        self.entry = None;
    }

    /// One scheduler iteration: requests, GPU tasks, surface, swap, update,
    /// draw, final pass, present, clock.
    ///
    /// The surface is acquired before any scene code runs. A frame that
    /// cannot get one is skipped whole, so update and draw stay paired.
    fn frame(&mut self) -> EngineResult<()> {
        let Self {
            config,
            scheduler,
            input,
            assets,
            entry,
            ..
        } = self;
        let Some(entry) = entry.as_mut() else {
            return Ok(());
        };
        let settings = &config.render;

        if !scheduler.begin_frame() {
            return Ok(());
        }

        {
            let gpu = entry.borrow_gpu();
            let mut upload = UploadCtx {
                device: gpu.device(),
                queue: gpu.queue(),
                assets: &mut *assets,
            };
            scheduler.drain_gpu_tasks(&mut upload)?;
        }

        let acquired = entry.borrow_gpu().begin_frame();
        let mut frame = match acquired {
            Ok(frame) => frame,
            Err(err) => {
                match entry.with_gpu_mut(|gpu| gpu.handle_surface_error(err)) {
                    SurfaceErrorAction::Fatal => {
                        return Err(EngineError::Setup(anyhow::anyhow!(
                            "surface acquisition failed: out of memory"
                        )));
                    }
                    action => log::debug!("frame skipped: {action:?}"),
                }
                return Ok(());
            }
        };

        scheduler.swap(input, settings)?;
        scheduler.update(input, settings)?;

        if let Some(visible) = scheduler.take_window_requests().cursor_visible {
            entry.borrow_window().set_cursor_visible(visible);
        }

        let gpu = entry.borrow_gpu();
        let surface_format = gpu.surface_format();

        let staged = {
            let mut ctx = DrawCtx::new(
                gpu.device(),
                gpu.queue(),
                &mut frame.encoder,
                surface_format,
                settings,
                assets,
            );
            scheduler.draw(&mut ctx)?;
            ctx.take_final_pass()
        };

        finish_surface(
            &mut frame.encoder,
            &frame.view,
            surface_format,
            staged.as_deref(),
            settings.background,
        );
        gpu.present(frame);

        input.end_frame();
        scheduler.end_frame();
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.borrow_window().request_redraw();
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, EngineError::Setup(e)),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.scheduler.is_active() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.borrow_window().request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.apply_event(InputEvent::Motion {
                dx: dx as f32,
                dy: dy as f32,
            });
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        if let Some(ev) = translate_input_event(entry.borrow_gpu().size(), &event) {
            self.input.apply_event(ev);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::debug!("window close requested");
                self.scheduler.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.borrow_window().request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.borrow_window().inner_size();
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.borrow_window().request_redraw();
            }

            WindowEvent::RedrawRequested => {
                // Exit requested during the previous iteration.
                if !self.scheduler.is_active() {
                    event_loop.exit();
                    return;
                }

                if let Err(err) = self.frame() {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }
}

fn translate_input_event(size: PhysicalSize<u32>, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = normalize_cursor(*position, size);
            Some(InputEvent::PointerMoved { x, y })
        }

        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::MouseButton {
            button: map_mouse_button(*button),
            pressed: *state == ElementState::Pressed,
        }),

        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
            lines: wheel_lines(*delta),
        }),

        WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key {
            key: map_key(event.physical_key),
            pressed: event.state == ElementState::Pressed,
        }),

        _ => None,
    }
}

/// Maps a cursor position in physical pixels to `[-1, 1]` on both axes, +y up.
fn normalize_cursor(pos: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> (f32, f32) {
    let w = f64::from(size.width.max(1));
    let h = f64::from(size.height.max(1));
    let x = 2.0 * pos.x / w - 1.0;
    let y = 1.0 - 2.0 * pos.y / h;
    (x as f32, y as f32)
}

fn wheel_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── cursor ────────────────────────────────────────────────────────────

    #[test]
    fn cursor_corners_map_to_unit_square_with_y_up() {
        let size = PhysicalSize::new(800, 600);

        assert_eq!(normalize_cursor(PhysicalPosition::new(0.0, 0.0), size), (-1.0, 1.0));
        assert_eq!(normalize_cursor(PhysicalPosition::new(800.0, 600.0), size), (1.0, -1.0));
        assert_eq!(normalize_cursor(PhysicalPosition::new(400.0, 300.0), size), (0.0, 0.0));
    }

    #[test]
    fn zero_sized_window_does_not_divide_by_zero() {
        let (x, y) = normalize_cursor(PhysicalPosition::new(0.0, 0.0), PhysicalSize::new(0, 0));
        assert!(x.is_finite() && y.is_finite());
    }

    // ── wheel ─────────────────────────────────────────────────────────────

    #[test]
    fn pixel_wheel_deltas_are_scaled_to_lines() {
        assert_eq!(wheel_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        assert_eq!(
            wheel_lines(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0))),
            -2.0
        );
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn physical_keys_map_to_engine_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)), Key::Shift);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::NumLock)), Key::Unknown(_)));
    }
}
