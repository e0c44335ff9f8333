//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single engine window, wires them to the
//! GPU layer and drives `core::Scheduler` once per redraw.

mod runtime;

use winit::dpi::LogicalSize;

pub use runtime::Runtime;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "umbra".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}
