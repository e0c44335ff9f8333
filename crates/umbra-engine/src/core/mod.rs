//! Frame scheduler and the contexts it lends to scenes.
//!
//! The scheduler owns the scene registry, the clock and the two cross-thread
//! queues (scene requests, GPU tasks). `window::Runtime` drives it once per
//! redraw; everything here is usable without a window or GPU.

mod active;
mod ctx;
mod scheduler;

pub use active::ActiveInstance;
pub use ctx::{DrawCtx, SceneCtx, WindowRequests};
pub use scheduler::Scheduler;

#[cfg(test)]
pub(crate) use ctx::test_support;
