//! umbra engine crate.
//!
//! Runtime core of a real-time 3D renderer: a frame scheduler driving a scene
//! state machine, an entity registry with deferred mutation, a resource
//! lifecycle manager and a deferred stencil-shadow pipeline on wgpu.

pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod resource;
pub mod scene;
pub mod time;
pub mod window;
pub mod world;

pub use config::{EngineConfig, RenderSettings};
pub use error::{EngineError, EngineResult};
