//! Resource lifecycle.
//!
//! - [`Resource`]: load/unload contract; [`Managed`] makes both idempotent and
//!   unloads on drop.
//! - [`ResourceManifest`]: startup-time registration list, tagged priority or
//!   bulk; [`ResourceRegistry::gather`] instantiates each type once.
//! - [`LoadingScene`]: priority pass on the main thread, bulk pass on one
//!   background worker, then a switch to the next scene.
//! - [`GpuTasks`]: GPU object creation marshaled back to the main thread;
//!   results land in [`Assets`].

mod assets;
mod loader;
mod managed;
mod manifest;
mod tasks;

pub use assets::Assets;
pub use loader::LoadingScene;
pub use managed::{AnyManaged, LoadState, Managed, Resource};
pub use manifest::{LoadTag, ResourceManifest, ResourceRegistry};
pub use tasks::{GpuTask, GpuTaskQueue, GpuTasks, LoadCtx, UploadCtx};
