//! GPU device + surface management.
//!
//! [`Gpu`] owns the adapter, device, queue and window surface. It never
//! leaves the main thread; resource loads running elsewhere create GPU
//! objects through `resource::GpuTasks`.

mod context;
mod error;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use error::SurfaceErrorAction;
pub use init::GpuInit;
