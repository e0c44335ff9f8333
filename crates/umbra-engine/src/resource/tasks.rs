use crossbeam_channel::{Receiver, Sender};

use crate::error::{EngineError, EngineResult};

use super::Assets;

/// Main-thread view of the GPU handed to queued tasks.
pub struct UploadCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub assets: &'a mut Assets,
}

type TaskFn = Box<dyn FnOnce(&mut UploadCtx<'_>) -> anyhow::Result<()> + Send>;

/// A unit of GPU work created off the main thread.
pub struct GpuTask {
    label: &'static str,
    run: TaskFn,
}

impl GpuTask {
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl std::fmt::Debug for GpuTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuTask").field("label", &self.label).finish()
    }
}

/// Sending half of the GPU task queue. Cheap to clone, `Send`.
#[derive(Debug, Clone)]
pub struct GpuTasks {
    tx: Sender<GpuTask>,
}

impl GpuTasks {
    pub fn channel() -> (Self, GpuTaskQueue) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, GpuTaskQueue { rx })
    }

    /// Queues `f` to run on the main thread before the next scene swap.
    pub fn push<F>(&self, label: &'static str, f: F)
    where
        F: FnOnce(&mut UploadCtx<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        let task = GpuTask {
            label,
            run: Box::new(f),
        };
        if self.tx.send(task).is_err() {
            log::debug!("gpu task `{label}` dropped after shutdown");
        }
    }
}

/// Receiving half, owned by the scheduler.
#[derive(Debug)]
pub struct GpuTaskQueue {
    rx: Receiver<GpuTask>,
}

impl GpuTaskQueue {
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Runs every queued task in send order. Stops at the first failure.
    pub fn drain(&self, upload: &mut UploadCtx<'_>) -> EngineResult<usize> {
        let mut ran = 0;
        for task in self.rx.try_iter() {
            let GpuTask { label, run } = task;
            run(upload).map_err(|source| EngineError::Resource {
                name: label,
                source,
            })?;
            ran += 1;
        }
        if ran > 0 {
            log::debug!("ran {ran} gpu task(s)");
        }
        Ok(ran)
    }

    /// Removes queued tasks without running them, returning their labels.
    pub fn discard(&self) -> Vec<&'static str> {
        self.rx.try_iter().map(|t| t.label).collect()
    }
}

/// Context passed to `Resource::load` and `Resource::unload`.
///
/// Loads may run on the background worker; anything that creates GPU objects
/// goes through [`LoadCtx::gpu`].
#[derive(Debug, Clone)]
pub struct LoadCtx {
    tasks: GpuTasks,
}

impl LoadCtx {
    pub fn new(tasks: GpuTasks) -> Self {
        Self { tasks }
    }

    pub fn gpu<F>(&self, label: &'static str, f: F)
    where
        F: FnOnce(&mut UploadCtx<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        self.tasks.push(label, f);
    }

    pub fn tasks(&self) -> &GpuTasks {
        &self.tasks
    }
}
