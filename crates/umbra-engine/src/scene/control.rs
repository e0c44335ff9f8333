use std::any::TypeId;

use crossbeam_channel::{Receiver, Sender};

use super::Scene;

/// Request posted to the scheduler; applied at the next frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    SetScene { id: TypeId, name: &'static str },
    Exit,
}

/// Cloneable, thread-safe handle for steering the scheduler.
///
/// Requests are only queued here; the main thread drains them at frame
/// boundaries, so a background loader never touches scheduler state.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    tx: Sender<SceneRequest>,
}

impl SceneHandle {
    pub(crate) fn channel() -> (Self, Receiver<SceneRequest>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Makes `T` current at the next frame boundary. The last request before
    /// the boundary wins.
    pub fn set_scene<T: Scene>(&self) {
        self.send(SceneRequest::SetScene {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        });
    }

    /// Stops the scheduler after the current frame completes.
    pub fn exit(&self) {
        self.send(SceneRequest::Exit);
    }

    fn send(&self, request: SceneRequest) {
        // The scheduler is gone during teardown; nothing is listening then.
        if self.tx.send(request).is_err() {
            log::debug!("scene request dropped after shutdown: {request:?}");
        }
    }
}
