//! Scene state machine.
//!
//! Every scene type is registered once, up front, and lives until the
//! scheduler is dropped. Exactly one scene is current; a request for another
//! type marks it pending and the scheduler swaps it in at the next frame
//! boundary, calling `initialize` once per activation.

mod control;
mod registry;

pub use control::{SceneHandle, SceneRequest};
pub use registry::SceneRegistry;

use crate::core::{DrawCtx, SceneCtx};
use crate::error::EngineResult;
use crate::time::Clock;

/// A scene driven by the scheduler.
///
/// `update` and `draw` are called exactly once per frame while the scene is
/// current. Fields survive deactivation; only `initialize` runs again when
/// the scene becomes current a second time.
pub trait Scene: 'static {
    /// Called once each time the scene becomes current.
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
        let _ = ctx;
        Ok(())
    }

    fn update(&mut self, clock: &Clock, ctx: &mut SceneCtx<'_>) -> EngineResult<()>;

    /// Records this frame's off-screen passes and optionally stages the final
    /// full-screen pass through `ctx.stage_final_pass`.
    fn draw(&mut self, ctx: &mut DrawCtx<'_>) -> EngineResult<()>;
}
