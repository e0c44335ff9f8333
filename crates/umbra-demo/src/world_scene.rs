use umbra_engine::core::{DrawCtx, SceneCtx};
use umbra_engine::input::{Key, KeyPhase};
use umbra_engine::render::{DeferredPipeline, DirectionalLight};
use umbra_engine::scene::Scene;
use umbra_engine::time::Clock;
use umbra_engine::world::World;
use umbra_engine::EngineResult;

use crate::camera::OrbitCamera;
use crate::entities::{Cube, Terrain};

/// The shadowed cube-over-terrain scene.
///
/// Escape exits; C toggles the cursor.
#[derive(Default)]
pub struct WorldScene {
    world: World,
    pipeline: DeferredPipeline,
    light: DirectionalLight,
    camera: OrbitCamera,
    cursor_hidden: bool,
}

impl Scene for WorldScene {
    fn initialize(&mut self, _ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
        // Entities survive a revisit.
        if self.world.is_empty() {
            self.world.add(Terrain::default());
            self.world.add(Cube::default());
            self.world.flush();
            log::debug!("world populated: {} entities", self.world.len());
        }
        Ok(())
    }

    fn update(&mut self, clock: &Clock, ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
        let input = ctx.input;

        if input.is_key(Key::Escape, KeyPhase::JustReleased) {
            ctx.exit();
        }
        if input.is_key(Key::C, KeyPhase::JustReleased) {
            self.cursor_hidden = !self.cursor_hidden;
            ctx.set_cursor_visible(!self.cursor_hidden);
        }

        self.camera.update(clock.elapsed(), input.velocity());
        self.world.tick(clock);
        Ok(())
    }

    fn draw(&mut self, ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
        let view_proj = self.camera.view_proj(ctx.settings.aspect());
        self.pipeline.render(ctx, view_proj, &self.light, &self.world)
    }
}
