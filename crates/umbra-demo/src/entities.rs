use glam::{Mat4, Vec3};
use umbra_engine::render::DrawCall;
use umbra_engine::time::Clock;
use umbra_engine::world::{DynamicBody, Entity, Render, WorldCommands};

use crate::resources::{CubeModel, TerrainModel};

/// Cube floating above the terrain, spinning about +Z.
pub struct Cube {
    body: DynamicBody,
}

impl Default for Cube {
    fn default() -> Self {
        Self {
            body: DynamicBody::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.8)))
                .with_angular(Vec3::Z),
        }
    }
}

impl Render for Cube {
    fn world(&self) -> Mat4 {
        self.body.world
    }

    fn draw(&self, call: &mut DrawCall<'_, '_>) {
        call.model::<CubeModel>();
    }

    fn shape(&self, call: &mut DrawCall<'_, '_>) {
        call.shape::<CubeModel>();
    }
}

impl Entity for Cube {
    fn update(&mut self, clock: &Clock, _commands: &mut WorldCommands) {
        self.body.integrate(clock.elapsed());
    }
}

/// Static ground plane. Receives shadows, casts none.
pub struct Terrain {
    world: Mat4,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            world: Mat4::from_scale(Vec3::splat(10.0)),
        }
    }
}

impl Render for Terrain {
    fn world(&self) -> Mat4 {
        self.world
    }

    fn draw(&self, call: &mut DrawCall<'_, '_>) {
        call.model::<TerrainModel>();
    }
}

impl Entity for Terrain {}
