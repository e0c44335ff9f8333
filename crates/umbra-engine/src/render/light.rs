use glam::{Mat4, Vec3};

use super::Color;

/// A light at infinity, travelling along `direction`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub ambient: Color,
    pub diffuse: Color,
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            ambient: Color::gray(0.1),
            diffuse: Color::WHITE,
            direction: Vec3::new(-1.0, -1.0, -3.0).normalize(),
        }
    }
}

impl DirectionalLight {
    pub fn new(ambient: Color, diffuse: Color, direction: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Light direction in the local space of an entity placed by `world`.
    ///
    /// Dotting it with a local normal gives the same sign as the world-space
    /// product, including under non-uniform scale.
    pub fn local_direction(&self, world: Mat4) -> Vec3 {
        world.inverse().transform_vector3(self.direction)
    }
}
