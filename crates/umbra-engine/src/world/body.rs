use glam::{Mat4, Vec3};

/// Rotation by `|w|` radians about `w`; identity for `w == 0`.
pub fn rotation(w: Vec3) -> Mat4 {
    let angle = w.length();
    if angle == 0.0 {
        return Mat4::IDENTITY;
    }
    Mat4::from_axis_angle(w / angle, angle)
}

/// World transform integrated from linear and angular velocity.
///
/// Each step: `world' = translate(dt * linear) * world * rotate(dt * angular)`.
/// Translation happens in the parent frame, rotation in the local frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DynamicBody {
    pub world: Mat4,
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Default for DynamicBody {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl DynamicBody {
    pub fn new(world: Mat4) -> Self {
        Self {
            world,
            linear: Vec3::ZERO,
            angular: Vec3::ZERO,
        }
    }

    pub fn with_angular(mut self, angular: Vec3) -> Self {
        self.angular = angular;
        self
    }

    pub fn with_linear(mut self, linear: Vec3) -> Self {
        self.linear = linear;
        self
    }

    pub fn integrate(&mut self, dt: f32) {
        self.world =
            Mat4::from_translation(dt * self.linear) * self.world * rotation(dt * self.angular);
    }
}
