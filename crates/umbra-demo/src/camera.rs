use glam::{Mat3, Mat4, Vec3};
use umbra_engine::world::DynamicBody;

const EYE: Vec3 = Vec3::new(5.0, 5.0, 5.0);
const FOV_Y_DEGREES: f32 = 60.0;
const NEAR: f32 = 1.0;
const FAR: f32 = 40.0;

/// Radians per second of spin per device unit of mouse motion.
const SENSITIVITY: f32 = 0.01;
/// How fast the spin decays without input, per second.
const DAMPING: f32 = 10.0;

/// Orbit camera around the world origin.
///
/// The body's world matrix is the view transform; spinning it in local space
/// orbits the eye around the origin.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    body: DynamicBody,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            body: DynamicBody::new(Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Z)),
        }
    }
}

impl OrbitCamera {
    pub fn view(&self) -> Mat4 {
        self.body.world
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR, FAR);
        proj * self.view()
    }

    /// Steers the spin toward the mouse velocity `(dx, dy, wheel)` and
    /// integrates one step.
    pub fn update(&mut self, dt: f32, velocity: Vec3) {
        let accel = -Vec3::new(velocity.y, velocity.x, 0.0) * SENSITIVITY;
        let to_local = Mat3::from_mat4(self.body.world).transpose();

        let angular = self.body.angular;
        self.body.angular += dt * (2.0 * (to_local * accel) - DAMPING * angular);
        self.body.integrate(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Camera position in world space.
    fn eye(cam: &OrbitCamera) -> Vec3 {
        cam.view().inverse().transform_point3(Vec3::ZERO)
    }

    #[test]
    fn starts_looking_at_origin_from_eye() {
        let cam = OrbitCamera::default();
        assert!((eye(&cam) - EYE).length() < 1e-4);

        let center = cam.view_proj(16.0 / 9.0).project_point3(Vec3::ZERO);
        assert!(center.x.abs() < 1e-5 && center.y.abs() < 1e-5);
    }

    #[test]
    fn spin_decays_without_input() {
        let mut cam = OrbitCamera::default();
        cam.update(0.016, Vec3::new(50.0, 0.0, 0.0));
        let spun = cam.body.angular.length();
        assert!(spun > 0.0);

        for _ in 0..200 {
            cam.update(0.016, Vec3::ZERO);
        }
        assert!(cam.body.angular.length() < spun * 1e-3);
    }

    #[test]
    fn orbiting_keeps_distance_to_origin() {
        let mut cam = OrbitCamera::default();
        for _ in 0..30 {
            cam.update(0.016, Vec3::new(20.0, -10.0, 0.0));
        }
        assert!((eye(&cam).length() - EYE.length()).abs() < 1e-3);
    }
}
