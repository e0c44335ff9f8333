use glam::Vec2;

/// Per-frame input deltas.
///
/// Motion and wheel accumulate between two `clear` calls so the current
/// frame sees everything that arrived since the previous one.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputFrame {
    /// Raw pointer motion, device units (+x right, +y down).
    pub motion: Vec2,

    /// Wheel movement in lines (+ away from the user).
    pub wheel: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn add_motion(&mut self, dx: f32, dy: f32) {
        self.motion += Vec2::new(dx, dy);
    }

    pub fn add_wheel(&mut self, lines: f32) {
        self.wheel += lines;
    }
}
