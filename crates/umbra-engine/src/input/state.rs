use std::collections::HashMap;

use glam::{Vec2, Vec3};

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyPhase, MouseButton};

/// Current input state for the engine window.
///
/// Scenes poll it read-only during `update`. Phases change when events are
/// applied and settle in `end_frame`.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashMap<Key, KeyPhase>,
    buttons: HashMap<MouseButton, KeyPhase>,

    /// Normalized cursor position, `[-1, 1]`, +y up.
    position: Vec2,

    focused: bool,
    /// Set on focus gain; the next `end_frame` drops stale motion.
    regained_focus: bool,

    frame: InputFrame,
}

impl InputState {
    /// Applies a platform-agnostic event.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => {
                let phase = self.keys.entry(key).or_default();
                *phase = if pressed { phase.pressed() } else { phase.released() };
            }

            InputEvent::MouseButton { button, pressed } => {
                let phase = self.buttons.entry(button).or_default();
                *phase = if pressed { phase.pressed() } else { phase.released() };
            }

            InputEvent::PointerMoved { x, y } => {
                self.position = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
            }

            InputEvent::Motion { dx, dy } => {
                if self.focused {
                    self.frame.add_motion(dx, dy);
                }
            }

            InputEvent::Wheel { lines } => {
                self.frame.add_wheel(lines);
            }

            InputEvent::Focused(focused) => {
                self.focused = focused;
                if focused {
                    self.regained_focus = true;
                } else {
                    // Avoids stuck keys when focus changes mid-press.
                    self.keys.clear();
                    self.buttons.clear();
                    self.frame.clear();
                }
            }
        }
    }

    /// Settles one-frame phases and clears per-frame deltas.
    pub fn end_frame(&mut self) {
        for phase in self.keys.values_mut() {
            *phase = phase.settled();
        }
        for phase in self.buttons.values_mut() {
            *phase = phase.settled();
        }

        self.frame.clear();
        self.regained_focus = false;
    }

    pub fn key(&self, key: Key) -> KeyPhase {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    #[inline]
    pub fn is_key(&self, key: Key, phase: KeyPhase) -> bool {
        self.key(key) == phase
    }

    pub fn button(&self, button: MouseButton) -> KeyPhase {
        self.buttons.get(&button).copied().unwrap_or_default()
    }

    #[inline]
    pub fn is_button(&self, button: MouseButton, phase: KeyPhase) -> bool {
        self.button(button) == phase
    }

    /// Normalized cursor position; the z component carries nothing.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Pointer velocity for this frame: `(dx, dy, wheel)`.
    ///
    /// Zero on the frame focus was regained, so a window switch does not
    /// read as a large jump.
    pub fn velocity(&self) -> Vec3 {
        if self.regained_focus {
            return Vec3::ZERO;
        }
        Vec3::new(self.frame.motion.x, self.frame.motion.y, self.frame.wheel)
    }

    #[inline]
    pub fn focused(&self) -> bool {
        self.focused
    }
}
