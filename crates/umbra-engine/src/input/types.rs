use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps physical key codes into these variants where possible;
/// anything else becomes `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not represented above.
    Unknown(u32),
}

/// Polled state of a key or mouse button.
///
/// `JustPressed` and `JustReleased` last for exactly one frame, then settle
/// into `Pressed` and `Released`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum KeyPhase {
    #[default]
    Released,
    JustPressed,
    Pressed,
    JustReleased,
}

impl KeyPhase {
    /// Phase after a press event arrives.
    pub fn pressed(self) -> Self {
        match self {
            KeyPhase::Released | KeyPhase::JustReleased => KeyPhase::JustPressed,
            held => held,
        }
    }

    /// Phase after a release event arrives.
    pub fn released(self) -> Self {
        match self {
            KeyPhase::Pressed | KeyPhase::JustPressed => KeyPhase::JustReleased,
            up => up,
        }
    }

    /// Phase once the frame that observed a transition has ended.
    pub fn settled(self) -> Self {
        match self {
            KeyPhase::JustPressed => KeyPhase::Pressed,
            KeyPhase::JustReleased => KeyPhase::Released,
            steady => steady,
        }
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, KeyPhase::JustPressed | KeyPhase::Pressed)
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },

    MouseButton { button: MouseButton, pressed: bool },

    /// Cursor position, normalized to `[-1, 1]` on both axes, +y up.
    PointerMoved { x: f32, y: f32 },

    /// Raw relative pointer motion in device units.
    Motion { dx: f32, dy: f32 },

    /// Wheel movement in lines.
    Wheel { lines: f32 },

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
