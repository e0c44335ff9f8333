//! Frame timing.
//!
//! One `Clock` per scheduler. The scheduler advances it exactly once per frame,
//! after the frame has been presented; everything else only reads it.

mod clock;

pub use clock::Clock;
