//! Entity registry.
//!
//! A [`World`] owns the live entity list plus deferred construct/destruct
//! queues. Mutations requested while entities update are applied after the
//! update loop, so the list being iterated never changes mid-tick.

mod body;
mod entity;
mod registry;

pub use body::{rotation, DynamicBody};
pub use entity::{Entity, EntityId, Render, WorldCommands};
pub use registry::World;
