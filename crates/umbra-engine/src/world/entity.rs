use glam::Mat4;

use crate::render::DrawCall;
use crate::time::Clock;

/// Handle identifying one added entity. Never reused within a world.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Rendering capability: a world transform and two draw entry points.
pub trait Render {
    fn world(&self) -> Mat4;

    /// Full shaded contribution (diffuse pass).
    fn draw(&self, call: &mut DrawCall<'_, '_>) {
        let _ = call;
    }

    /// Geometry only, for the shadow-volume pass.
    fn shape(&self, call: &mut DrawCall<'_, '_>) {
        let _ = call;
    }
}

/// Something that lives in a [`World`].
pub trait Entity: Render + 'static {
    /// Per-tick update. Adds and removes issued through `commands` apply
    /// after every live entity has updated.
    fn update(&mut self, clock: &Clock, commands: &mut WorldCommands) {
        let _ = (clock, commands);
    }
}

/// Deferred construct/destruct queues.
#[derive(Default)]
pub struct WorldCommands {
    next_id: u64,
    pub(super) construct: Vec<(EntityId, Box<dyn Entity>)>,
    pub(super) destruct: Vec<EntityId>,
}

impl WorldCommands {
    /// Queues `entity` for addition and returns its handle.
    pub fn add<E: Entity>(&mut self, entity: E) -> EntityId {
        self.add_boxed(Box::new(entity))
    }

    pub fn add_boxed(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.construct.push((id, entity));
        id
    }

    /// Queues `id` for removal. Unknown ids are ignored when applied.
    pub fn remove(&mut self, id: EntityId) {
        self.destruct.push(id);
    }

    pub fn pending_adds(&self) -> usize {
        self.construct.len()
    }

    pub fn pending_removes(&self) -> usize {
        self.destruct.len()
    }
}
