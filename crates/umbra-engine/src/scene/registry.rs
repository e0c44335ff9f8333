use std::any::TypeId;

use crate::core::{DrawCtx, SceneCtx};
use crate::error::EngineResult;
use crate::time::Clock;

use super::Scene;

struct Entry {
    id: TypeId,
    name: &'static str,
    scene: Box<dyn Scene>,
}

/// Registered scenes plus the current/pending selection.
///
/// Holds at most one instance per concrete type. The first registered scene
/// starts out pending, so the first frame boundary always has something to
/// activate.
#[derive(Default)]
pub struct SceneRegistry {
    entries: Vec<Entry>,
    current: Option<usize>,
    pending: Option<usize>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `scene`. A second instance of the same type is ignored.
    pub fn register<S: Scene>(&mut self, scene: S) -> bool {
        let id = TypeId::of::<S>();
        let name = std::any::type_name::<S>();

        if self.index_of(id).is_some() {
            log::warn!("scene {name} already registered; ignoring duplicate");
            return false;
        }

        self.entries.push(Entry {
            id,
            name,
            scene: Box::new(scene),
        });

        if self.current.is_none() && self.pending.is_none() {
            self.pending = Some(self.entries.len() - 1);
        }

        log::debug!("registered scene {name}");
        true
    }

    pub fn contains<S: Scene>(&self) -> bool {
        self.index_of(TypeId::of::<S>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marks the scene with type id `id` pending, overwriting any earlier
    /// pending choice. Unregistered types are ignored.
    pub fn request(&mut self, id: TypeId, name: &'static str) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.pending = Some(index);
                true
            }
            None => {
                log::debug!("set_scene ignored: {name} is not registered");
                false
            }
        }
    }

    /// Activates the pending scene, if any, and runs its `initialize`.
    ///
    /// Returns whether a swap happened.
    pub fn swap(&mut self, ctx: &mut SceneCtx<'_>) -> EngineResult<bool> {
        let Some(next) = self.pending.take() else {
            return Ok(false);
        };

        if let Some(prev) = self.current {
            log::debug!(
                "scene {} -> {}",
                self.entries[prev].name,
                self.entries[next].name
            );
        } else {
            log::debug!("scene -> {}", self.entries[next].name);
        }

        self.current = Some(next);
        self.entries[next].scene.initialize(ctx)?;
        Ok(true)
    }

    pub fn update(&mut self, clock: &Clock, ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
        match self.current_entry_mut() {
            Some(entry) => entry.scene.update(clock, ctx),
            None => Ok(()),
        }
    }

    pub fn draw(&mut self, ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
        match self.current_entry_mut() {
            Some(entry) => entry.scene.draw(ctx),
            None => Ok(()),
        }
    }

    pub fn current_id(&self) -> Option<TypeId> {
        self.current.map(|i| self.entries[i].id)
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current.map(|i| self.entries[i].name)
    }

    pub fn pending_id(&self) -> Option<TypeId> {
        self.pending.map(|i| self.entries[i].id)
    }

    pub fn is_current<S: Scene>(&self) -> bool {
        self.current_id() == Some(TypeId::of::<S>())
    }

    fn current_entry_mut(&mut self) -> Option<&mut Entry> {
        let index = self.current?;
        self.entries.get_mut(index)
    }

    fn index_of(&self, id: TypeId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}
