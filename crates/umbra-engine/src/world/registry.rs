use crate::time::Clock;

use super::entity::{Entity, EntityId, WorldCommands};

/// Live entities plus deferred mutations.
///
/// A tick:
/// 1. remove entities queued for destruction,
/// 2. update every live entity in list order,
/// 3. apply removals requested during step 2, then append queued additions,
/// 4. leave both queues empty.
///
/// A removal always wins over a queued addition of the same entity.
#[derive(Default)]
pub struct World {
    live: Vec<(EntityId, Box<dyn Entity>)>,
    commands: WorldCommands,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `entity`; it becomes live at the end of the next tick or flush.
    pub fn add<E: Entity>(&mut self, entity: E) -> EntityId {
        self.commands.add(entity)
    }

    pub fn remove(&mut self, id: EntityId) {
        self.commands.remove(id);
    }

    pub fn commands(&mut self) -> &mut WorldCommands {
        &mut self.commands
    }

    pub fn tick(&mut self, clock: &Clock) {
        self.apply_destructs();

        for (_, entity) in self.live.iter_mut() {
            entity.update(clock, &mut self.commands);
        }

        self.apply_destructs();
        self.live.append(&mut self.commands.construct);
    }

    /// Applies queued mutations without updating anything.
    pub fn flush(&mut self) {
        self.apply_destructs();
        self.live.append(&mut self.commands.construct);
    }

    /// Drops every live and queued entity.
    pub fn clear(&mut self) {
        self.live.clear();
        self.commands.construct.clear();
        self.commands.destruct.clear();
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.live.iter().any(|(e, _)| *e == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().map(|(id, _)| *id)
    }

    /// Live entities in list order. Queued additions are not included.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Entity + 'static)> + '_ {
        self.live.iter().map(|(_, e)| e.as_ref())
    }

    fn apply_destructs(&mut self) {
        if self.commands.destruct.is_empty() {
            return;
        }

        let destruct = std::mem::take(&mut self.commands.destruct);
        self.live.retain(|(id, _)| !destruct.contains(id));
        self.commands
            .construct
            .retain(|(id, _)| !destruct.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Mat4;

    use super::*;
    use crate::world::Render;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Logs each update; optionally adds or removes once.
    struct Probe {
        name: &'static str,
        log: Log,
        spawn: Option<&'static str>,
        kill: Rc<Cell<Option<EntityId>>>,
    }

    impl Probe {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                spawn: None,
                kill: Rc::default(),
            }
        }
    }

    impl Render for Probe {
        fn world(&self) -> Mat4 {
            Mat4::IDENTITY
        }
    }

    impl Entity for Probe {
        fn update(&mut self, _clock: &Clock, commands: &mut WorldCommands) {
            self.log.borrow_mut().push(self.name);
            if let Some(name) = self.spawn.take() {
                commands.add(Probe::new(name, &self.log));
            }
            if let Some(id) = self.kill.take() {
                commands.remove(id);
            }
        }
    }

    fn tick(world: &mut World) {
        world.tick(&Clock::new());
    }

    // ── deferred construction ─────────────────────────────────────────────

    #[test]
    fn added_entity_is_not_live_until_tick_ends() {
        let log = Log::default();
        let mut w = World::new();
        let id = w.add(Probe::new("a", &log));

        assert!(!w.contains(id));
        tick(&mut w);

        // Appended after the update step, so not updated yet.
        assert!(w.contains(id));
        assert!(log.borrow().is_empty());

        tick(&mut w);
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn add_during_update_takes_effect_next_tick() {
        let log = Log::default();
        let mut w = World::new();
        let mut parent = Probe::new("parent", &log);
        parent.spawn = Some("child");
        w.add(parent);
        w.flush();

        tick(&mut w);
        assert_eq!(*log.borrow(), vec!["parent"]);
        assert_eq!(w.len(), 2);

        tick(&mut w);
        assert_eq!(*log.borrow(), vec!["parent", "parent", "child"]);
    }

    // ── deferred destruction ──────────────────────────────────────────────

    #[test]
    fn removed_sibling_later_in_list_still_updates_this_tick() {
        let log = Log::default();
        let mut w = World::new();

        let killer = Probe::new("killer", &log);
        let target = killer.kill.clone();
        w.add(killer);
        let victim = w.add(Probe::new("victim", &log));
        target.set(Some(victim));
        w.flush();

        tick(&mut w);
        assert_eq!(*log.borrow(), vec!["killer", "victim"]);
        assert!(!w.contains(victim));
        assert_eq!(w.len(), 1);

        tick(&mut w);
        assert_eq!(*log.borrow(), vec!["killer", "victim", "killer"]);
    }

    #[test]
    fn remove_during_update_cancels_queued_add() {
        let log = Log::default();
        let mut w = World::new();

        let killer = Probe::new("killer", &log);
        let target = killer.kill.clone();
        w.add(killer);
        w.flush();

        let ghost = w.add(Probe::new("ghost", &log));
        target.set(Some(ghost));

        tick(&mut w);
        assert!(!w.contains(ghost));
        assert_eq!(w.len(), 1);
        assert_eq!(*log.borrow(), vec!["killer"]);
    }

    #[test]
    fn remove_before_tick_skips_update() {
        let log = Log::default();
        let mut w = World::new();
        let id = w.add(Probe::new("gone", &log));
        w.flush();

        w.remove(id);
        tick(&mut w);
        assert!(log.borrow().is_empty());
        assert!(w.is_empty());
    }

    #[test]
    fn add_then_remove_in_same_tick_never_appears() {
        let log = Log::default();
        let mut w = World::new();
        let id = w.add(Probe::new("ghost", &log));
        w.remove(id);

        tick(&mut w);
        assert!(!w.contains(id));
        assert!(w.is_empty());
    }

    #[test]
    fn queues_are_empty_after_tick() {
        let log = Log::default();
        let mut w = World::new();
        let a = w.add(Probe::new("a", &log));
        let b = w.add(Probe::new("b", &log));
        w.remove(b);
        tick(&mut w);

        assert!(w.contains(a));
        assert_eq!(w.commands().pending_adds(), 0);
        assert_eq!(w.commands().pending_removes(), 0);
    }

    #[test]
    fn ids_are_not_reused() {
        let log = Log::default();
        let mut w = World::new();
        let a = w.add(Probe::new("a", &log));
        w.remove(a);
        tick(&mut w);

        let b = w.add(Probe::new("b", &log));
        assert_ne!(a, b);
    }

    #[test]
    fn flush_does_not_update() {
        let log = Log::default();
        let mut w = World::new();
        w.add(Probe::new("a", &log));
        w.flush();
        assert_eq!(w.len(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn clear_drops_live_and_queued() {
        let log = Log::default();
        let mut w = World::new();
        w.add(Probe::new("a", &log));
        w.flush();
        w.add(Probe::new("b", &log));
        w.clear();
        w.flush();
        assert!(w.is_empty());
    }
}
