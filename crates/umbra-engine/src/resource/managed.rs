use std::any::Any;

use super::LoadCtx;

/// A loadable resource.
///
/// `load` may run on the background worker. It prepares CPU data and queues
/// GPU object creation through `ctx.gpu(..)`; `unload` queues the matching
/// removal.
pub trait Resource: Send + 'static {
    fn load(&mut self, ctx: &mut LoadCtx) -> anyhow::Result<()>;

    fn unload(&mut self, ctx: &mut LoadCtx);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadState {
    Unloaded,
    Loaded,
}

/// Owns a resource and tracks its load state.
///
/// `load` and `unload` are idempotent. Dropping a loaded `Managed` unloads it.
pub struct Managed<R: Resource> {
    resource: R,
    state: LoadState,
    ctx: LoadCtx,
}

impl<R: Resource> Managed<R> {
    pub fn new(resource: R, ctx: LoadCtx) -> Self {
        Self {
            resource,
            state: LoadState::Unloaded,
            ctx,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Runs the load body unless already loaded. A failed load leaves the
    /// resource unloaded.
    pub fn load(&mut self) -> anyhow::Result<()> {
        if self.state == LoadState::Loaded {
            return Ok(());
        }

        self.resource.load(&mut self.ctx)?;
        self.state = LoadState::Loaded;
        log::debug!("loaded {}", std::any::type_name::<R>());
        Ok(())
    }

    /// Runs the unload body unless already unloaded.
    pub fn unload(&mut self) {
        if self.state == LoadState::Unloaded {
            return;
        }

        self.resource.unload(&mut self.ctx);
        self.state = LoadState::Unloaded;
        log::debug!("unloaded {}", std::any::type_name::<R>());
    }

    pub fn get(&self) -> &R {
        &self.resource
    }
}

impl<R: Resource> Drop for Managed<R> {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Type-erased [`Managed`], as stored in a `ResourceRegistry`.
pub trait AnyManaged: Send {
    fn name(&self) -> &'static str;
    fn state(&self) -> LoadState;
    fn load(&mut self) -> anyhow::Result<()>;
    fn unload(&mut self);
    fn as_any(&self) -> &dyn Any;
}

impl<R: Resource> AnyManaged for Managed<R> {
    fn name(&self) -> &'static str {
        std::any::type_name::<R>()
    }

    fn state(&self) -> LoadState {
        self.state
    }

    fn load(&mut self) -> anyhow::Result<()> {
        Managed::load(self)
    }

    fn unload(&mut self) {
        Managed::unload(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::resource::GpuTasks;

    #[derive(Default)]
    struct Counted {
        loads: Arc<AtomicUsize>,
        unloads: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Resource for Counted {
        fn load(&mut self, ctx: &mut LoadCtx) -> anyhow::Result<()> {
            anyhow::ensure!(!self.fail, "refusing to load");
            self.loads.fetch_add(1, Ordering::SeqCst);
            ctx.gpu("counted upload", |_| Ok(()));
            Ok(())
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {
            self.unloads.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn managed(fail: bool) -> (Managed<Counted>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let (tasks, _queue) = GpuTasks::channel();

        let loads = Arc::new(AtomicUsize::new(0));
        let unloads = Arc::new(AtomicUsize::new(0));
        let r = Counted {
            loads: loads.clone(),
            unloads: unloads.clone(),
            fail,
        };
        (Managed::new(r, LoadCtx::new(tasks)), loads, unloads)
    }

    #[test]
    fn load_twice_runs_body_once() {
        let (mut m, loads, _) = managed(false);
        m.load().unwrap();
        m.load().unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(m.state(), LoadState::Loaded);
    }

    #[test]
    fn unload_twice_runs_teardown_once() {
        let (mut m, _, unloads) = managed(false);
        m.load().unwrap();
        m.unload();
        m.unload();
        assert_eq!(unloads.load(Ordering::SeqCst), 1);
        assert_eq!(m.state(), LoadState::Unloaded);
    }

    #[test]
    fn unload_before_load_is_a_no_op() {
        let (mut m, _, unloads) = managed(false);
        m.unload();
        assert_eq!(unloads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reload_after_unload_runs_body_again() {
        let (mut m, loads, _) = managed(false);
        m.load().unwrap();
        m.unload();
        m.load().unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn drop_unloads_loaded_resource() {
        let (mut m, _, unloads) = managed(false);
        m.load().unwrap();
        drop(m);
        assert_eq!(unloads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_of_unloaded_resource_runs_no_teardown() {
        let (m, _, unloads) = managed(false);
        drop(m);
        assert_eq!(unloads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_load_stays_unloaded() {
        let (mut m, loads, unloads) = managed(true);
        assert!(m.load().is_err());
        assert_eq!(m.state(), LoadState::Unloaded);
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        drop(m);
        assert_eq!(unloads.load(Ordering::SeqCst), 0);
    }
}
