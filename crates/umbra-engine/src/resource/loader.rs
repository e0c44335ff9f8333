use std::marker::PhantomData;
use std::thread::JoinHandle;

use crate::core::{DrawCtx, SceneCtx};
use crate::error::{EngineError, EngineResult};
use crate::scene::Scene;
use crate::time::Clock;

use super::{LoadTag, ResourceManifest, ResourceRegistry};

const WORKER_NAME: &str = "umbra-loader";

/// Error carried back from the worker thread.
struct BulkFailure {
    name: &'static str,
    source: anyhow::Error,
}

type BulkResult = Result<ResourceRegistry, BulkFailure>;

enum BulkState {
    Idle,
    Loading(JoinHandle<BulkResult>),
    Done(ResourceRegistry),
}

/// Placeholder scene that loads resources, then hands over to `Next`.
///
/// On `initialize` the priority pass runs synchronously. The bulk pass then
/// runs on one background thread, which owns its registry until it finishes
/// and requests `set_scene::<Next>()`. That request is the only thing that
/// moves the scheduler on.
pub struct LoadingScene<Next: Scene> {
    manifest: ResourceManifest,
    priority: ResourceRegistry,
    bulk: BulkState,
    _next: PhantomData<fn() -> Next>,
}

impl<Next: Scene> LoadingScene<Next> {
    pub fn new(manifest: ResourceManifest) -> Self {
        Self {
            manifest,
            priority: ResourceRegistry::new(),
            bulk: BulkState::Idle,
            _next: PhantomData,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.bulk, BulkState::Loading(_))
    }

    pub fn priority(&self) -> &ResourceRegistry {
        &self.priority
    }

    /// Bulk resources, once the worker has been joined.
    pub fn bulk(&self) -> Option<&ResourceRegistry> {
        match &self.bulk {
            BulkState::Done(registry) => Some(registry),
            _ => None,
        }
    }

    /// Blocks until the worker finishes and takes its registry.
    pub fn finish(&mut self) -> EngineResult<()> {
        self.collect(true)
    }

    fn collect(&mut self, block: bool) -> EngineResult<()> {
        let finished = match &self.bulk {
            BulkState::Loading(handle) => block || handle.is_finished(),
            _ => false,
        };
        if !finished {
            return Ok(());
        }

        let BulkState::Loading(handle) = std::mem::replace(&mut self.bulk, BulkState::Idle) else {
            return Ok(());
        };

        match handle.join() {
            Ok(Ok(registry)) => {
                log::info!("bulk pass finished: {} resource(s)", registry.len());
                self.bulk = BulkState::Done(registry);
                Ok(())
            }
            Ok(Err(BulkFailure { name, source })) => Err(EngineError::Resource { name, source }),
            Err(_) => Err(EngineError::Resource {
                name: WORKER_NAME,
                source: anyhow::anyhow!("loader thread panicked"),
            }),
        }
    }

    fn spawn_bulk(&mut self, ctx: &SceneCtx<'_>) -> EngineResult<()> {
        let manifest = self.manifest.clone();
        let load = ctx.load_ctx();
        let scenes = ctx.scenes().clone();

        let handle = std::thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || -> BulkResult {
                let mut registry = ResourceRegistry::new();
                registry
                    .load_all(&manifest, LoadTag::Bulk, &load)
                    .map_err(|err| match err {
                        EngineError::Resource { name, source } => BulkFailure { name, source },
                        other => BulkFailure {
                            name: WORKER_NAME,
                            source: anyhow::anyhow!(other.to_string()),
                        },
                    })?;

                scenes.set_scene::<Next>();
                Ok(registry)
            })
            .map_err(|e| EngineError::Resource {
                name: WORKER_NAME,
                source: e.into(),
            })?;

        self.bulk = BulkState::Loading(handle);
        Ok(())
    }
}

impl<Next: Scene> Scene for LoadingScene<Next> {
    fn initialize(&mut self, ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
        let load = ctx.load_ctx();
        self.priority
            .load_all(&self.manifest, LoadTag::Priority, &load)?;

        match self.bulk {
            BulkState::Idle => self.spawn_bulk(ctx),
            BulkState::Loading(_) => Ok(()),
            // Revisited after loading finished: nothing left to wait for.
            BulkState::Done(_) => {
                ctx.set_scene::<Next>();
                Ok(())
            }
        }
    }

    fn update(&mut self, _clock: &Clock, _ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
        self.collect(false)
    }

    fn draw(&mut self, _ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
        Ok(())
    }
}

impl<Next: Scene> Drop for LoadingScene<Next> {
    fn drop(&mut self) {
        if let Err(e) = self.collect(true) {
            log::error!("bulk pass failed during teardown: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::test_support::Harness;
    use crate::resource::{LoadCtx, LoadState, Resource};
    use crate::scene::SceneRequest;

    struct Main;

    impl Scene for Main {
        fn update(&mut self, _clock: &Clock, _ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
            Ok(())
        }

        fn draw(&mut self, _ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
            Ok(())
        }
    }

    static SPLASH_THREAD: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Splash;

    impl Resource for Splash {
        fn load(&mut self, _ctx: &mut LoadCtx) -> anyhow::Result<()> {
            // Records that the load ran on the calling thread.
            let on_loader = std::thread::current().name() == Some(WORKER_NAME);
            SPLASH_THREAD.store(if on_loader { 2 } else { 1 }, Ordering::SeqCst);
            Ok(())
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {}
    }

    #[derive(Default)]
    struct Level;

    impl Resource for Level {
        fn load(&mut self, ctx: &mut LoadCtx) -> anyhow::Result<()> {
            anyhow::ensure!(std::thread::current().name() == Some(WORKER_NAME));
            ctx.gpu("level upload", |_| Ok(()));
            Ok(())
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {}
    }

    #[derive(Default)]
    struct Corrupt;

    impl Resource for Corrupt {
        fn load(&mut self, _ctx: &mut LoadCtx) -> anyhow::Result<()> {
            anyhow::bail!("bad header")
        }

        fn unload(&mut self, _ctx: &mut LoadCtx) {}
    }

    fn set_main() -> SceneRequest {
        SceneRequest::SetScene {
            id: TypeId::of::<Main>(),
            name: std::any::type_name::<Main>(),
        }
    }

    #[test]
    fn priority_pass_runs_before_initialize_returns() {
        let mut h = Harness::new();
        let manifest = ResourceManifest::new().priority::<Splash>();
        let mut scene = LoadingScene::<Main>::new(manifest);

        scene.initialize(&mut h.ctx()).unwrap();
        assert_eq!(SPLASH_THREAD.load(Ordering::SeqCst), 1);
        assert_eq!(scene.priority().state_of::<Splash>(), Some(LoadState::Loaded));
    }

    #[test]
    fn bulk_completion_requests_next_scene_once() {
        let mut h = Harness::new();
        let manifest = ResourceManifest::new().bulk::<Level>();
        let mut scene = LoadingScene::<Main>::new(manifest);

        scene.initialize(&mut h.ctx()).unwrap();
        scene.finish().unwrap();

        assert!(!scene.is_loading());
        let bulk = scene.bulk().expect("bulk registry collected");
        assert_eq!(bulk.state_of::<Level>(), Some(LoadState::Loaded));

        // The GPU task was queued before the scene request.
        assert_eq!(h.queue.len(), 1);
        assert_eq!(h.drain_requests(), vec![set_main()]);
    }

    #[test]
    fn revisit_after_loading_forwards_to_next() {
        let mut h = Harness::new();
        let mut scene = LoadingScene::<Main>::new(ResourceManifest::new().bulk::<Level>());

        scene.initialize(&mut h.ctx()).unwrap();
        scene.finish().unwrap();
        h.drain_requests();

        scene.initialize(&mut h.ctx()).unwrap();
        assert!(!scene.is_loading());
        assert_eq!(h.drain_requests(), vec![set_main()]);
    }

    #[test]
    fn bulk_failure_surfaces_and_skips_transition() {
        let mut h = Harness::new();
        let mut scene = LoadingScene::<Main>::new(ResourceManifest::new().bulk::<Corrupt>());

        scene.initialize(&mut h.ctx()).unwrap();
        let err = scene.finish().unwrap_err();

        assert!(err.to_string().contains("Corrupt"));
        assert!(h.drain_requests().is_empty());
    }
}
