use crossbeam_channel::Receiver;

use crate::config::RenderSettings;
use crate::error::EngineResult;
use crate::input::InputState;
use crate::resource::{GpuTaskQueue, GpuTasks, UploadCtx};
use crate::scene::{Scene, SceneHandle, SceneRegistry, SceneRequest};
use crate::time::Clock;

use super::active::ActiveInstance;
use super::ctx::{DrawCtx, SceneCtx, WindowRequests};

/// Owns the scenes, the clock and the active flag.
///
/// One frame, as driven by `window::Runtime`:
///
/// 1. [`begin_frame`](Self::begin_frame); the frame is skipped if it
///    returns `false`
/// 2. [`drain_gpu_tasks`](Self::drain_gpu_tasks)
/// 3. surface acquisition (runtime)
/// 4. [`swap`](Self::swap)
/// 5. [`update`](Self::update)
/// 6. [`draw`](Self::draw)
/// 7. final pass + present (runtime)
/// 8. [`end_frame`](Self::end_frame)
///
/// An exit requested during a frame is applied by `end_frame`, so that frame
/// completes and is the last one.
pub struct Scheduler {
    scenes: SceneRegistry,
    clock: Clock,

    handle: SceneHandle,
    requests: Receiver<SceneRequest>,

    tasks: GpuTasks,
    queue: GpuTaskQueue,

    window: WindowRequests,

    active: bool,
    instance: Option<ActiveInstance>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (handle, requests) = SceneHandle::channel();
        let (tasks, queue) = GpuTasks::channel();

        Self {
            scenes: SceneRegistry::new(),
            clock: Clock::new(),
            handle,
            requests,
            tasks,
            queue,
            window: WindowRequests::default(),
            active: false,
            instance: None,
        }
    }

    /// Registers a scene; the first one registered becomes the initial scene.
    pub fn with_scene<S: Scene>(mut self, scene: S) -> Self {
        self.scenes.register(scene);
        self
    }

    pub fn register<S: Scene>(&mut self, scene: S) -> bool {
        self.scenes.register(scene)
    }

    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    pub fn gpu_tasks(&self) -> GpuTasks {
        self.tasks.clone()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn scenes(&self) -> &SceneRegistry {
        &self.scenes
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Takes the process-wide guard, starts the clock and marks the
    /// scheduler active.
    ///
    /// Returns `false` (and changes nothing) if another scheduler is running.
    pub fn begin(&mut self) -> bool {
        if self.instance.is_some() {
            return true;
        }

        let Some(instance) = ActiveInstance::acquire() else {
            log::warn!("another scheduler is already running; ignoring run request");
            return false;
        };

        self.instance = Some(instance);
        self.clock.start();
        self.active = true;
        true
    }

    /// Stops the clock and releases the guard.
    pub fn end(&mut self) {
        self.active = false;
        self.clock.stop();
        self.instance = None;
    }

    /// Clears the active flag. Takes effect at the next frame boundary.
    pub fn exit(&mut self) {
        self.active = false;
    }

    /// Applies queued scene requests. `SetScene` requests overwrite each other;
    /// `Exit` clears the active flag.
    pub fn poll_requests(&mut self) {
        for request in self.requests.try_iter() {
            match request {
                SceneRequest::SetScene { id, name } => {
                    self.scenes.request(id, name);
                }
                SceneRequest::Exit => {
                    log::debug!("exit requested");
                    self.active = false;
                }
            }
        }
    }

    /// Applies requests that arrived between frames. Returns `false` if the
    /// scheduler is no longer active and the frame must not run.
    pub fn begin_frame(&mut self) -> bool {
        self.poll_requests();
        self.active
    }

    /// Advances the clock, then applies the requests made during the frame.
    pub fn end_frame(&mut self) {
        self.advance();
        self.poll_requests();
    }

    /// Runs GPU tasks queued by resource loads. Main thread only.
    ///
    /// Called after `begin_frame` and before `swap`, so every task sent
    /// before a scene request has run by the time that scene initializes.
    pub fn drain_gpu_tasks(&mut self, upload: &mut UploadCtx<'_>) -> EngineResult<usize> {
        self.queue.drain(upload)
    }

    pub fn pending_gpu_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Activates the pending scene, if any.
    pub fn swap(&mut self, input: &InputState, settings: &RenderSettings) -> EngineResult<bool> {
        let mut ctx = SceneCtx::new(input, settings, &self.handle, &self.tasks, &mut self.window);
        self.scenes.swap(&mut ctx)
    }

    pub fn update(&mut self, input: &InputState, settings: &RenderSettings) -> EngineResult<()> {
        let mut ctx = SceneCtx::new(input, settings, &self.handle, &self.tasks, &mut self.window);
        self.scenes.update(&self.clock, &mut ctx)
    }

    pub fn draw(&mut self, ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
        self.scenes.draw(ctx)
    }

    /// Advances the clock. Called once per frame, after present.
    pub fn advance(&mut self) {
        self.clock.advance();
    }

    pub fn take_window_requests(&mut self) -> WindowRequests {
        std::mem::take(&mut self.window)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::time::Clock;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder<const N: u8> {
        log: Log,
    }

    impl<const N: u8> Scene for Recorder<N> {
        fn initialize(&mut self, _ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
            self.log.borrow_mut().push(format!("init {N}"));
            Ok(())
        }

        fn update(&mut self, _clock: &Clock, _ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
            self.log.borrow_mut().push(format!("update {N}"));
            Ok(())
        }

        fn draw(&mut self, _ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
            Ok(())
        }
    }

    /// Exits from `update` on its first frame.
    struct Quitter;

    impl Scene for Quitter {
        fn update(&mut self, _clock: &Clock, ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
            ctx.exit();
            ctx.set_cursor_visible(false);
            Ok(())
        }

        fn draw(&mut self, _ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
            Ok(())
        }
    }

    struct Unregistered;

    impl Scene for Unregistered {
        fn update(&mut self, _clock: &Clock, _ctx: &mut SceneCtx<'_>) -> EngineResult<()> {
            Ok(())
        }

        fn draw(&mut self, _ctx: &mut DrawCtx<'_>) -> EngineResult<()> {
            Ok(())
        }
    }

    fn scheduler(log: &Log) -> Scheduler {
        Scheduler::new()
            .with_scene(Recorder::<0> { log: log.clone() })
            .with_scene(Recorder::<1> { log: log.clone() })
            .with_scene(Recorder::<2> { log: log.clone() })
    }

    /// The CPU half of one frame.
    fn frame(s: &mut Scheduler) {
        let input = InputState::default();
        let settings = RenderSettings::default();
        s.begin_frame();
        s.swap(&input, &settings).unwrap();
        s.update(&input, &settings).unwrap();
        s.end_frame();
    }

    /// Runs frames in the runtime's order until the scheduler goes inactive.
    /// Returns the number of frames that ran.
    fn run(s: &mut Scheduler, limit: usize) -> usize {
        let input = InputState::default();
        let settings = RenderSettings::default();
        let mut frames = 0;
        while s.is_active() && frames < limit {
            if !s.begin_frame() {
                break;
            }
            s.swap(&input, &settings).unwrap();
            s.update(&input, &settings).unwrap();
            s.end_frame();
            frames += 1;
        }
        frames
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.borrow().iter().filter(|e| *e == entry).count()
    }

    // ── scene selection ───────────────────────────────────────────────────

    #[test]
    fn first_registered_scene_is_current_after_first_boundary() {
        let log = Log::default();
        let mut s = scheduler(&log);
        assert!(s.scenes().current_id().is_none());

        frame(&mut s);
        assert!(s.scenes().is_current::<Recorder<0>>());
        assert_eq!(*log.borrow(), vec!["init 0", "update 0"]);
    }

    #[test]
    fn last_set_scene_before_boundary_wins() {
        let log = Log::default();
        let mut s = scheduler(&log);
        frame(&mut s);

        let handle = s.handle();
        handle.set_scene::<Recorder<1>>();
        handle.set_scene::<Recorder<2>>();
        handle.set_scene::<Recorder<1>>();
        handle.set_scene::<Recorder<2>>();
        frame(&mut s);

        assert!(s.scenes().is_current::<Recorder<2>>());
        assert_eq!(count(&log, "init 1"), 0);
        assert_eq!(count(&log, "init 2"), 1);
    }

    #[test]
    fn initialize_runs_once_per_activation() {
        let log = Log::default();
        let mut s = scheduler(&log);
        let handle = s.handle();

        for _ in 0..3 {
            frame(&mut s);
        }
        assert_eq!(count(&log, "init 0"), 1);
        assert_eq!(count(&log, "update 0"), 3);

        handle.set_scene::<Recorder<1>>();
        frame(&mut s);
        frame(&mut s);

        handle.set_scene::<Recorder<0>>();
        for _ in 0..4 {
            frame(&mut s);
        }

        assert_eq!(count(&log, "init 0"), 2);
        assert_eq!(count(&log, "init 1"), 1);
        assert_eq!(count(&log, "update 1"), 2);
    }

    #[test]
    fn set_scene_to_unregistered_type_is_ignored() {
        let log = Log::default();
        let mut s = scheduler(&log);
        frame(&mut s);

        s.handle().set_scene::<Unregistered>();
        frame(&mut s);
        assert!(s.scenes().is_current::<Recorder<0>>());
        assert_eq!(count(&log, "init 0"), 1);
    }

    #[test]
    fn unregistered_request_does_not_clear_earlier_pending_choice() {
        let log = Log::default();
        let mut s = scheduler(&log);
        frame(&mut s);

        let handle = s.handle();
        handle.set_scene::<Recorder<2>>();
        handle.set_scene::<Unregistered>();
        frame(&mut s);

        assert!(s.scenes().is_current::<Recorder<2>>());
    }

    #[test]
    fn requests_from_another_thread_apply_at_the_boundary() {
        let log = Log::default();
        let mut s = scheduler(&log);
        frame(&mut s);

        let handle = s.handle();
        std::thread::spawn(move || handle.set_scene::<Recorder<1>>())
            .join()
            .unwrap();

        // Not applied until the scheduler polls.
        assert!(s.scenes().is_current::<Recorder<0>>());
        frame(&mut s);
        assert!(s.scenes().is_current::<Recorder<1>>());
    }

    // ── exit / clock ──────────────────────────────────────────────────────

    #[test]
    fn exit_is_observed_after_the_current_frame() {
        let mut s = Scheduler::new().with_scene(Quitter);
        s.active = true;

        frame(&mut s);
        // The frame that requested exit still advanced the clock.
        assert_eq!(s.clock().frame(), 1);
        assert!(!s.is_active());
    }

    #[test]
    fn frame_that_requests_exit_is_the_last() {
        let mut s = Scheduler::new().with_scene(Quitter);
        s.active = true;

        assert_eq!(run(&mut s, 10), 1);
        assert_eq!(s.clock().frame(), 1);
    }

    #[test]
    fn exit_between_frames_skips_the_next_frame() {
        let log = Log::default();
        let mut s = scheduler(&log);
        s.active = true;
        assert_eq!(run(&mut s, 2), 2);

        s.handle().exit();
        assert!(!s.begin_frame());
        assert_eq!(run(&mut s, 10), 0);
        assert_eq!(count(&log, "update 0"), 2);
    }

    #[test]
    fn skipped_frame_runs_no_scene_code() {
        let log = Log::default();
        let mut s = scheduler(&log);
        s.active = true;
        frame(&mut s);

        s.handle().set_scene::<Recorder<1>>();
        // Surface unavailable: the frame stops after `begin_frame`.
        assert!(s.begin_frame());
        assert_eq!(s.clock().frame(), 1);
        assert_eq!(count(&log, "init 1"), 0);

        frame(&mut s);
        assert_eq!(count(&log, "init 1"), 1);
        assert_eq!(count(&log, "update 1"), 1);
        assert_eq!(count(&log, "update 0"), 1);
    }

    #[test]
    fn window_requests_are_taken_once() {
        let mut s = Scheduler::new().with_scene(Quitter);
        frame(&mut s);

        assert_eq!(s.take_window_requests().cursor_visible, Some(false));
        assert_eq!(s.take_window_requests().cursor_visible, None);
    }

    #[test]
    fn clock_advances_once_per_frame() {
        let log = Log::default();
        let mut s = scheduler(&log);
        for _ in 0..5 {
            frame(&mut s);
        }
        assert_eq!(s.clock().frame(), 5);
    }

    #[test]
    fn empty_scheduler_runs_frames_without_scenes() {
        let mut s = Scheduler::new();
        frame(&mut s);
        assert!(s.scenes().current_id().is_none());
    }
}
