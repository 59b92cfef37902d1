//! The tracking worker
//!
//! A single tokio task owns the tracker, the scheduler and the planner. Every
//! request from the application, and every delayed settle-check tick, reaches
//! it as a [`Command`] on one unbounded channel, so sampling, dispatch and
//! renderer commands never interleave.

use crate::{
    core::{
        config::{TrackingTiming, WindowGeometry},
        geo::{GeoPoint, TileBox},
    },
    input::events::{GestureEvent, LifecycleEvent},
    tracking::{
        planner::PanZoomPlanner,
        scheduler::{DebounceScheduler, PollPhase},
        viewport::{SampleOutcome, ViewportTracker},
    },
};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Requests handled by the worker, in arrival order
#[derive(Debug)]
pub(crate) enum Command {
    /// A delayed settle check came due
    Tick,
    /// Something outside the worker may have moved the view
    MotionStarted { delay: Duration },
    ForceRefresh,
    Gesture(GestureEvent),
    Lifecycle(LifecycleEvent),
    FitToRegion(TileBox),
    PanAndZoom { center: GeoPoint, zoom: f64 },
    PanTo(GeoPoint),
    ZoomBy(f64),
    Resize(WindowGeometry),
    /// Answered once every earlier command has been handled
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Counters shared between the worker and its handle
#[derive(Debug, Default)]
pub(crate) struct LoopStats {
    samples: AtomicU64,
    failed_samples: AtomicU64,
    not_ready: AtomicU64,
    ticks_armed: AtomicU64,
    polling: AtomicBool,
}

impl LoopStats {
    pub(crate) fn snapshot(&self) -> TrackingStats {
        TrackingStats {
            samples: self.samples.load(Ordering::Relaxed),
            failed_samples: self.failed_samples.load(Ordering::Relaxed),
            not_ready: self.not_ready.load(Ordering::Relaxed),
            ticks_armed: self.ticks_armed.load(Ordering::Relaxed),
            polling: self.polling.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the worker's activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingStats {
    /// Samples that committed a view and notified every overlay
    pub samples: u64,
    /// Samples whose commit or dispatch failed
    pub failed_samples: u64,
    /// Samples skipped because the renderer could not answer
    pub not_ready: u64,
    /// Delayed ticks scheduled so far
    pub ticks_armed: u64,
    /// Whether a settle-check chain is running
    pub polling: bool,
}

pub(crate) struct RenderLoop {
    tracker: ViewportTracker,
    scheduler: DebounceScheduler,
    planner: PanZoomPlanner,
    commands: mpsc::WeakUnboundedSender<Command>,
    stats: Arc<LoopStats>,
}

impl RenderLoop {
    pub(crate) fn new(
        tracker: ViewportTracker,
        timing: TrackingTiming,
        commands: mpsc::WeakUnboundedSender<Command>,
        stats: Arc<LoopStats>,
    ) -> Self {
        let scheduler = DebounceScheduler::new(timing.poll_step());
        Self {
            planner: PanZoomPlanner::new(tracker.window(), timing),
            tracker,
            scheduler,
            commands,
            stats,
        }
    }

    /// Handles commands until shutdown or until every sender is gone
    pub(crate) async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        log::debug!("Tracking worker started");
        while let Some(command) = receiver.recv().await {
            if !self.handle(command) {
                break;
            }
        }
        self.stats.polling.store(false, Ordering::Relaxed);
        log::debug!("Tracking worker stopped");
    }

    /// Returns false once the worker should stop
    fn handle(&mut self, command: Command) -> bool {
        log::trace!("Handling {:?}", command);
        match command {
            Command::Tick => self.run_tick(),
            Command::MotionStarted { delay } => self.start_tracking(delay),
            Command::ForceRefresh => self.start_tracking(Duration::ZERO),
            Command::Gesture(gesture) => self.handle_gesture(gesture),
            Command::Lifecycle(event) => {
                if let Err(e) = self.tracker.dispatcher_mut().lifecycle(event) {
                    log::error!("Lifecycle {:?} dispatch failed: {}", event, e);
                }
            }
            Command::FitToRegion(target) => self.fit_to_region(target),
            Command::PanAndZoom { center, zoom } => self.pan_and_zoom(center, zoom),
            Command::PanTo(center) => {
                let issued = self.planner.pan_to(self.tracker.renderer().as_ref(), center);
                match issued {
                    Ok(delay) => self.start_tracking(delay),
                    Err(e) => log::error!("Cannot pan: {}", e),
                }
            }
            Command::ZoomBy(levels) => {
                let issued = self.planner.zoom_by(self.tracker.renderer().as_ref(), levels);
                match issued {
                    Some(delay) => self.start_tracking(delay),
                    None => log::warn!("Renderer not ready, dropping zoom by {}", levels),
                }
            }
            Command::Resize(window) => {
                log::debug!("Window geometry changed to {:?}", window);
                self.tracker.set_window(window);
                self.planner.set_window(window);
                self.start_tracking(Duration::ZERO);
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn handle_gesture(&mut self, gesture: GestureEvent) {
        if gesture.is_motion() {
            self.start_tracking(Duration::ZERO);
            return;
        }

        match gesture {
            GestureEvent::Shove { .. } | GestureEvent::Rotate { .. } => {
                log::trace!("Ignoring {:?}", gesture);
            }
            _ => {
                if let Err(e) = self.tracker.dispatcher_mut().route_pointer(&gesture) {
                    log::error!("Pointer dispatch failed for {:?}: {}", gesture, e);
                }
            }
        }
    }

    fn fit_to_region(&mut self, target: TileBox) {
        let renderer = self.tracker.renderer().clone();
        match self.planner.plan_fit(renderer.as_ref(), &target) {
            Ok(Some(plan)) => {
                let delay = self.planner.apply(renderer.as_ref(), &plan);
                self.start_tracking(delay);
            }
            Ok(None) => log::warn!("Renderer not ready, dropping fit to {:?}", target),
            Err(e) => log::error!("Cannot fit to {:?}: {}", target, e),
        }
    }

    fn pan_and_zoom(&mut self, center: GeoPoint, zoom: f64) {
        match self.planner.plan_view(center, zoom) {
            Ok(plan) => {
                let renderer = self.tracker.renderer().clone();
                let delay = self.planner.apply(renderer.as_ref(), &plan);
                self.start_tracking(delay);
            }
            Err(e) => log::error!("Cannot move the view: {}", e),
        }
    }

    /// Motion-start signal: sample right away for a zero delay, otherwise arm
    /// the first tick
    fn start_tracking(&mut self, delay: Duration) {
        self.scheduler.motion_started();
        self.stats.polling.store(true, Ordering::Relaxed);
        if delay.is_zero() {
            self.run_tick();
        } else {
            self.arm(delay);
        }
    }

    fn run_tick(&mut self) {
        self.scheduler.tick_fired();

        let moved = match self.tracker.sample() {
            Ok(SampleOutcome::Moved) => {
                self.stats.samples.fetch_add(1, Ordering::Relaxed);
                true
            }
            Ok(SampleOutcome::Settled) => {
                self.stats.samples.fetch_add(1, Ordering::Relaxed);
                false
            }
            Ok(SampleOutcome::NotReady) => {
                self.stats.not_ready.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(e) => {
                self.stats.failed_samples.fetch_add(1, Ordering::Relaxed);
                log::error!("Sample failed, tracking stopped until the next motion: {}", e);
                false
            }
        };

        if let Some(step) = self.scheduler.after_sample(moved) {
            self.arm(step);
        }
        self.stats
            .polling
            .store(self.scheduler.phase() == PollPhase::Polling, Ordering::Relaxed);
    }

    fn arm(&self, delay: Duration) {
        let Some(commands) = self.commands.upgrade() else {
            log::debug!("Worker is shutting down, not arming a tick");
            return;
        };
        self.stats.ticks_armed.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The worker may be gone by now
            let _ = commands.send(Command::Tick);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::DispatchPolicy, geo::Point, geo::SpaceTimeBox},
        overlay::{OverlayDispatcher, OverlayObserver},
        renderer::{simulated::SimulatedRenderer, MapRenderer},
        Result,
    };
    use std::sync::Mutex;

    struct Count(Arc<Mutex<usize>>);

    impl OverlayObserver for Count {
        fn notify_screen_changed(&mut self, _region: &SpaceTimeBox) -> Result<()> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn render_loop(renderer: Arc<SimulatedRenderer>, count: &Arc<Mutex<usize>>) -> RenderLoop {
        let mut dispatcher = OverlayDispatcher::new(DispatchPolicy::AbortOnError);
        dispatcher.add_observer(Box::new(Count(count.clone())));
        let tracker = ViewportTracker::new(
            renderer,
            WindowGeometry::uniform(400.0, 300.0),
            dispatcher,
            Arc::new((0_i64, 100_i64)),
        );
        let (sender, _receiver) = mpsc::unbounded_channel();
        RenderLoop::new(
            tracker,
            TrackingTiming::default(),
            sender.downgrade(),
            Arc::new(LoopStats::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_refresh_on_resting_view() {
        let renderer = Arc::new(SimulatedRenderer::new(
            Point::new(400.0, 300.0),
            GeoPoint::new(0.0, 0.0),
            3.0,
        ));
        let count = Arc::new(Mutex::new(0));
        let mut worker = render_loop(renderer, &count);

        // The first sample counts as motion. Its follow-up tick is never
        // armed because the channel is already closed
        assert!(worker.handle(Command::ForceRefresh));
        assert_eq!(*count.lock().unwrap(), 1);

        worker.handle(Command::Tick);
        assert_eq!(*count.lock().unwrap(), 2);
        assert_eq!(worker.scheduler.phase(), PollPhase::Idle);

        // Nothing moved, yet the refresh still notifies
        worker.handle(Command::ForceRefresh);
        assert_eq!(*count.lock().unwrap(), 3);
        assert!(!worker.stats.snapshot().polling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_taps_do_not_sample() {
        let renderer = Arc::new(SimulatedRenderer::new(
            Point::new(400.0, 300.0),
            GeoPoint::new(0.0, 0.0),
            3.0,
        ));
        let count = Arc::new(Mutex::new(0));
        let mut worker = render_loop(renderer, &count);

        worker.handle(Command::Gesture(GestureEvent::SingleTap {
            position: Point::new(5.0, 5.0),
        }));
        worker.handle(Command::Gesture(GestureEvent::Rotate {
            position: Point::new(5.0, 5.0),
            radians: 0.3,
        }));
        assert_eq!(*count.lock().unwrap(), 0);
        assert_eq!(worker.stats.snapshot().samples, 0);

        worker.handle(Command::Gesture(GestureEvent::Fling {
            position: Point::new(5.0, 5.0),
            velocity: Point::new(100.0, 0.0),
        }));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_renderer_ends_chain() {
        let renderer = Arc::new(SimulatedRenderer::pending(
            Point::new(400.0, 300.0),
            GeoPoint::new(0.0, 0.0),
            3.0,
        ));
        let count = Arc::new(Mutex::new(0));
        let mut worker = render_loop(renderer.clone(), &count);

        worker.handle(Command::ForceRefresh);
        worker.handle(Command::ZoomBy(1.5));
        worker.handle(Command::FitToRegion(TileBox::new(0, 0, 10, 10)));

        let stats = worker.stats.snapshot();
        assert_eq!(stats.not_ready, 1);
        assert_eq!(stats.samples, 0);
        assert!(!stats.polling);
        assert_eq!(*count.lock().unwrap(), 0);
        assert!(!renderer.is_animating());
        assert!(renderer.zoom().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let renderer = Arc::new(SimulatedRenderer::new(
            Point::new(400.0, 300.0),
            GeoPoint::new(0.0, 0.0),
            3.0,
        ));
        let count = Arc::new(Mutex::new(0));
        let mut worker = render_loop(renderer, &count);
        assert!(!worker.handle(Command::Shutdown));
    }
}
