use crate::{
    core::{
        config::{TrackingTiming, WindowGeometry},
        geo::{GeoPoint, TileBox},
    },
    input::events::{GestureEvent, LifecycleEvent},
    runtime::{Command, LoopStats, TrackingStats},
    tracking::{planner, viewport::SharedViewport},
    MapError, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

/// Application-facing handle onto a running tracker.
///
/// Reads go straight to the committed view and never wait for the worker.
/// Commands are queued to the worker and return as soon as they are queued;
/// use [`MapSync::flush`] to wait until they have been handled. Built with
/// [`MapSyncBuilder`](crate::core::builder::MapSyncBuilder).
pub struct MapSync {
    commands: mpsc::UnboundedSender<Command>,
    viewport: SharedViewport,
    stats: Arc<LoopStats>,
    timing: TrackingTiming,
    worker: Option<JoinHandle<()>>,
}

impl MapSync {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        viewport: SharedViewport,
        stats: Arc<LoopStats>,
        timing: TrackingTiming,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            commands,
            viewport,
            stats,
            timing,
            worker: Some(worker),
        }
    }

    /// Tile-space box of the visible drawable area
    pub fn current_tile_box(&self) -> Option<TileBox> {
        self.viewport.tile_box()
    }

    pub fn current_top_left(&self) -> Option<GeoPoint> {
        self.viewport.top_left()
    }

    pub fn current_bottom_right(&self) -> Option<GeoPoint> {
        self.viewport.bottom_right()
    }

    /// Ground meters per horizontal pixel, once a view has been sampled
    pub fn meters_per_pixel(&self) -> Result<Option<f64>> {
        self.viewport.meters_per_pixel()
    }

    /// A clonable reader for threads that do not own this handle
    pub fn viewport(&self) -> SharedViewport {
        self.viewport.clone()
    }

    pub fn timing(&self) -> &TrackingTiming {
        &self.timing
    }

    pub fn stats(&self) -> TrackingStats {
        self.stats.snapshot()
    }

    /// Animates the view so that `target` just fits inside the drawable area.
    /// Degenerate targets are rejected here, before anything is queued.
    pub fn fit_to_region(&self, target: TileBox) -> Result<()> {
        planner::validate_target(&target)?;
        self.send(Command::FitToRegion(target))
    }

    pub fn pan_and_zoom_to(&self, lon: f64, lat: f64, zoom: f64) -> Result<()> {
        if !(lon.is_finite() && lat.is_finite() && zoom.is_finite()) {
            return Err(MapError::InvalidCoordinates(format!(
                "cannot move to ({lon}, {lat}) at zoom {zoom}"
            )));
        }
        self.send(Command::PanAndZoom {
            center: GeoPoint::new(lon, lat),
            zoom,
        })
    }

    pub fn pan_to(&self, center: GeoPoint) -> Result<()> {
        if !center.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "cannot pan to {center:?}"
            )));
        }
        self.send(Command::PanTo(center))
    }

    pub fn zoom_in(&self) -> Result<()> {
        self.send(Command::ZoomBy(self.timing.zoom_step))
    }

    pub fn zoom_out(&self) -> Result<()> {
        self.send(Command::ZoomBy(-self.timing.zoom_step))
    }

    /// Re-samples and notifies every overlay even if nothing moved
    pub fn force_refresh(&self) -> Result<()> {
        self.send(Command::ForceRefresh)
    }

    /// Starts tracking after something the worker cannot see moved the view,
    /// such as an animation issued directly to the renderer
    pub fn notify_motion(&self, initial_delay: Duration) -> Result<()> {
        self.send(Command::MotionStarted {
            delay: initial_delay,
        })
    }

    pub fn handle_gesture(&self, gesture: GestureEvent) -> Result<()> {
        self.send(Command::Gesture(gesture))
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Lifecycle(LifecycleEvent::Pause))
    }

    pub fn resume(&self) -> Result<()> {
        self.send(Command::Lifecycle(LifecycleEvent::Resume))
    }

    /// Call once the window has been laid out, and again after every resize
    pub fn set_window_geometry(&self, window: WindowGeometry) -> Result<()> {
        window.validate()?;
        self.send(Command::Resize(window))
    }

    /// Waits until every command queued so far has been handled. Ticks armed
    /// by those commands may still be pending.
    pub async fn flush(&self) -> Result<()> {
        let (done, handled) = oneshot::channel();
        self.send(Command::Flush(done))?;
        handled
            .await
            .map_err(|_| MapError::Runtime("tracking worker stopped".to_string()))
    }

    /// Stops the worker and waits for it to exit. Any later command fails
    /// with [`MapError::Runtime`].
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        // Already gone if it panicked
        let _ = self.commands.send(Command::Shutdown);
        worker
            .await
            .map_err(|e| MapError::Runtime(format!("tracking worker failed: {e}")))
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|worker| !worker.is_finished())
            .unwrap_or(false)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| MapError::Runtime("tracking worker stopped".to_string()))
    }
}

impl Drop for MapSync {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.commands.send(Command::Shutdown);
        }
    }
}

impl std::fmt::Debug for MapSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSync")
            .field("viewport", &self.viewport.snapshot())
            .field("stats", &self.stats())
            .field("running", &self.is_running())
            .finish()
    }
}
