//! Fluent assembly of a [`MapSync`]
//!
//! Everything the worker owns (renderer, overlays, time source, scale bar) is
//! handed over here. Once [`MapSyncBuilder::spawn`] returns, the overlay list
//! is fixed.

use crate::{
    core::{
        config::{DispatchPolicy, InitialView, SyncConfig, TrackingProfile, WindowGeometry},
        geo::GeoPoint,
        map::MapSync,
        time_range::TimeRangeSource,
    },
    overlay::{OverlayDispatcher, OverlayObserver, ScaleIndicator},
    renderer::MapRenderer,
    runtime::{Command, LoopStats, RenderLoop},
    tracking::viewport::ViewportTracker,
    MapError, Result,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct MapSyncBuilder {
    config: SyncConfig,
    renderer: Option<Arc<dyn MapRenderer>>,
    observers: Vec<Box<dyn OverlayObserver>>,
    time_range: Option<Arc<dyn TimeRangeSource>>,
    scale: Option<Box<dyn ScaleIndicator>>,
}

impl MapSyncBuilder {
    pub fn new() -> Self {
        Self {
            config: SyncConfig::default(),
            renderer: None,
            observers: Vec::new(),
            time_range: None,
            scale: None,
        }
    }

    /// Replaces the whole configuration
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_window(mut self, window: WindowGeometry) -> Self {
        self.config.window = window;
        self
    }

    pub fn with_profile(mut self, profile: TrackingProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.config.dispatch_policy = policy;
        self
    }

    /// View to animate to as soon as the worker starts
    pub fn with_initial_view(mut self, center: GeoPoint, zoom: f64) -> Self {
        self.config.initial_view = Some(InitialView {
            lon: center.lon,
            lat: center.lat,
            zoom,
        });
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn MapRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Overlays are notified in the order they are added
    pub fn add_observer(mut self, observer: Box<dyn OverlayObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Source of the time window attached to every notification. Without
    /// one, overlays receive an unbounded window.
    pub fn with_time_range(mut self, time_range: Arc<dyn TimeRangeSource>) -> Self {
        self.time_range = Some(time_range);
        self
    }

    pub fn with_scale_indicator(mut self, scale: Box<dyn ScaleIndicator>) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Starts the tracking worker on the current tokio runtime.
    ///
    /// The worker first moves to the configured initial view, or otherwise
    /// samples the view as it is.
    pub fn spawn(self) -> Result<MapSync> {
        self.config.validate()?;
        let renderer = self
            .renderer
            .ok_or_else(|| MapError::Config("a renderer is required".to_string()))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| MapError::Runtime(format!("no tokio runtime: {e}")))?;

        let mut dispatcher = OverlayDispatcher::new(self.config.dispatch_policy);
        for observer in self.observers {
            dispatcher.add_observer(observer);
        }

        let time_range = self
            .time_range
            .unwrap_or_else(|| Arc::new((i64::MIN, i64::MAX)) as Arc<dyn TimeRangeSource>);

        let mut tracker =
            ViewportTracker::new(renderer, self.config.window, dispatcher, time_range);
        if let Some(scale) = self.scale {
            tracker = tracker.with_scale_indicator(scale);
        }
        let viewport = tracker.shared();

        let timing = self.config.timing();
        let stats = Arc::new(LoopStats::default());
        let (commands, receiver) = mpsc::unbounded_channel();
        let render_loop =
            RenderLoop::new(tracker, timing.clone(), commands.downgrade(), stats.clone());
        let worker = runtime.spawn(render_loop.run(receiver));

        let first = match self.config.initial_view {
            Some(view) => Command::PanAndZoom {
                center: GeoPoint::new(view.lon, view.lat),
                zoom: view.zoom,
            },
            None => Command::ForceRefresh,
        };
        commands
            .send(first)
            .map_err(|_| MapError::Runtime("tracking worker stopped".to_string()))?;

        log::info!(
            "Tracking started for a {}x{} window ({} px drawable)",
            self.config.window.width_px,
            self.config.window.full_height_px,
            self.config.window.drawable_height_px
        );

        Ok(MapSync::new(commands, viewport, stats, timing, worker))
    }
}

impl Default for MapSyncBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::Point, renderer::simulated::SimulatedRenderer};

    #[test]
    fn test_spawn_requires_renderer() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();

        let err = MapSyncBuilder::new().spawn().unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_spawn_requires_runtime() {
        let renderer = Arc::new(SimulatedRenderer::new(
            Point::new(800.0, 600.0),
            GeoPoint::default(),
            2.0,
        ));
        let err = MapSyncBuilder::new()
            .with_renderer(renderer)
            .spawn()
            .unwrap_err();
        assert!(matches!(err, MapError::Runtime(_)));
    }

    #[test]
    fn test_spawn_rejects_invalid_window() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();

        let renderer = Arc::new(SimulatedRenderer::new(
            Point::new(800.0, 600.0),
            GeoPoint::default(),
            2.0,
        ));
        let err = MapSyncBuilder::new()
            .with_renderer(renderer)
            .with_window(WindowGeometry::new(800.0, 600.0, 700.0))
            .spawn()
            .unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }
}
