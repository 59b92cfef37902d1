use crate::{
    core::{
        config::WindowGeometry,
        geo::{GeoPoint, Point, SpaceTimeBox, TileBox, ViewportBox},
        projection,
        time_range::TimeRangeSource,
    },
    overlay::{OverlayDispatcher, ScaleIndicator},
    renderer::MapRenderer,
    Result,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// The committed view: geographic box, matching tile box and the window width
/// it was sampled with. Always written as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedViewport {
    pub viewport: ViewportBox,
    pub tiles: TileBox,
    pub window_width_px: f64,
}

/// Lock-protected handle to the committed view.
///
/// Written only by the tracking worker; any thread may clone the handle and
/// read from it. Readers never see a half-written update. Everything returns
/// `None` until the first successful sample.
#[derive(Debug, Clone, Default)]
pub struct SharedViewport {
    inner: Arc<Mutex<Option<TrackedViewport>>>,
}

impl SharedViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<TrackedViewport> {
        *self.lock()
    }

    pub fn tile_box(&self) -> Option<TileBox> {
        self.lock().map(|tracked| tracked.tiles)
    }

    pub fn top_left(&self) -> Option<GeoPoint> {
        self.lock().map(|tracked| tracked.viewport.top_left)
    }

    pub fn bottom_right(&self) -> Option<GeoPoint> {
        self.lock().map(|tracked| tracked.viewport.bottom_right)
    }

    /// Ground meters per horizontal pixel at the center of the view
    pub fn meters_per_pixel(&self) -> Result<Option<f64>> {
        match self.snapshot() {
            Some(tracked) => {
                projection::meters_per_pixel(&tracked.viewport, tracked.window_width_px).map(Some)
            }
            None => Ok(None),
        }
    }

    fn commit(&self, tracked: TrackedViewport) {
        *self.lock() = Some(tracked);
    }

    fn lock(&self) -> MutexGuard<'_, Option<TrackedViewport>> {
        // Only whole values are ever stored, so a poisoned lock still holds a
        // consistent view
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Result of one look at the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The renderer cannot answer yet; nothing was committed or dispatched
    NotReady,
    /// The corners differ from the previous sample
    Moved,
    /// The corners are identical to the previous sample
    Settled,
}

/// Samples the renderer and publishes the visible region.
///
/// `sample` must run on the context that owns the renderer so that both
/// corner queries see the same frame.
pub struct ViewportTracker {
    renderer: Arc<dyn MapRenderer>,
    window: WindowGeometry,
    shared: SharedViewport,
    dispatcher: OverlayDispatcher,
    time_range: Arc<dyn TimeRangeSource>,
    scale: Option<Box<dyn ScaleIndicator>>,
    /// Corners seen by the previous sample, for settle detection only
    last_corners: Option<(GeoPoint, GeoPoint)>,
}

impl ViewportTracker {
    pub fn new(
        renderer: Arc<dyn MapRenderer>,
        window: WindowGeometry,
        dispatcher: OverlayDispatcher,
        time_range: Arc<dyn TimeRangeSource>,
    ) -> Self {
        Self {
            renderer,
            window,
            shared: SharedViewport::new(),
            dispatcher,
            time_range,
            scale: None,
            last_corners: None,
        }
    }

    pub fn with_scale_indicator(mut self, scale: Box<dyn ScaleIndicator>) -> Self {
        self.scale = Some(scale);
        self
    }

    /// A reader handle onto the committed view
    pub fn shared(&self) -> SharedViewport {
        self.shared.clone()
    }

    pub fn renderer(&self) -> &Arc<dyn MapRenderer> {
        &self.renderer
    }

    pub fn window(&self) -> WindowGeometry {
        self.window
    }

    pub fn set_window(&mut self, window: WindowGeometry) {
        self.window = window;
    }

    pub fn dispatcher_mut(&mut self) -> &mut OverlayDispatcher {
        &mut self.dispatcher
    }

    /// Reads the drawable-area corners, commits the new view, refreshes the
    /// scale indicator and notifies every overlay, then compares the corners
    /// with the previous sample.
    ///
    /// Overlays are notified even when nothing changed, so queueing a sample
    /// always redraws them. An overlay failure is returned before the
    /// comparison, leaving the previous corners in place.
    pub fn sample(&mut self) -> Result<SampleOutcome> {
        let top_left = self.renderer.screen_to_geo(Point::new(0.0, 0.0));
        let bottom_right = self.renderer.screen_to_geo(self.window.drawable_corner());
        let (Some(top_left), Some(bottom_right)) = (top_left, bottom_right) else {
            log::debug!("Renderer not ready, skipping sample");
            return Ok(SampleOutcome::NotReady);
        };

        let top_left = top_left.normalized().clamped_to_mercator();
        let bottom_right = bottom_right.normalized().clamped_to_mercator();

        let viewport = ViewportBox::from_corners(top_left, bottom_right);
        let tiles = projection::tile_box_for(&viewport)?;
        self.shared.commit(TrackedViewport {
            viewport,
            tiles,
            window_width_px: self.window.width_px,
        });

        self.refresh_scale(&viewport);

        let (min_time, max_time) = self.time_range.time_range();
        self.dispatcher
            .notify_screen_changed(&SpaceTimeBox::new(tiles, min_time, max_time))?;

        let corners = (top_left, bottom_right);
        if self.last_corners == Some(corners) {
            log::trace!("View settled at {:?}", tiles);
            return Ok(SampleOutcome::Settled);
        }

        log::trace!("View moved to {:?}", tiles);
        self.last_corners = Some(corners);
        Ok(SampleOutcome::Moved)
    }

    fn refresh_scale(&mut self, viewport: &ViewportBox) {
        let Some(scale) = self.scale.as_mut() else {
            return;
        };
        match projection::meters_per_pixel(viewport, self.window.width_px) {
            Ok(meters) if meters > 0.0 => scale.update(1.0 / meters),
            Ok(_) => {}
            Err(e) => log::warn!("Cannot compute map scale: {}", e),
        }
    }
}

impl std::fmt::Debug for ViewportTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportTracker")
            .field("window", &self.window)
            .field("dispatcher", &self.dispatcher)
            .field("last_corners", &self.last_corners)
            .finish()
    }
}
