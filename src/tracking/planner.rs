//! Eased pan/zoom commands that bring a region into view.
//!
//! The renderer's zoom is a power-of-two scale defined over its whole
//! canvas, so fitting works on the full window and stretches the target's
//! vertical extent to make up for the strip hidden under other UI.

use crate::{
    core::{
        config::{TrackingTiming, WindowGeometry},
        geo::{GeoPoint, Point, TileBox},
        projection,
    },
    renderer::MapRenderer,
    MapError, Result,
};
use std::time::Duration;

/// Camera move computed by the planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPlan {
    pub center: GeoPoint,
    pub zoom: f64,
    pub pan_ease: Duration,
    pub zoom_ease: Duration,
}

impl FitPlan {
    /// Delay before the first settle check after issuing the plan
    pub fn settle_delay(&self) -> Duration {
        self.pan_ease / 2
    }
}

/// Rejects targets without a positive width and height, including boxes too
/// large for their extent to be represented
pub fn validate_target(target: &TileBox) -> Result<()> {
    let width = target.max_x.checked_sub(target.min_x);
    let height = target.max_y.checked_sub(target.min_y);
    if !matches!((width, height), (Some(w), Some(h)) if w > 0 && h > 0) {
        return Err(MapError::DegenerateRegion(format!(
            "target {target:?} must have a positive width and height"
        )));
    }
    Ok(())
}

/// How many times the view must be magnified so that `target` just fits in
/// `current`. The tighter axis decides, so the target is never cropped.
pub fn fit_zoom_multiplier(current: &TileBox, target: &TileBox) -> Result<f64> {
    validate_target(target)?;
    fit_multiplier(current, target.width() as f64, target.height() as f64)
}

fn fit_multiplier(current: &TileBox, target_width: f64, target_height: f64) -> Result<f64> {
    let current_width = current.wrapped_width();
    let current_height = current.height();
    if current_width <= 0 || current_height <= 0 {
        return Err(MapError::DegenerateRegion(format!(
            "visible region {current:?} has no extent"
        )));
    }

    Ok(f64::min(
        current_width as f64 / target_width,
        current_height as f64 / target_height,
    ))
}

#[derive(Debug, Clone)]
pub struct PanZoomPlanner {
    window: WindowGeometry,
    timing: TrackingTiming,
}

impl PanZoomPlanner {
    pub fn new(window: WindowGeometry, timing: TrackingTiming) -> Self {
        Self { window, timing }
    }

    pub fn window(&self) -> WindowGeometry {
        self.window
    }

    pub fn set_window(&mut self, window: WindowGeometry) {
        self.window = window;
    }

    /// Plans the pan and zoom that fit `target`, a region expressed in
    /// drawable-area terms, into view.
    ///
    /// Degenerate targets are rejected before the renderer is consulted.
    /// Returns `Ok(None)` while the renderer is not ready.
    pub fn plan_fit(&self, renderer: &dyn MapRenderer, target: &TileBox) -> Result<Option<FitPlan>> {
        validate_target(target)?;

        let zoom = renderer.zoom();
        let top_left = renderer.screen_to_geo(Point::new(0.0, 0.0));
        let bottom_right = renderer.screen_to_geo(self.window.full_corner());
        let (Some(zoom), Some(top_left), Some(bottom_right)) = (zoom, top_left, bottom_right) else {
            log::debug!("Renderer not ready, cannot fit {:?}", target);
            return Ok(None);
        };

        let current =
            projection::tile_box_from_corners(&top_left.normalized(), &bottom_right.normalized())?;

        // Fitting the target inside the drawable area means fitting a
        // proportionally taller box inside the whole window
        let target_width = target.width() as f64;
        let target_height = target.height() as f64 * self.window.vertical_stretch();

        let multiplier = fit_multiplier(&current, target_width, target_height)?;
        let new_zoom = zoom + multiplier.log2();

        let center_x = target.min_x as f64 + target_width / 2.0;
        let center_y = target.min_y as f64 + target_height / 2.0;
        let center = GeoPoint::new(
            projection::from_tile_x(center_x.round() as i64),
            projection::from_tile_y(center_y.round() as i64),
        );

        log::debug!(
            "Fitting {:?} from {:?}: x{:.3} magnification, zoom {:.3} -> {:.3}",
            target,
            current,
            multiplier,
            zoom,
            new_zoom
        );

        Ok(Some(FitPlan {
            center,
            zoom: new_zoom,
            pan_ease: self.timing.fit_pan_ease(),
            zoom_ease: self.timing.fit_zoom_ease(),
        }))
    }

    /// Plans a move to an explicit center and zoom
    pub fn plan_view(&self, center: GeoPoint, zoom: f64) -> Result<FitPlan> {
        if !center.is_finite() || !zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "cannot move to {center:?} at zoom {zoom}"
            )));
        }

        Ok(FitPlan {
            center: center.normalized(),
            zoom,
            pan_ease: self.timing.fit_pan_ease(),
            zoom_ease: self.timing.fit_zoom_ease(),
        })
    }

    /// Issues the plan's eased commands. Returns the initial settle-check delay.
    pub fn apply(&self, renderer: &dyn MapRenderer, plan: &FitPlan) -> Duration {
        renderer.set_position_eased(plan.center, plan.pan_ease);
        renderer.set_zoom_eased(plan.zoom, plan.zoom_ease);
        plan.settle_delay()
    }

    /// Pans to `center` keeping the zoom. Returns the settle-check delay.
    pub fn pan_to(&self, renderer: &dyn MapRenderer, center: GeoPoint) -> Result<Duration> {
        if !center.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "cannot pan to {center:?}"
            )));
        }
        let ease = self.timing.pan_ease();
        renderer.set_position_eased(center.normalized(), ease);
        Ok(ease / 2)
    }

    /// Zooms in (positive) or out (negative) by `levels` around the current
    /// center. Returns the settle-check delay, or `None` while the renderer
    /// is not ready.
    pub fn zoom_by(&self, renderer: &dyn MapRenderer, levels: f64) -> Option<Duration> {
        let zoom = renderer.zoom()?;
        let ease = self.timing.zoom_ease();
        renderer.set_zoom_eased(zoom + levels, ease);
        Some(ease / 2)
    }
}
