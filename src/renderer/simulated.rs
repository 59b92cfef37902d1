//! An in-process Web Mercator renderer
//!
//! Behaves like a real map engine from the tracker's point of view: eased
//! camera commands animate over time, coordinate queries reflect the camera at
//! the moment they are made, and nothing is ever pushed to the caller. Used by
//! the demo application and the test suite.

use crate::{
    animation::{Ease, EasingFunction},
    constants::MAX_MERCATOR_LATITUDE,
    core::geo::{GeoPoint, Point},
    renderer::MapRenderer,
};
use std::f64::consts::PI;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

// Follow tokio's clock so paused-time tests drive the animations too
#[cfg(feature = "tokio-runtime")]
use tokio::time::Instant;
#[cfg(not(feature = "tokio-runtime"))]
use std::time::Instant;

/// Size of one map tile in pixels; zoom `z` shows the world `256 * 2^z` wide
const TILE_SIZE: f64 = 256.0;

#[derive(Debug)]
struct Camera {
    ready: bool,
    window: Point,
    center: GeoPoint,
    zoom: f64,
    center_ease: Option<(Ease<GeoPoint>, Instant)>,
    zoom_ease: Option<(Ease<f64>, Instant)>,
    easing: EasingFunction,
}

impl Camera {
    /// Folds finished animations into the resting state
    fn settle(&mut self, now: Instant) {
        if let Some((ease, started)) = &self.center_ease {
            let elapsed = now.saturating_duration_since(*started);
            if ease.is_finished(elapsed) {
                self.center = ease.to;
                self.center_ease = None;
            }
        }
        if let Some((ease, started)) = &self.zoom_ease {
            let elapsed = now.saturating_duration_since(*started);
            if ease.is_finished(elapsed) {
                self.zoom = ease.to;
                self.zoom_ease = None;
            }
        }
    }

    fn center_at(&self, now: Instant) -> GeoPoint {
        match &self.center_ease {
            Some((ease, started)) => ease.value_at(now.saturating_duration_since(*started)),
            None => self.center,
        }
    }

    fn zoom_at(&self, now: Instant) -> f64 {
        match &self.zoom_ease {
            Some((ease, started)) => ease.value_at(now.saturating_duration_since(*started)),
            None => self.zoom,
        }
    }
}

/// Thread-safe simulated renderer
#[derive(Debug)]
pub struct SimulatedRenderer {
    camera: Mutex<Camera>,
}

impl SimulatedRenderer {
    /// Creates a ready renderer showing `center` at `zoom` in a window of
    /// `window` pixels
    pub fn new(window: Point, center: GeoPoint, zoom: f64) -> Self {
        Self {
            camera: Mutex::new(Camera {
                ready: true,
                window,
                center: clamp_center(center),
                zoom,
                center_ease: None,
                zoom_ease: None,
                easing: EasingFunction::default(),
            }),
        }
    }

    /// Creates a renderer whose scene has not finished loading
    pub fn pending(window: Point, center: GeoPoint, zoom: f64) -> Self {
        let renderer = Self::new(window, center, zoom);
        renderer.set_ready(false);
        renderer
    }

    pub fn set_ready(&self, ready: bool) {
        self.camera().ready = ready;
    }

    pub fn set_window_size(&self, window: Point) {
        self.camera().window = window;
    }

    /// Moves the camera immediately, cancelling running animations.
    /// Stands in for the user dragging the map.
    pub fn jump_to(&self, center: GeoPoint, zoom: f64) {
        let mut camera = self.camera();
        camera.center = clamp_center(center);
        camera.zoom = zoom;
        camera.center_ease = None;
        camera.zoom_ease = None;
    }

    /// Drags the map content by a pixel offset, like a one-finger pan
    pub fn pan_by_pixels(&self, delta: Point) {
        let now = Instant::now();
        let mut camera = self.camera();
        camera.settle(now);
        let zoom = camera.zoom_at(now);
        let center = project(&camera.center_at(now), zoom).subtract(&delta);
        camera.center = clamp_center(unproject(&center, zoom));
        camera.center_ease = None;
    }

    /// Center of the view right now
    pub fn center(&self) -> GeoPoint {
        let now = Instant::now();
        let camera = self.camera();
        camera.center_at(now)
    }

    pub fn is_animating(&self) -> bool {
        let now = Instant::now();
        let mut camera = self.camera();
        camera.settle(now);
        camera.center_ease.is_some() || camera.zoom_ease.is_some()
    }

    fn camera(&self) -> MutexGuard<'_, Camera> {
        // The camera is plain data and stays consistent even if a holder panicked
        self.camera.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MapRenderer for SimulatedRenderer {
    fn screen_to_geo(&self, pixel: Point) -> Option<GeoPoint> {
        let now = Instant::now();
        let camera = self.camera();
        if !camera.ready {
            return None;
        }

        let zoom = camera.zoom_at(now);
        let center = project(&camera.center_at(now), zoom);
        let offset = Point::new(
            pixel.x - camera.window.x / 2.0,
            pixel.y - camera.window.y / 2.0,
        );
        Some(unproject(&center.add(&offset), zoom))
    }

    fn zoom(&self) -> Option<f64> {
        let now = Instant::now();
        let camera = self.camera();
        camera.ready.then(|| camera.zoom_at(now))
    }

    fn set_zoom_eased(&self, zoom: f64, duration: Duration) {
        let now = Instant::now();
        let mut camera = self.camera();
        if !camera.ready {
            log::debug!("Ignoring zoom command, renderer not ready");
            return;
        }
        camera.settle(now);
        let from = camera.zoom_at(now);
        let easing = camera.easing;
        camera.zoom_ease = Some((Ease::new(from, zoom, duration, easing), now));
    }

    fn set_position_eased(&self, center: GeoPoint, duration: Duration) {
        let now = Instant::now();
        let mut camera = self.camera();
        if !camera.ready {
            log::debug!("Ignoring position command, renderer not ready");
            return;
        }
        camera.settle(now);
        let from = camera.center_at(now);
        let easing = camera.easing;
        camera.center_ease = Some((
            Ease::new(from, clamp_center(center), duration, easing),
            now,
        ));
    }
}

fn clamp_center(center: GeoPoint) -> GeoPoint {
    GeoPoint::new(
        center.lon,
        center.lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE),
    )
}

/// Projects a coordinate to world pixels at the given zoom (EPSG:3857).
/// Longitudes are not wrapped, so the world repeats horizontally.
fn project(point: &GeoPoint, zoom: f64) -> Point {
    let scale = TILE_SIZE * 2_f64.powf(zoom);
    let lat_rad = point.lat.to_radians();

    let x = (point.lon + 180.0) / 360.0 * scale;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * scale;
    Point::new(x, y)
}

/// Inverse of [`project`]
fn unproject(pixel: &Point, zoom: f64) -> GeoPoint {
    let scale = TILE_SIZE * 2_f64.powf(zoom);

    let lon = pixel.x / scale * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * pixel.y / scale)).sinh().atan().to_degrees();
    GeoPoint::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> SimulatedRenderer {
        SimulatedRenderer::new(Point::new(512.0, 512.0), GeoPoint::new(0.0, 0.0), 1.0)
    }

    #[test]
    fn test_center_pixel_maps_to_center() {
        let r = renderer();
        let center = r.screen_to_geo(Point::new(256.0, 256.0)).unwrap();
        assert!(center.lon.abs() < 1e-9);
        assert!(center.lat.abs() < 1e-9);
    }

    #[test]
    fn test_whole_world_at_zoom_one() {
        // 512 pixels at zoom 1 is exactly one world width
        let r = renderer();
        let top_left = r.screen_to_geo(Point::new(0.0, 0.0)).unwrap();
        let bottom_right = r.screen_to_geo(Point::new(512.0, 512.0)).unwrap();
        assert!((top_left.lon + 180.0).abs() < 1e-9);
        assert!((bottom_right.lon - 180.0).abs() < 1e-9);
        assert!((top_left.lat - MAX_MERCATOR_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn test_wrapped_longitudes_are_reported_raw() {
        let r = renderer();
        r.jump_to(GeoPoint::new(179.0, 0.0), 4.0);
        let right = r.screen_to_geo(Point::new(512.0, 256.0)).unwrap();
        assert!(right.lon > 180.0);
    }

    #[test]
    fn test_pending_renderer_answers_nothing() {
        let r = SimulatedRenderer::pending(Point::new(100.0, 100.0), GeoPoint::default(), 3.0);
        assert!(r.screen_to_geo(Point::new(0.0, 0.0)).is_none());
        assert!(r.zoom().is_none());

        r.set_zoom_eased(5.0, Duration::ZERO);
        r.set_ready(true);
        assert_eq!(r.zoom(), Some(3.0));
    }

    #[test]
    fn test_zero_duration_commands_apply_immediately() {
        let r = renderer();
        r.set_zoom_eased(4.0, Duration::ZERO);
        r.set_position_eased(GeoPoint::new(10.0, 20.0), Duration::ZERO);
        assert_eq!(r.zoom(), Some(4.0));
        let center = r.center();
        assert!((center.lon - 10.0).abs() < 1e-9);
        assert!((center.lat - 20.0).abs() < 1e-9);
        assert!(!r.is_animating());
    }

    #[test]
    fn test_pan_by_pixels_moves_content() {
        let r = renderer();
        // Dragging the content right moves the camera west
        r.pan_by_pixels(Point::new(64.0, 0.0));
        assert!(r.center().lon < 0.0);
    }
}
