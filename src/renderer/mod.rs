//! The boundary to the external map renderer
//!
//! The renderer draws the map and owns the camera. It answers coordinate
//! queries synchronously and accepts eased camera commands, but never reports
//! that the camera moved; that is what the tracker polls for.

pub mod simulated;

use crate::core::geo::{GeoPoint, Point};
use std::time::Duration;

pub use simulated::SimulatedRenderer;

pub trait MapRenderer: Send + Sync {
    /// Geographic coordinate under a pixel of the map surface.
    ///
    /// Returns `None` while the renderer is not ready (scene still loading).
    /// The longitude may lie outside `[-180, 180)` after the user has wrapped
    /// around the world.
    fn screen_to_geo(&self, pixel: Point) -> Option<GeoPoint>;

    /// Current zoom level, where each level doubles the scale.
    /// `None` while the renderer is not ready.
    fn zoom(&self) -> Option<f64>;

    /// Animate the zoom to `zoom` over `duration`
    fn set_zoom_eased(&self, zoom: f64, duration: Duration);

    /// Animate the map center to `center` over `duration`
    fn set_position_eased(&self, center: GeoPoint, duration: Duration);
}
