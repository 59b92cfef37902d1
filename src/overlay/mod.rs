//! Overlays: the consumers of visible-region changes
//!
//! An overlay draws application content (points, trails, selections) on top of
//! the map and keeps its own spatial queries in step with the visible
//! [`SpaceTimeBox`]. All callbacks run on the tracking worker, one overlay at
//! a time, in registration order.

pub mod dispatcher;

use crate::{
    core::geo::{Point, SpaceTimeBox},
    Result,
};

pub use dispatcher::OverlayDispatcher;

pub trait OverlayObserver: Send {
    /// Name used in logs
    fn name(&self) -> &str {
        "overlay"
    }

    /// The visible region or the displayed time window changed
    fn notify_screen_changed(&mut self, region: &SpaceTimeBox) -> Result<()>;

    fn on_pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_tap(&mut self, _position: Point) -> Result<()> {
        Ok(())
    }

    fn on_long_press_start(&mut self, _position: Point) -> Result<()> {
        Ok(())
    }

    /// `start` is where the long press began
    fn on_long_press_move(&mut self, _start: Point, _current: Point) -> Result<()> {
        Ok(())
    }

    fn on_long_press_end(&mut self, _start: Point, _end: Point) -> Result<()> {
        Ok(())
    }
}

/// A map scale bar, refreshed after every sample
pub trait ScaleIndicator: Send {
    fn update(&mut self, pixels_per_meter: f64);
}
