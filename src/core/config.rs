//! Configuration for viewport tracking
//!
//! All tuning lives in an explicit [`SyncConfig`] handed to the builder; there
//! is no global preference state. Timing comes from a preset profile that can
//! be resolved into concrete values or replaced wholesale with custom ones.

use crate::{
    constants::{
        AUTOZOOM_PAN_EASE_MS, AUTOZOOM_ZOOM_EASE_MS, PAN_EASE_MS, POLL_STEP_MS, ZOOM_EASE_MS,
        ZOOM_STEP,
    },
    core::geo::Point,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackingProfile {
    Balanced,
    Responsive,
    BatterySaver,
    Custom(TrackingTiming),
}

impl TrackingProfile {
    pub fn resolve(&self) -> TrackingTiming {
        match self {
            Self::Balanced => TrackingTiming {
                poll_step_ms: POLL_STEP_MS,
                zoom_step: ZOOM_STEP,
                zoom_ease_ms: ZOOM_EASE_MS,
                pan_ease_ms: PAN_EASE_MS,
                fit_pan_ease_ms: AUTOZOOM_PAN_EASE_MS,
                fit_zoom_ease_ms: AUTOZOOM_ZOOM_EASE_MS,
            },
            Self::Responsive => TrackingTiming {
                poll_step_ms: 100,
                zoom_step: 1.0,
                zoom_ease_ms: 300,
                pan_ease_ms: 300,
                fit_pan_ease_ms: 600,
                fit_zoom_ease_ms: 600,
            },
            Self::BatterySaver => TrackingTiming {
                poll_step_ms: 500,
                zoom_step: 2.0,
                zoom_ease_ms: 500,
                pan_ease_ms: 500,
                fit_pan_ease_ms: 1000,
                fit_zoom_ease_ms: 1000,
            },
            Self::Custom(timing) => timing.clone(),
        }
    }
}

impl Default for TrackingProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Delays and ease durations, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingTiming {
    /// Delay between settle checks while the map keeps moving
    pub poll_step_ms: u64,
    /// Zoom levels added or removed per zoom in/out
    pub zoom_step: f64,
    pub zoom_ease_ms: u64,
    pub pan_ease_ms: u64,
    pub fit_pan_ease_ms: u64,
    pub fit_zoom_ease_ms: u64,
}

impl TrackingTiming {
    pub fn poll_step(&self) -> Duration {
        Duration::from_millis(self.poll_step_ms)
    }

    pub fn zoom_ease(&self) -> Duration {
        Duration::from_millis(self.zoom_ease_ms)
    }

    pub fn pan_ease(&self) -> Duration {
        Duration::from_millis(self.pan_ease_ms)
    }

    pub fn fit_pan_ease(&self) -> Duration {
        Duration::from_millis(self.fit_pan_ease_ms)
    }

    pub fn fit_zoom_ease(&self) -> Duration {
        Duration::from_millis(self.fit_zoom_ease_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_step_ms == 0 {
            return Err(MapError::Config("poll_step_ms must be positive".into()));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(MapError::Config(format!(
                "zoom_step {} must be positive",
                self.zoom_step
            )));
        }
        Ok(())
    }
}

impl Default for TrackingTiming {
    fn default() -> Self {
        TrackingProfile::default().resolve()
    }
}

/// Pixel dimensions of the map surface.
///
/// The drawable height stops above any strip reserved for other UI (the time
/// scrubber), and is what overlays see. The full height is only used where the
/// renderer's own zoom semantics cover the whole canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub width_px: f64,
    pub full_height_px: f64,
    pub drawable_height_px: f64,
}

impl WindowGeometry {
    pub fn new(width_px: f64, full_height_px: f64, drawable_height_px: f64) -> Self {
        Self {
            width_px,
            full_height_px,
            drawable_height_px,
        }
    }

    /// Geometry for a window without a reserved strip
    pub fn uniform(width_px: f64, height_px: f64) -> Self {
        Self::new(width_px, height_px, height_px)
    }

    /// Bottom right corner of the drawable area
    pub fn drawable_corner(&self) -> Point {
        Point::new(self.width_px, self.drawable_height_px)
    }

    /// Bottom right corner of the whole window
    pub fn full_corner(&self) -> Point {
        Point::new(self.width_px, self.full_height_px)
    }

    /// Ratio that maps a drawable-area height onto the full canvas
    pub fn vertical_stretch(&self) -> f64 {
        self.full_height_px / self.drawable_height_px
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !(positive(self.width_px)
            && positive(self.full_height_px)
            && positive(self.drawable_height_px))
        {
            return Err(MapError::Config(format!(
                "window dimensions must be positive, got {self:?}"
            )));
        }
        if self.drawable_height_px > self.full_height_px {
            return Err(MapError::Config(format!(
                "drawable height {} exceeds window height {}",
                self.drawable_height_px, self.full_height_px
            )));
        }
        Ok(())
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::uniform(800.0, 600.0)
    }
}

/// What to do when an overlay fails while being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchPolicy {
    /// Stop the pass at the first failing overlay
    #[default]
    AbortOnError,
    /// Notify every overlay, then report all failures together
    ContinueOnError,
}

/// View to move to once tracking starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    pub lon: f64,
    pub lat: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub window: WindowGeometry,
    #[serde(default)]
    pub profile: TrackingProfile,
    #[serde(default)]
    pub dispatch_policy: DispatchPolicy,
    #[serde(default)]
    pub initial_view: Option<InitialView>,
}

impl SyncConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn timing(&self) -> TrackingTiming {
        self.profile.resolve()
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.timing().validate()?;
        if let Some(view) = &self.initial_view {
            if !(view.lon.is_finite() && view.lat.is_finite() && view.zoom.is_finite()) {
                return Err(MapError::Config(format!(
                    "initial view {view:?} is not finite"
                )));
            }
        }
        Ok(())
    }
}
