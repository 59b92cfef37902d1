//! # mapsync
//!
//! Keeps an application's spatial index in step with the visible region of a
//! pannable, zoomable map drawn by an external renderer.
//!
//! The renderer only answers synchronous screen/geographic queries and accepts
//! eased pan/zoom commands; it never reports that the map moved. This crate
//! therefore polls the renderer after every motion signal until the view
//! settles, converts the visible corners into tile-addressing space and fans the
//! resulting region out to registered overlays.

pub mod animation;
pub mod core;
pub mod input;
pub mod overlay;
pub mod renderer;
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
pub mod tracking;
pub mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{DispatchPolicy, SyncConfig, TrackingProfile, TrackingTiming, WindowGeometry},
    geo::{GeoPoint, Point, SpaceTimeBox, TileBox, ViewportBox},
    time_range::{SharedTimeRange, TimeRangeSource},
};

#[cfg(feature = "tokio-runtime")]
pub use core::{builder::MapSyncBuilder, map::MapSync};

#[cfg(feature = "tokio-runtime")]
pub use runtime::TrackingStats;

pub use input::events::{GestureEvent, LifecycleEvent};

pub use overlay::{dispatcher::OverlayDispatcher, OverlayObserver, ScaleIndicator};

pub use renderer::{simulated::SimulatedRenderer, MapRenderer};

pub use tracking::{
    planner::{FitPlan, PanZoomPlanner},
    scheduler::{DebounceScheduler, PollPhase},
    viewport::{SampleOutcome, SharedViewport, ViewportTracker},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Degenerate region: {0}")]
    DegenerateRegion(String),

    #[error("Overlay '{observer}' failed: {message}")]
    Observer { observer: String, message: String },

    #[error("{} overlay(s) failed during dispatch", .0.len())]
    Dispatch(Vec<MapError>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl MapError {
    /// Convenience constructor for observer implementations
    pub fn observer(observer: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::Observer {
            observer: observer.into(),
            message: message.into(),
        }
    }
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger`, configured from `RUST_LOG`. Later calls are no-ops.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
