//! Prelude module for common mapsync types and traits
//!
//! `use mapsync::prelude::*;` brings in what an application needs to wire a
//! renderer and its overlays to the tracker.

pub use crate::core::{
    config::{
        DispatchPolicy, InitialView, SyncConfig, TrackingProfile, TrackingTiming, WindowGeometry,
    },
    geo::{GeoPoint, Point, SpaceTimeBox, TileBox, ViewportBox},
    projection,
    time_range::{SharedTimeRange, TimeRangeSource},
};

#[cfg(feature = "tokio-runtime")]
pub use crate::core::{builder::MapSyncBuilder, map::MapSync};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::TrackingStats;

pub use crate::input::events::{GestureEvent, LifecycleEvent};

pub use crate::overlay::{OverlayDispatcher, OverlayObserver, ScaleIndicator};

pub use crate::renderer::{simulated::SimulatedRenderer, MapRenderer};

pub use crate::tracking::{SampleOutcome, SharedViewport};

pub use crate::{MapError, Result};

pub use std::{sync::Arc, time::Duration};
