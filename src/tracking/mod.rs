//! Viewport tracking: sampling the renderer, deciding when to sample again,
//! and steering the camera towards a region.

pub mod planner;
pub mod scheduler;
pub mod viewport;

pub use planner::{FitPlan, PanZoomPlanner};
pub use scheduler::{DebounceScheduler, PollPhase};
pub use viewport::{SampleOutcome, SharedViewport, TrackedViewport, ViewportTracker};
