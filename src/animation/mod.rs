pub mod easing;

// Re-export commonly used types and functions for convenience
pub use easing::{Ease, EasingFunction, Interpolatable};
