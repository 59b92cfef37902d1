use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interpolation trait for values that can be smoothly transitioned
pub trait Interpolatable {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for GeoPoint {
    /// Takes the short way round the antimeridian. The longitude is left
    /// unwrapped, as a renderer would report it.
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let d_lon = GeoPoint::wrap_lon(other.lon - self.lon);
        GeoPoint::new(self.lon + d_lon * t, self.lat.lerp(&other.lat, t))
    }
}

/// Easing curves used for renderer-side transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EasingFunction {
    Linear,
    EaseInOutQuad,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// A single eased transition from one value to another
#[derive(Debug, Clone, PartialEq)]
pub struct Ease<T> {
    pub from: T,
    pub to: T,
    pub duration: Duration,
    pub easing: EasingFunction,
}

impl<T: Interpolatable + Clone> Ease<T> {
    pub fn new(from: T, to: T, duration: Duration, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    /// Value after `elapsed` has passed since the transition began
    pub fn value_at(&self, elapsed: Duration) -> T {
        if self.is_finished(elapsed) {
            return self.to.clone();
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseInOutQuad,
            EasingFunction::EaseOutCubic,
            EasingFunction::EaseInOutCubic,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12);
            assert_eq!(easing.apply(-3.0), 0.0);
        }
        assert!(EasingFunction::EaseOutCubic.apply(0.5) > 0.5);
    }

    #[test]
    fn test_ease_value_at() {
        let ease = Ease::new(10.0, 20.0, Duration::from_millis(100), EasingFunction::Linear);
        assert_eq!(ease.value_at(Duration::ZERO), 10.0);
        assert!((ease.value_at(Duration::from_millis(50)) - 15.0).abs() < 1e-9);
        assert_eq!(ease.value_at(Duration::from_millis(150)), 20.0);
        assert!(ease.is_finished(Duration::from_millis(100)));

        let instant = Ease::new(1.0, 2.0, Duration::ZERO, EasingFunction::Linear);
        assert_eq!(instant.value_at(Duration::ZERO), 2.0);
    }

    #[test]
    fn test_geo_lerp_crosses_antimeridian() {
        let from = GeoPoint::new(170.0, 0.0);
        let to = GeoPoint::new(-170.0, 10.0);
        let mid = from.lerp(&to, 0.5);
        assert!((mid.lon - 180.0).abs() < 1e-9);
        assert!((mid.lat - 5.0).abs() < 1e-9);
    }
}
