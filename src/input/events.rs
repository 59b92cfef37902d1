use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Already-classified gestures forwarded from the renderer's touch handling.
///
/// Recognizing the gesture is the renderer's job; this crate only reacts to
/// the outcome. Motion gestures tell the tracker the view may be moving,
/// pointer gestures are forwarded to the overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    /// One-finger drag
    Pan { start: Point, end: Point },
    /// Drag released with momentum
    Fling { position: Point, velocity: Point },
    /// Pinch zoom
    Scale {
        position: Point,
        factor: f64,
        velocity: f64,
    },
    /// Confirmed single tap
    SingleTap { position: Point },
    /// Finger held down long enough to start a long press
    LongPressStart { position: Point },
    /// Finger moved while long-pressing
    LongPressMove { position: Point },
    /// Finger lifted after a long press
    LongPressEnd { position: Point },
    /// Two-finger vertical drag that would tilt the camera
    Shove { distance: f64 },
    /// Two-finger twist that would rotate the map
    Rotate { position: Point, radians: f64 },
}

impl GestureEvent {
    /// Whether this gesture can move the visible region
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            GestureEvent::Pan { .. } | GestureEvent::Fling { .. } | GestureEvent::Scale { .. }
        )
    }
}

/// Host view lifecycle transitions forwarded to the overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Pause,
    Resume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_classification() {
        let pan = GestureEvent::Pan {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 5.0),
        };
        assert!(pan.is_motion());

        let tap = GestureEvent::SingleTap {
            position: Point::new(3.0, 4.0),
        };
        assert!(!tap.is_motion());

        let hold = GestureEvent::LongPressMove {
            position: Point::new(1.0, 1.0),
        };
        assert!(!hold.is_motion());

        assert!(!GestureEvent::Shove { distance: 2.0 }.is_motion());
    }
}
