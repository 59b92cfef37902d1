use crate::{
    core::{
        config::DispatchPolicy,
        geo::{Point, SpaceTimeBox},
    },
    input::events::{GestureEvent, LifecycleEvent},
    overlay::OverlayObserver,
    MapError, Result,
};

/// Fans events out to the registered overlays.
///
/// Overlays are added while the tracker is being assembled; once the
/// dispatcher has been handed to the tracking worker the list is fixed.
/// Every pass runs synchronously on the caller's thread in registration order.
pub struct OverlayDispatcher {
    observers: Vec<Box<dyn OverlayObserver>>,
    policy: DispatchPolicy,
    /// Where the current long press started
    long_press_anchor: Option<Point>,
}

impl OverlayDispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            observers: Vec::new(),
            policy,
            long_press_anchor: None,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn OverlayObserver>) {
        log::debug!("Registering overlay '{}'", observer.name());
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify_screen_changed(&mut self, region: &SpaceTimeBox) -> Result<()> {
        self.for_each(|observer| observer.notify_screen_changed(region))
    }

    pub fn lifecycle(&mut self, event: LifecycleEvent) -> Result<()> {
        match event {
            LifecycleEvent::Pause => self.for_each(|observer| observer.on_pause()),
            LifecycleEvent::Resume => self.for_each(|observer| observer.on_resume()),
        }
    }

    /// Forwards taps and long presses. Other gestures are ignored here.
    pub fn route_pointer(&mut self, gesture: &GestureEvent) -> Result<()> {
        match *gesture {
            GestureEvent::SingleTap { position } => {
                self.for_each(|observer| observer.on_tap(position))
            }
            GestureEvent::LongPressStart { position } => {
                self.long_press_anchor = Some(position);
                self.for_each(|observer| observer.on_long_press_start(position))
            }
            GestureEvent::LongPressMove { position } => {
                let start = *self.long_press_anchor.get_or_insert(position);
                self.for_each(|observer| observer.on_long_press_move(start, position))
            }
            GestureEvent::LongPressEnd { position } => {
                let start = self.long_press_anchor.take().unwrap_or(position);
                self.for_each(|observer| observer.on_long_press_end(start, position))
            }
            _ => Ok(()),
        }
    }

    fn for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut dyn OverlayObserver) -> Result<()>,
    {
        match self.policy {
            DispatchPolicy::AbortOnError => {
                for observer in self.observers.iter_mut() {
                    if let Err(e) = f(observer.as_mut()) {
                        log::error!("Overlay '{}' failed, aborting pass: {}", observer.name(), e);
                        return Err(e);
                    }
                }
                Ok(())
            }
            DispatchPolicy::ContinueOnError => {
                let mut failures = Vec::new();
                for observer in self.observers.iter_mut() {
                    if let Err(e) = f(observer.as_mut()) {
                        log::error!("Overlay '{}' failed: {}", observer.name(), e);
                        failures.push(e);
                    }
                }
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(MapError::Dispatch(failures))
                }
            }
        }
    }
}

impl Default for OverlayDispatcher {
    fn default() -> Self {
        Self::new(DispatchPolicy::default())
    }
}

impl std::fmt::Debug for OverlayDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayDispatcher")
            .field("observers", &self.observers.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::TileBox;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Recorder {
        fn boxed(name: &str, log: &Arc<Mutex<Vec<String>>>, fail: bool) -> Box<dyn OverlayObserver> {
            Box::new(Self {
                name: name.to_string(),
                log: log.clone(),
                fail,
            })
        }

        fn record(&self, what: String) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, what));
            if self.fail {
                Err(MapError::observer(&self.name, "boom"))
            } else {
                Ok(())
            }
        }
    }

    impl OverlayObserver for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn notify_screen_changed(&mut self, region: &SpaceTimeBox) -> Result<()> {
            self.record(format!("screen{}", region.tiles.min_x))
        }

        fn on_pause(&mut self) -> Result<()> {
            self.record("pause".into())
        }

        fn on_long_press_move(&mut self, start: Point, current: Point) -> Result<()> {
            self.record(format!("move{}-{}", start.x, current.x))
        }

        fn on_long_press_end(&mut self, start: Point, end: Point) -> Result<()> {
            self.record(format!("end{}-{}", start.x, end.x))
        }
    }

    fn region(min_x: i64) -> SpaceTimeBox {
        SpaceTimeBox::new(TileBox::new(min_x, 0, min_x + 10, 10), 0, 60)
    }

    #[test]
    fn test_notifies_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = OverlayDispatcher::default();
        dispatcher.add_observer(Recorder::boxed("a", &log, false));
        dispatcher.add_observer(Recorder::boxed("b", &log, false));
        dispatcher.add_observer(Recorder::boxed("c", &log, false));

        dispatcher.notify_screen_changed(&region(7)).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a:screen7", "b:screen7", "c:screen7"]);
    }

    #[test]
    fn test_failure_aborts_only_the_current_pass() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = OverlayDispatcher::new(DispatchPolicy::AbortOnError);
        dispatcher.add_observer(Recorder::boxed("a", &log, false));
        dispatcher.add_observer(Recorder::boxed("bad", &log, true));
        dispatcher.add_observer(Recorder::boxed("c", &log, false));

        let err = dispatcher.notify_screen_changed(&region(1)).unwrap_err();
        assert!(matches!(err, MapError::Observer { ref observer, .. } if observer == "bad"));
        assert_eq!(*log.lock().unwrap(), vec!["a:screen1", "bad:screen1"]);

        // The next pass starts from the first overlay again
        log.lock().unwrap().clear();
        let _ = dispatcher.notify_screen_changed(&region(2));
        assert_eq!(*log.lock().unwrap(), vec!["a:screen2", "bad:screen2"]);
    }

    #[test]
    fn test_continue_policy_collects_failures() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = OverlayDispatcher::new(DispatchPolicy::ContinueOnError);
        dispatcher.add_observer(Recorder::boxed("bad1", &log, true));
        dispatcher.add_observer(Recorder::boxed("ok", &log, false));
        dispatcher.add_observer(Recorder::boxed("bad2", &log, true));

        match dispatcher.lifecycle(LifecycleEvent::Pause) {
            Err(MapError::Dispatch(failures)) => assert_eq!(failures.len(), 2),
            other => panic!("expected collected failures, got {other:?}"),
        }
        assert_eq!(
            *log.lock().unwrap(),
            vec!["bad1:pause", "ok:pause", "bad2:pause"]
        );
    }

    #[test]
    fn test_long_press_carries_anchor() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = OverlayDispatcher::default();
        dispatcher.add_observer(Recorder::boxed("a", &log, false));

        let at = |x: f64| Point::new(x, 0.0);
        dispatcher
            .route_pointer(&GestureEvent::LongPressStart { position: at(1.0) })
            .unwrap();
        dispatcher
            .route_pointer(&GestureEvent::LongPressMove { position: at(4.0) })
            .unwrap();
        dispatcher
            .route_pointer(&GestureEvent::LongPressEnd { position: at(9.0) })
            .unwrap();
        // Motion gestures are not pointer events
        dispatcher
            .route_pointer(&GestureEvent::Fling {
                position: at(0.0),
                velocity: at(1.0),
            })
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a:move1-4", "a:end1-9"]);
    }
}
