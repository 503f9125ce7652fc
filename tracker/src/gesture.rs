//! Long-press drag recognition.
//!
//! Input arrives as discrete events stamped with the time they happened, so
//! the long-press timer is just a comparison against the press instant.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::placement::Point;

pub const LONG_PRESS: Duration = Duration::from_millis(500);

/// Movement past this on either axis before the long press fires turns the
/// press into a scroll or tap.
pub const MOVE_TOLERANCE: f64 = 5.0;

/// Half the sticker size. The ghost is centred under the pointer.
pub const GHOST_OFFSET: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragSource {
    /// The sticker offered for today.
    TodayPick,
    /// A filled grid slot. Only today's slot is ever draggable.
    Slot(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Pending {
        source: DragSource,
        origin: Point,
        pressed_at: Instant,
    },
    Dragging {
        source: DragSource,
        position: Point,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Press {
        source: DragSource,
        at: Point,
        time: Instant,
    },
    Move {
        to: Point,
        time: Instant,
    },
    Tick {
        time: Instant,
    },
    Release {
        at: Point,
        time: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    Pending,
    DragStarted(DragSource),
    Moved(Point),
    Cancelled,
    Tapped(DragSource),
    Dropped { source: DragSource, at: Point },
}

#[derive(Debug, Clone, Default)]
pub struct Gesture {
    state: GestureState,
}

impl Gesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn dragging_source(&self) -> Option<DragSource> {
        match self.state {
            GestureState::Dragging { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn pointer(&self) -> Option<Point> {
        match self.state {
            GestureState::Dragging { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Top-left corner of the drag ghost while dragging.
    pub fn ghost_origin(&self) -> Option<Point> {
        self.pointer()
            .map(|p| p.offset(-GHOST_OFFSET, -GHOST_OFFSET))
    }

    /// Drops whatever is in progress without producing an outcome.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn handle(&mut self, event: GestureEvent) -> GestureOutcome {
        let outcome = match (self.state, event) {
            (GestureState::Idle, GestureEvent::Press { source, at, time }) => {
                self.state = GestureState::Pending {
                    source,
                    origin: at,
                    pressed_at: time,
                };
                GestureOutcome::Pending
            }
            // one drag at a time
            (_, GestureEvent::Press { .. }) => GestureOutcome::Ignored,

            (
                GestureState::Pending {
                    source,
                    origin,
                    pressed_at,
                },
                GestureEvent::Move { to, time },
            ) => {
                if held_long_enough(pressed_at, time) {
                    self.state = GestureState::Dragging {
                        source,
                        position: to,
                    };
                    GestureOutcome::DragStarted(source)
                } else if (to.x - origin.x).abs() > MOVE_TOLERANCE
                    || (to.y - origin.y).abs() > MOVE_TOLERANCE
                {
                    self.state = GestureState::Idle;
                    GestureOutcome::Cancelled
                } else {
                    GestureOutcome::Pending
                }
            }
            (
                GestureState::Pending {
                    source,
                    origin,
                    pressed_at,
                },
                GestureEvent::Tick { time },
            ) if held_long_enough(pressed_at, time) => {
                self.state = GestureState::Dragging {
                    source,
                    position: origin,
                };
                GestureOutcome::DragStarted(source)
            }
            (
                GestureState::Pending {
                    source, pressed_at, ..
                },
                GestureEvent::Release { at, time },
            ) => {
                self.state = GestureState::Idle;
                if held_long_enough(pressed_at, time) {
                    GestureOutcome::Dropped { source, at }
                } else {
                    GestureOutcome::Tapped(source)
                }
            }

            (GestureState::Dragging { source, .. }, GestureEvent::Move { to, .. }) => {
                self.state = GestureState::Dragging {
                    source,
                    position: to,
                };
                GestureOutcome::Moved(to)
            }
            (GestureState::Dragging { source, .. }, GestureEvent::Release { at, .. }) => {
                self.state = GestureState::Idle;
                GestureOutcome::Dropped { source, at }
            }

            _ => GestureOutcome::Ignored,
        };

        if !matches!(
            outcome,
            GestureOutcome::Ignored | GestureOutcome::Pending | GestureOutcome::Moved(_)
        ) {
            tracing::debug!("gesture {:?}", outcome);
        }
        outcome
    }
}

fn held_long_enough(pressed_at: Instant, now: Instant) -> bool {
    now.saturating_duration_since(pressed_at) >= LONG_PRESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(gesture: &mut Gesture, at: Point, time: Instant) -> GestureOutcome {
        gesture.handle(GestureEvent::Press {
            source: DragSource::TodayPick,
            at,
            time,
        })
    }

    #[test]
    fn test_long_press_then_drop() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        let origin = Point::new(100.0, 100.0);

        assert_eq!(press(&mut gesture, origin, t0), GestureOutcome::Pending);
        assert_eq!(
            gesture.handle(GestureEvent::Tick {
                time: t0 + Duration::from_millis(499)
            }),
            GestureOutcome::Ignored
        );
        assert!(!gesture.is_dragging());

        assert_eq!(
            gesture.handle(GestureEvent::Tick { time: t0 + LONG_PRESS }),
            GestureOutcome::DragStarted(DragSource::TodayPick)
        );
        assert_eq!(gesture.pointer(), Some(origin));
        assert_eq!(gesture.ghost_origin(), Some(Point::new(70.0, 70.0)));

        let to = Point::new(300.0, 40.0);
        assert_eq!(
            gesture.handle(GestureEvent::Move {
                to,
                time: t0 + Duration::from_millis(700)
            }),
            GestureOutcome::Moved(to)
        );
        assert_eq!(
            gesture.handle(GestureEvent::Release {
                at: to,
                time: t0 + Duration::from_millis(800)
            }),
            GestureOutcome::Dropped {
                source: DragSource::TodayPick,
                at: to
            }
        );
        assert!(gesture.is_idle());
    }

    #[test]
    fn test_quick_release_is_a_tap() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        gesture.handle(GestureEvent::Press {
            source: DragSource::Slot(3),
            at: Point::new(0.0, 0.0),
            time: t0,
        });
        assert_eq!(
            gesture.handle(GestureEvent::Release {
                at: Point::new(1.0, 1.0),
                time: t0 + Duration::from_millis(120)
            }),
            GestureOutcome::Tapped(DragSource::Slot(3))
        );
        assert!(gesture.is_idle());
    }

    #[test]
    fn test_movement_before_long_press_cancels() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        press(&mut gesture, Point::new(50.0, 50.0), t0);

        let within = GestureEvent::Move {
            to: Point::new(55.0, 45.0),
            time: t0 + Duration::from_millis(100),
        };
        assert_eq!(gesture.handle(within), GestureOutcome::Pending);

        let past = GestureEvent::Move {
            to: Point::new(50.0, 56.0),
            time: t0 + Duration::from_millis(200),
        };
        assert_eq!(gesture.handle(past), GestureOutcome::Cancelled);
        assert!(gesture.is_idle());

        // the late tick has nothing to promote
        assert_eq!(
            gesture.handle(GestureEvent::Tick { time: t0 + LONG_PRESS }),
            GestureOutcome::Ignored
        );
    }

    #[test]
    fn test_move_after_deadline_starts_drag() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        press(&mut gesture, Point::new(50.0, 50.0), t0);

        let to = Point::new(90.0, 50.0);
        assert_eq!(
            gesture.handle(GestureEvent::Move {
                to,
                time: t0 + Duration::from_millis(600)
            }),
            GestureOutcome::DragStarted(DragSource::TodayPick)
        );
        assert_eq!(gesture.pointer(), Some(to));
    }

    #[test]
    fn test_late_release_without_tick_is_a_drop() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        press(&mut gesture, Point::new(50.0, 50.0), t0);

        let at = Point::new(52.0, 50.0);
        assert_eq!(
            gesture.handle(GestureEvent::Release {
                at,
                time: t0 + Duration::from_secs(1)
            }),
            GestureOutcome::Dropped {
                source: DragSource::TodayPick,
                at
            }
        );
    }

    #[test]
    fn test_second_press_is_ignored() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        press(&mut gesture, Point::new(0.0, 0.0), t0);
        let before = gesture.state();

        assert_eq!(
            gesture.handle(GestureEvent::Press {
                source: DragSource::Slot(0),
                at: Point::new(10.0, 10.0),
                time: t0 + Duration::from_millis(10),
            }),
            GestureOutcome::Ignored
        );
        assert_eq!(gesture.state(), before);
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let t0 = Instant::now();
        let mut gesture = Gesture::new();
        assert_eq!(
            gesture.handle(GestureEvent::Release {
                at: Point::default(),
                time: t0
            }),
            GestureOutcome::Ignored
        );
        assert_eq!(
            gesture.handle(GestureEvent::Move {
                to: Point::default(),
                time: t0
            }),
            GestureOutcome::Ignored
        );
        assert_eq!(gesture.ghost_origin(), None);
    }
}
