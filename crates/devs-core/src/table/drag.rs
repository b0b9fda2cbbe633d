//! Drag gestures: activation thresholds that tell a click from a drag, and the
//! single active-drag slot of a table.

use serde::{Deserialize, Serialize};

/// Pointer sensors activate once the pointer travelled this far (px).
pub const POINTER_ACTIVATION_DISTANCE: f64 = 8.0;

/// Touch sensors activate after the finger is held this long (ms)...
pub const TOUCH_ACTIVATION_DELAY_MS: u64 = 250;

/// ...without moving further than this (px). Moving more first means scrolling.
pub const TOUCH_TOLERANCE: f64 = 5.0;

/// What is being dragged. At most one drag is active per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveDrag<K> {
    Row(K),
    Column(String),
}

impl<K> ActiveDrag<K> {
    pub fn kind(&self) -> DragKind {
        match self {
            ActiveDrag::Row(_) => DragKind::Row,
            ActiveDrag::Column(_) => DragKind::Column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum DragKind {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Pending,
    Dragging,
    Cancelled,
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEnd {
    /// Released before activation: treat as a click.
    Click,
    /// Released while dragging: perform the drop.
    Drop,
    /// Touch moved before the hold delay elapsed: it was a scroll.
    Cancelled,
}

/// One press-move-release sequence on a drag handle.
#[derive(Debug, Clone)]
pub struct DragGesture {
    sensor: SensorKind,
    origin: Point,
    pressed_at_ms: u64,
    state: GestureState,
}

impl DragGesture {
    pub fn press(sensor: SensorKind, at: Point, now_ms: u64) -> Self {
        Self {
            sensor,
            origin: at,
            pressed_at_ms: now_ms,
            state: GestureState::Pending,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state == GestureState::Dragging
    }

    /// Feeds a move event. Returns `true` when this event activated the drag.
    pub fn moved(&mut self, to: Point, now_ms: u64) -> bool {
        if self.state != GestureState::Pending {
            return false;
        }
        let distance = self.origin.distance(to);
        match self.sensor {
            SensorKind::Pointer => {
                if distance >= POINTER_ACTIVATION_DISTANCE {
                    self.state = GestureState::Dragging;
                    return true;
                }
            }
            SensorKind::Touch => {
                let held = now_ms.saturating_sub(self.pressed_at_ms) >= TOUCH_ACTIVATION_DELAY_MS;
                if distance > TOUCH_TOLERANCE && !held {
                    self.state = GestureState::Cancelled;
                } else if held {
                    self.state = GestureState::Dragging;
                    return true;
                }
            }
        }
        false
    }

    /// Feeds elapsed time without movement (touch hold). Returns `true` on activation.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.state == GestureState::Pending
            && self.sensor == SensorKind::Touch
            && now_ms.saturating_sub(self.pressed_at_ms) >= TOUCH_ACTIVATION_DELAY_MS
        {
            self.state = GestureState::Dragging;
            return true;
        }
        false
    }

    pub fn release(self) -> GestureEnd {
        match self.state {
            GestureState::Pending => GestureEnd::Click,
            GestureState::Dragging => GestureEnd::Drop,
            GestureState::Cancelled => GestureEnd::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_small_move_is_a_click() {
        let mut g = DragGesture::press(SensorKind::Pointer, Point::new(10.0, 10.0), 0);
        assert!(!g.moved(Point::new(14.0, 13.0), 16));
        assert_eq!(g.release(), GestureEnd::Click);
    }

    #[test]
    fn pointer_activates_at_distance() {
        let mut g = DragGesture::press(SensorKind::Pointer, Point::new(0.0, 0.0), 0);
        assert!(g.moved(Point::new(8.0, 0.0), 5));
        assert!(g.is_dragging());
        // Further moves do not re-activate.
        assert!(!g.moved(Point::new(30.0, 0.0), 10));
        assert_eq!(g.release(), GestureEnd::Drop);
    }

    #[test]
    fn touch_requires_hold() {
        let mut g = DragGesture::press(SensorKind::Touch, Point::new(0.0, 0.0), 1_000);
        assert!(!g.tick(1_100));
        assert!(!g.moved(Point::new(3.0, 0.0), 1_200));
        assert!(g.tick(1_250));
        assert_eq!(g.release(), GestureEnd::Drop);
    }

    #[test]
    fn touch_moving_early_cancels() {
        let mut g = DragGesture::press(SensorKind::Touch, Point::new(0.0, 0.0), 0);
        assert!(!g.moved(Point::new(0.0, 20.0), 50));
        assert!(!g.tick(400));
        assert_eq!(g.release(), GestureEnd::Cancelled);
    }
}
