//! Hit-testing for drops onto the sticker grid.

use serde::Serialize;
use std::collections::BTreeMap;

/// A drop is accepted only when the pointer is closer than this to the
/// centre of the next empty slot.
pub const DROP_RADIUS: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges count as inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Slot rectangles as reported by the layout pass.
#[derive(Debug, Clone, Default)]
pub struct SlotLayout {
    slots: BTreeMap<usize, Rect>,
    today_area: Option<Rect>,
}

impl SlotLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any rectangle already registered for `index`.
    pub fn register_slot(&mut self, index: usize, rect: Rect) {
        self.slots.insert(index, rect);
    }

    pub fn register_today_area(&mut self, rect: Rect) {
        self.today_area = Some(rect);
    }

    pub fn slot(&self, index: usize) -> Option<Rect> {
        self.slots.get(&index).copied()
    }

    /// Registered slot whose centre is closest to `point`, with its distance.
    /// Indices at or past `slot_count` are stale and skipped.
    pub fn nearest_slot(&self, point: Point, slot_count: usize) -> Option<(usize, f64)> {
        self.slots
            .range(..slot_count)
            .map(|(&index, rect)| (index, point.distance_to(rect.center())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// The slot a drop at `point` would land in. Only `next_empty` can be a
    /// target, and only when it is also the nearest slot within the radius.
    pub fn drop_target(
        &self,
        point: Point,
        next_empty: Option<usize>,
        slot_count: usize,
    ) -> Option<usize> {
        let next_empty = next_empty?;
        let (nearest, distance) = self.nearest_slot(point, slot_count)?;
        (nearest == next_empty && distance < DROP_RADIUS).then_some(nearest)
    }

    pub fn in_today_area(&self, point: Point) -> bool {
        self.today_area.is_some_and(|rect| rect.contains(point))
    }
}

/// Index of the first unfilled slot; `None` when every slot is filled.
pub fn next_empty_slot<T>(grid: &[Option<T>]) -> Option<usize> {
    grid.iter().position(Option::is_none)
}
