use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Move `d` pixels from `self` toward `target`. Returns `self` when the
    /// two points coincide.
    pub fn toward(&self, target: Point, d: f64) -> Point {
        let len = self.distance(target);
        if len <= f64::EPSILON {
            return *self;
        }
        let t = d / len;
        Point::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }
}

/// Axis-aligned box in pixel space. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Midpoint of the left edge.
    pub fn left_middle(&self) -> Point {
        Point::new(self.x, self.mid_y())
    }

    /// Midpoint of the right edge.
    pub fn right_middle(&self) -> Point {
        Point::new(self.right(), self.mid_y())
    }

    /// Whether the horizontal segment `x1..x2` at height `y` touches this box.
    ///
    /// Edges count as touching so a connector never grazes a box outline.
    pub fn crosses_horizontal(&self, y: f64, x1: f64, x2: f64) -> bool {
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        y >= self.y && y <= self.bottom() && lo < self.right() && self.x < hi
    }
}
