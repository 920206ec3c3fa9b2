use chronolane_protocol::{Point, Rect};
use serde::{Deserialize, Serialize};

use super::allocator::{EdgeLaneAllocator, ShelfAllocator};
use super::path::{PathData, rounded_polyline};

const SAME_ROW_EPSILON: f64 = 0.5;

/// Geometry knobs for [`route_edge`]. All distances are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteOptions {
    /// Stub length out of a box before the first bend, and clearance
    /// between a box and its shelf.
    pub padding: f64,
    pub corner_radius: f64,
    /// Forward gaps shorter than `short_span_factor * padding` get a
    /// direct curve instead of a shelf route.
    pub short_span_factor: f64,
    /// Distance a shelf moves per nudge when it hits an obstacle.
    pub obstacle_step: f64,
    pub max_nudges: u32,
    /// How far past its base position a shelf may be pushed by the allocator.
    pub shelf_band: f64,
    /// Grid step the allocator uses inside the band.
    pub shelf_step: f64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            padding: 12.0,
            corner_radius: 6.0,
            short_span_factor: 3.0,
            obstacle_step: 8.0,
            max_nudges: 16,
            shelf_band: 64.0,
            shelf_step: 6.0,
        }
    }
}

impl RouteOptions {
    /// A fresh allocator matching `shelf_step`, for one layout pass.
    pub fn allocator(&self) -> EdgeLaneAllocator {
        EdgeLaneAllocator::new(self.shelf_step)
    }

    fn short_span(&self) -> f64 {
        // Below two paddings the shelf stubs would cross each other.
        (self.short_span_factor * self.padding).max(2.0 * self.padding)
    }
}

/// Which way a shelf sits relative to the two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Below,
    Above,
}

impl Side {
    fn sign(self) -> f64 {
        match self {
            Side::Below => 1.0,
            Side::Above => -1.0,
        }
    }
}

/// Route a connector from box `from` to box `to` and return SVG path data.
///
/// * `from` entirely left of `to` is a forward edge: it leaves the right
///   middle of `from` and enters the left middle of `to`. Same-row edges
///   with a clear corridor are a straight line, short gaps a single cubic,
///   everything else goes through a shelf below both boxes.
/// * Anything else is a back-edge: it leaves the left middle of `from` and
///   enters the left middle of `to` through a shelf above both boxes.
///
/// Shelves that hit an obstacle are pushed away from the boxes in
/// `obstacle_step` increments, at most `max_nudges` times. When `shelves`
/// is given the shelf is then reserved there, skipping blocked candidates,
/// so parallel edges spread out and never share a drawn shelf.
/// Output depends only on the arguments, obstacle order included.
pub fn route_edge(
    from: Rect,
    to: Rect,
    options: &RouteOptions,
    obstacles: &[Rect],
    shelves: Option<&mut dyn ShelfAllocator>,
) -> String {
    if from.right() <= to.x {
        route_forward(from, to, options, obstacles, shelves)
    } else {
        route_back(from, to, options, obstacles, shelves)
    }
}

fn route_forward(
    from: Rect,
    to: Rect,
    options: &RouteOptions,
    obstacles: &[Rect],
    shelves: Option<&mut dyn ShelfAllocator>,
) -> String {
    let start = from.right_middle();
    let end = to.left_middle();
    let gap = end.x - start.x;

    if (start.y - end.y).abs() < SAME_ROW_EPSILON && corridor_clear(start.y, start.x, end.x, obstacles) {
        tracing::trace!("straight connector");
        return PathData::default().move_to(start).line_to(end).finish();
    }

    if gap < options.short_span() {
        tracing::trace!(gap, "short connector, using a curve");
        let dx = (gap / 2.0).max(options.padding);
        return PathData::default()
            .move_to(start)
            .cubic_to(
                Point::new(start.x + dx, start.y),
                Point::new(end.x - dx, end.y),
                end,
            )
            .finish();
    }

    let exit_x = start.x + options.padding;
    let entry_x = end.x - options.padding;
    let base = from.bottom().max(to.bottom()) + options.padding;
    let shelf = choose_shelf(base, Side::Below, exit_x, entry_x, options, obstacles, shelves);

    rounded_polyline(
        &[
            start,
            Point::new(exit_x, start.y),
            Point::new(exit_x, shelf),
            Point::new(entry_x, shelf),
            Point::new(entry_x, end.y),
            end,
        ],
        options.corner_radius,
    )
}

fn route_back(
    from: Rect,
    to: Rect,
    options: &RouteOptions,
    obstacles: &[Rect],
    shelves: Option<&mut dyn ShelfAllocator>,
) -> String {
    let start = from.left_middle();
    let end = to.left_middle();

    let exit_x = start.x - options.padding;
    let entry_x = end.x - options.padding;
    let base = from.y.min(to.y) - options.padding;
    let shelf = choose_shelf(base, Side::Above, exit_x, entry_x, options, obstacles, shelves);

    rounded_polyline(
        &[
            start,
            Point::new(exit_x, start.y),
            Point::new(exit_x, shelf),
            Point::new(entry_x, shelf),
            Point::new(entry_x, end.y),
            end,
        ],
        options.corner_radius,
    )
}

fn corridor_clear(y: f64, x1: f64, x2: f64, obstacles: &[Rect]) -> bool {
    !obstacles.iter().any(|r| r.crosses_horizontal(y, x1, x2))
}

fn choose_shelf(
    base: f64,
    side: Side,
    x1: f64,
    x2: f64,
    options: &RouteOptions,
    obstacles: &[Rect],
    shelves: Option<&mut dyn ShelfAllocator>,
) -> f64 {
    let y = nudge_clear(base, side, x1, x2, options, obstacles);
    match shelves {
        // Blocked shelves are never reserved: the reserved y is the drawn y.
        Some(allocator) => allocator.reserve_where(
            y,
            y + side.sign() * options.shelf_band,
            x1,
            x2,
            &|candidate| corridor_clear(candidate, x1, x2, obstacles),
        ),
        None => y,
    }
}

/// Push `y` away from the boxes until the segment `x1..x2` clears every
/// obstacle or the nudge budget runs out. The last candidate is returned
/// either way.
fn nudge_clear(y: f64, side: Side, x1: f64, x2: f64, options: &RouteOptions, obstacles: &[Rect]) -> f64 {
    let mut y = y;
    for attempt in 0..options.max_nudges {
        if corridor_clear(y, x1, x2, obstacles) {
            return y;
        }
        tracing::trace!(y, attempt, "shelf blocked, nudging");
        y += side.sign() * options.obstacle_step;
    }
    y
}
