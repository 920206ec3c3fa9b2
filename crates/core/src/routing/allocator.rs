/// Hands out shelf coordinates so connectors sharing a corridor do not
/// draw on top of each other.
///
/// The router only sees this trait, so a different packing strategy can be
/// dropped in without touching the routing geometry.
pub trait ShelfAllocator {
    /// Reserve the horizontal span `x1..x2` on a shelf between `y_from` and
    /// `y_to` and return the chosen y. Candidates are tried starting at
    /// `y_from` and stepping toward `y_to`; those rejected by `usable` are
    /// skipped unless none passes. The returned y is the one recorded.
    /// Always returns a value.
    fn reserve_where(
        &mut self,
        y_from: f64,
        y_to: f64,
        x1: f64,
        x2: f64,
        usable: &dyn Fn(f64) -> bool,
    ) -> f64;

    /// [`ShelfAllocator::reserve_where`] with every candidate usable.
    fn reserve(&mut self, y_from: f64, y_to: f64, x1: f64, x2: f64) -> f64 {
        self.reserve_where(y_from, y_to, x1, x2, &|_| true)
    }

    /// Forget every reservation.
    fn reset(&mut self);
}

const SAME_SHELF_EPSILON: f64 = 1e-6;

// Guards against a tiny step over a huge band.
const MAX_CANDIDATES: usize = 256;

#[derive(Debug, Clone)]
struct Shelf {
    y: f64,
    spans: Vec<(f64, f64)>,
}

impl Shelf {
    fn conflicts(&self, x1: f64, x2: f64) -> usize {
        self.spans
            .iter()
            .filter(|&&(a, b)| x1 < b && a < x2)
            .count()
    }
}

/// Greedy first-fit shelf allocator with a fewest-conflicts fallback.
///
/// One instance per layout pass: create it, route every edge of the pass
/// through it, then drop it or call [`ShelfAllocator::reset`].
#[derive(Debug, Clone)]
pub struct EdgeLaneAllocator {
    step: f64,
    shelves: Vec<Shelf>,
}

impl EdgeLaneAllocator {
    pub fn new(step: f64) -> Self {
        Self {
            step: step.abs(),
            shelves: Vec::new(),
        }
    }

    /// Number of spans reserved so far across all shelves.
    pub fn reserved(&self) -> usize {
        self.shelves.iter().map(|s| s.spans.len()).sum()
    }

    fn candidates(&self, y_from: f64, y_to: f64) -> Vec<f64> {
        let distance = (y_to - y_from).abs();
        if self.step <= 0.0 || distance < self.step {
            return vec![y_from];
        }
        let direction = if y_to >= y_from { 1.0 } else { -1.0 };
        let count = ((distance / self.step).floor() as usize + 1).min(MAX_CANDIDATES);
        (0..count)
            .map(|k| y_from + direction * self.step * k as f64)
            .collect()
    }

    fn shelf_at(&self, y: f64) -> Option<&Shelf> {
        self.shelves
            .iter()
            .find(|s| (s.y - y).abs() < SAME_SHELF_EPSILON)
    }

    fn record(&mut self, y: f64, x1: f64, x2: f64) {
        match self
            .shelves
            .iter_mut()
            .find(|s| (s.y - y).abs() < SAME_SHELF_EPSILON)
        {
            Some(shelf) => shelf.spans.push((x1, x2)),
            None => self.shelves.push(Shelf {
                y,
                spans: vec![(x1, x2)],
            }),
        }
    }
}

impl Default for EdgeLaneAllocator {
    fn default() -> Self {
        Self::new(6.0)
    }
}

impl ShelfAllocator for EdgeLaneAllocator {
    fn reserve_where(
        &mut self,
        y_from: f64,
        y_to: f64,
        x1: f64,
        x2: f64,
        usable: &dyn Fn(f64) -> bool,
    ) -> f64 {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };

        let candidates = self.candidates(y_from, y_to);
        let mut open: Vec<f64> = candidates.iter().copied().filter(|&y| usable(y)).collect();
        if open.is_empty() {
            tracing::trace!(y_from, y_to, "every shelf candidate rejected, ignoring filter");
            open = candidates;
        }

        let mut fallback: Option<(f64, usize)> = None;
        let mut chosen = None;
        for y in open {
            let conflicts = self.shelf_at(y).map_or(0, |s| s.conflicts(x1, x2));
            if conflicts == 0 {
                chosen = Some(y);
                break;
            }
            if fallback.is_none_or(|(_, best)| conflicts < best) {
                fallback = Some((y, conflicts));
            }
        }

        let y = match (chosen, fallback) {
            (Some(y), _) => y,
            (None, Some((y, conflicts))) => {
                tracing::trace!(y, conflicts, "no free shelf, using least crowded");
                y
            }
            (None, None) => y_from,
        };

        self.record(y, x1, x2);
        y
    }

    fn reset(&mut self) {
        self.shelves.clear();
    }
}
