//! SVG path-data assembly.

use chronolane_protocol::Point;

/// Builds an SVG `d` attribute. Coordinates are rounded to hundredths so
/// output is compact and stable across runs.
#[derive(Debug, Default)]
pub(crate) struct PathData {
    d: String,
}

impl PathData {
    pub(crate) fn move_to(mut self, p: Point) -> Self {
        self.op('M', &[p]);
        self
    }

    pub(crate) fn line_to(mut self, p: Point) -> Self {
        self.op('L', &[p]);
        self
    }

    pub(crate) fn quad_to(mut self, control: Point, p: Point) -> Self {
        self.op('Q', &[control, p]);
        self
    }

    pub(crate) fn cubic_to(mut self, c1: Point, c2: Point, p: Point) -> Self {
        self.op('C', &[c1, c2, p]);
        self
    }

    pub(crate) fn finish(self) -> String {
        self.d
    }

    fn op(&mut self, cmd: char, points: &[Point]) {
        if !self.d.is_empty() {
            self.d.push(' ');
        }
        self.d.push(cmd);
        for (i, p) in points.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            self.d.push_str(&format!("{sep}{} {}", num(p.x), num(p.y)));
        }
    }
}

fn num(v: f64) -> f64 {
    let rounded = (v * 100.0).round() / 100.0;
    // Avoid printing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Orthogonal polyline with every interior corner replaced by a quadratic
/// blend of at most `radius`, shrunk to half of the shorter adjacent leg.
pub(crate) fn rounded_polyline(points: &[Point], radius: f64) -> String {
    let points = simplify(points);
    let Some((&first, rest)) = points.split_first() else {
        return String::new();
    };

    let mut path = PathData::default().move_to(first);
    if rest.is_empty() {
        return path.line_to(first).finish();
    }

    for window in points.windows(3) {
        let [prev, corner, next] = [window[0], window[1], window[2]];
        let r = radius
            .min(corner.distance(prev) / 2.0)
            .min(corner.distance(next) / 2.0)
            .max(0.0);
        if r <= f64::EPSILON {
            path = path.line_to(corner);
            continue;
        }
        path = path
            .line_to(corner.toward(prev, r))
            .quad_to(corner, corner.toward(next, r));
    }

    match points.last() {
        Some(&last) => path.line_to(last).finish(),
        None => path.finish(),
    }
}

/// Drop repeated points and interior points lying on a straight run.
fn simplify(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_some_and(|last| last.distance(p) <= f64::EPSILON) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let straight_x = a.x == b.x && b.x == p.x && (b.y - a.y) * (p.y - b.y) > 0.0;
            let straight_y = a.y == b.y && b.y == p.y && (b.x - a.x) * (p.x - b.x) > 0.0;
            if straight_x || straight_y {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_commands() {
        let d = PathData::default()
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.5, -0.001))
            .cubic_to(Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0))
            .finish();
        assert_eq!(d, "M 0 0 L 10.5 0 C 1 2, 3 4, 5 6");
    }

    #[test]
    fn corners_become_quadratic_blends() {
        let d = rounded_polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 20.0),
            ],
            4.0,
        );
        assert_eq!(d, "M 0 0 L 6 0 Q 10 0, 10 4 L 10 20");
    }

    #[test]
    fn radius_shrinks_on_short_legs() {
        let d = rounded_polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 20.0),
            ],
            8.0,
        );
        assert_eq!(d, "M 0 0 L 1 0 Q 2 0, 2 1 L 2 20");
    }

    #[test]
    fn collinear_points_are_merged() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(9.0, 0.0),
        ];
        assert_eq!(rounded_polyline(&pts, 4.0), "M 0 0 L 9 0");
    }
}
