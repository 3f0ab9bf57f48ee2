use serde::{Deserialize, Serialize};

use super::{BoundingBox, Geometry, Point, Segment};

/// Straight-segment polyline. A closed polyline returns to its first point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Vertices in traversal order, with the closing vertex repeated.
    pub fn path_points(&self) -> Vec<Point> {
        let mut pts = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                pts.push(*first);
            }
        }
        pts
    }

    /// Segment index and local parameter for a normalized position.
    fn locate(&self, t: f64) -> Option<(usize, f64)> {
        let pts = self.path_points();
        if pts.len() < 2 {
            return None;
        }
        let total = self.length();
        if total <= 0.0 {
            return Some((0, 0.0));
        }
        let target = total * t.clamp(0.0, 1.0);
        let mut travelled = 0.0;
        for (i, w) in pts.windows(2).enumerate() {
            let seg = w[0].distance_to(&w[1]);
            if travelled + seg >= target && seg > 0.0 {
                return Some((i, (target - travelled) / seg));
            }
            travelled += seg;
        }
        Some((pts.len() - 2, 1.0))
    }
}

impl Segment for Polyline {
    fn start_point(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }

    fn end_point(&self) -> Point {
        if self.closed {
            self.start_point()
        } else {
            self.points.last().copied().unwrap_or_default()
        }
    }

    fn point_at(&self, t: f64) -> Point {
        let pts = self.path_points();
        match self.locate(t) {
            Some((i, local)) => pts[i].lerp(&pts[i + 1], local),
            None => self.start_point(),
        }
    }

    fn length(&self) -> f64 {
        self.path_points()
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        if self.closed && points.len() > 1 {
            // Closed loops keep their seam vertex so the start point is stable.
            points[1..].reverse();
        } else {
            points.reverse();
        }
        Polyline::new(points, self.closed)
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        let pts = self.path_points();
        let Some((i, local)) = self.locate(t) else {
            return (
                Geometry::Polyline(self.clone()),
                Geometry::Polyline(Polyline::new(vec![self.end_point()], false)),
            );
        };
        let mid = pts[i].lerp(&pts[i + 1], local);

        let mut first: Vec<Point> = pts[..=i].to_vec();
        first.push(mid);
        let mut second = vec![mid];
        second.extend_from_slice(&pts[i + 1..]);
        (
            Geometry::Polyline(Polyline::new(first, false)),
            Geometry::Polyline(Polyline::new(second, false)),
        )
    }

    fn tessellate(&self, _tolerance: f64) -> Vec<Point> {
        self.path_points()
    }

    fn tangent_at(&self, t: f64) -> Point {
        let pts = self.path_points();
        match self.locate(t) {
            Some((i, _)) => (pts[i + 1] - pts[i]).normalized(),
            None => Point::default(),
        }
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
            .unwrap_or_else(|| BoundingBox::new(Point::default(), Point::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(closed: bool) -> Polyline {
        Polyline::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
            closed,
        )
    }

    #[test]
    fn test_closed_polyline_length_includes_closing_edge() {
        assert_eq!(square(true).length(), 4.0);
        assert_eq!(square(false).length(), 3.0);
    }

    #[test]
    fn test_closed_polyline_reversal_keeps_seam() {
        let rev = square(true).reversed();
        assert_eq!(rev.points[0], Point::new(0.0, 0.0));
        assert_eq!(rev.points[1], Point::new(0.0, 1.0));
        assert!(rev.point_at(0.25).approx_eq(&Point::new(0.0, 1.0), 1e-12));
    }

    #[test]
    fn test_open_polyline_reversal_swaps_ends() {
        let poly = square(false);
        let rev = poly.reversed();
        assert_eq!(rev.start_point(), poly.end_point());
        assert_eq!(rev.end_point(), poly.start_point());
    }

    #[test]
    fn test_polyline_split_midway() {
        let (a, b) = square(true).split_at(0.5);
        assert!(a.end_point().approx_eq(&Point::new(1.0, 1.0), 1e-12));
        assert!(b.start_point().approx_eq(&Point::new(1.0, 1.0), 1e-12));
        assert!(b.end_point().approx_eq(&Point::new(0.0, 0.0), 1e-12));
        assert!((a.length() - 2.0).abs() < 1e-12);
    }
}
