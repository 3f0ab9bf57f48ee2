//! NURBS curves.
//!
//! Evaluation uses de Boor's algorithm in homogeneous coordinates. Knot
//! vectors that do not match `control_points.len() + degree + 1` are
//! replaced by a clamped uniform vector so malformed imports still evaluate.

use serde::{Deserialize, Serialize};

use super::{Geometry, Point, Polyline, Segment};
use crate::constants::{DEFAULT_TESSELLATION_TOLERANCE, EPSILON, MAX_TESSELLATION_SEGMENTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub degree: usize,
    pub control_points: Vec<Point>,
    #[serde(default)]
    pub knots: Vec<f64>,
    /// Empty means every weight is 1.
    #[serde(default)]
    pub weights: Vec<f64>,
}

impl Spline {
    pub fn new(degree: usize, control_points: Vec<Point>) -> Self {
        Self {
            degree,
            control_points,
            knots: Vec::new(),
            weights: Vec::new(),
        }
    }

    fn effective_degree(&self) -> usize {
        self.degree.min(self.control_points.len().saturating_sub(1))
    }

    fn weight(&self, i: usize) -> f64 {
        self.weights.get(i).copied().unwrap_or(1.0)
    }

    /// The knot vector used for evaluation.
    pub fn effective_knots(&self) -> Vec<f64> {
        let n = self.control_points.len();
        let p = self.effective_degree();
        if self.knots.len() == n + p + 1 {
            return self.knots.clone();
        }
        let interior = n.saturating_sub(p);
        let mut knots = vec![0.0; p + 1];
        for i in 1..interior {
            knots.push(i as f64 / interior as f64);
        }
        knots.extend(std::iter::repeat(1.0).take(p + 1));
        knots
    }

    fn evaluate(&self, t: f64) -> Point {
        let n = self.control_points.len();
        match n {
            0 => return Point::default(),
            1 => return self.control_points[0],
            _ => {}
        }
        let p = self.effective_degree();
        let knots = self.effective_knots();
        let (u_min, u_max) = (knots[p], knots[n]);
        let u = u_min + (u_max - u_min) * t.clamp(0.0, 1.0);

        let mut k = p;
        while k < n - 1 && u >= knots[k + 1] {
            k += 1;
        }

        let mut d: Vec<(f64, f64, f64)> = (0..=p)
            .map(|j| {
                let idx = j + k - p;
                let w = self.weight(idx);
                let cp = self.control_points[idx];
                (cp.x * w, cp.y * w, w)
            })
            .collect();

        for r in 1..=p {
            for j in (r..=p).rev() {
                let lo = knots[j + k - p];
                let hi = knots[j + 1 + k - r];
                let denom = hi - lo;
                let alpha = if denom.abs() < EPSILON { 0.0 } else { (u - lo) / denom };
                let prev = d[j - 1];
                let cur = d[j];
                d[j] = (
                    (1.0 - alpha) * prev.0 + alpha * cur.0,
                    (1.0 - alpha) * prev.1 + alpha * cur.1,
                    (1.0 - alpha) * prev.2 + alpha * cur.2,
                );
            }
        }

        let (x, y, w) = d[p];
        if w.abs() < EPSILON {
            Point::new(x, y)
        } else {
            Point::new(x / w, y / w)
        }
    }

    fn control_polygon_length(&self) -> f64 {
        self.control_points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}

impl Segment for Spline {
    fn start_point(&self) -> Point {
        self.evaluate(0.0)
    }

    fn end_point(&self) -> Point {
        self.evaluate(1.0)
    }

    fn point_at(&self, t: f64) -> Point {
        self.evaluate(t)
    }

    fn length(&self) -> f64 {
        self.tessellate(DEFAULT_TESSELLATION_TOLERANCE)
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    fn reversed(&self) -> Self {
        let knots = self.effective_knots();
        let (a, b) = (
            knots.first().copied().unwrap_or(0.0),
            knots.last().copied().unwrap_or(1.0),
        );
        let mut control_points = self.control_points.clone();
        control_points.reverse();
        // Missing weights default to 1.0 and must stay on their control points.
        let mut weights = self.weights.clone();
        if !weights.is_empty() {
            weights.resize(self.control_points.len().max(weights.len()), 1.0);
            weights.reverse();
        }
        Spline {
            degree: self.degree,
            control_points,
            knots: knots.iter().rev().map(|k| a + b - k).collect(),
            weights,
        }
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        let t = t.clamp(0.0, 1.0);
        let samples = self.tessellate(DEFAULT_TESSELLATION_TOLERANCE).len().max(2);
        let split_index = ((samples - 1) as f64 * t).round() as usize;
        let points: Vec<Point> = (0..samples)
            .map(|i| self.evaluate(i as f64 / (samples - 1) as f64))
            .collect();
        let mid = self.evaluate(t);

        let mut first: Vec<Point> = points[..split_index.max(1)].to_vec();
        first.push(mid);
        let mut second = vec![mid];
        second.extend_from_slice(&points[(split_index + 1).min(samples - 1)..]);
        (
            Geometry::Polyline(Polyline::new(first, false)),
            Geometry::Polyline(Polyline::new(second, false)),
        )
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        let n = self.control_points.len();
        if n < 2 {
            return self.control_points.clone();
        }
        let min_segments = (n * 8).max(32).min(MAX_TESSELLATION_SEGMENTS);
        let by_tolerance =
            (self.control_polygon_length() / tolerance.max(EPSILON)).sqrt().ceil() as usize;
        let segments = by_tolerance.clamp(min_segments, MAX_TESSELLATION_SEGMENTS);
        (0..=segments)
            .map(|i| self.evaluate(i as f64 / segments as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> Spline {
        Spline::new(
            2,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 2.0), Point::new(2.0, 0.0)],
        )
    }

    #[test]
    fn test_clamped_spline_interpolates_ends() {
        let s = quadratic();
        assert!(s.start_point().approx_eq(&Point::new(0.0, 0.0), 1e-12));
        assert!(s.end_point().approx_eq(&Point::new(2.0, 0.0), 1e-12));
        // Quadratic Bezier midpoint: 0.25*P0 + 0.5*P1 + 0.25*P2
        assert!(s.point_at(0.5).approx_eq(&Point::new(1.0, 1.0), 1e-12));
    }

    #[test]
    fn test_spline_reversal_traces_backwards() {
        let s = Spline {
            degree: 3,
            control_points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 3.0),
                Point::new(3.0, 3.0),
                Point::new(4.0, 0.0),
                Point::new(6.0, -1.0),
            ],
            knots: Vec::new(),
            weights: vec![1.0, 2.0, 1.0, 0.5, 1.0],
        };
        let rev = s.reversed();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!(rev.point_at(t).approx_eq(&s.point_at(1.0 - t), 1e-9));
        }
    }

    #[test]
    fn test_spline_reversal_with_short_weight_list() {
        let s = Spline {
            degree: 2,
            control_points: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 2.0),
                Point::new(3.0, 2.0),
                Point::new(4.0, 0.0),
            ],
            knots: Vec::new(),
            weights: vec![3.0],
        };
        let rev = s.reversed();
        assert_eq!(rev.weights, vec![1.0, 1.0, 1.0, 3.0]);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!(rev.point_at(t).approx_eq(&s.point_at(1.0 - t), 1e-9));
        }
    }

    #[test]
    fn test_spline_split_into_polylines() {
        let s = quadratic();
        let (a, b) = s.split_at(0.5);
        assert!(a.start_point().approx_eq(&s.start_point(), 1e-12));
        assert!(a.end_point().approx_eq(&Point::new(1.0, 1.0), 1e-12));
        assert!(b.start_point().approx_eq(&Point::new(1.0, 1.0), 1e-12));
        assert!(b.end_point().approx_eq(&s.end_point(), 1e-12));
    }
}
