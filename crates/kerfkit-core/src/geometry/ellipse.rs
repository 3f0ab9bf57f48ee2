use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::{arc_segment_count, normalize_sweep, Geometry, Point, Segment};

/// Ellipse or elliptical arc.
///
/// `major_axis` is the vector from the center to the end of the major axis;
/// the minor axis is that vector rotated a quarter turn counterclockwise and
/// scaled by `minor_to_major_ratio`. Parameters are eccentric angles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point,
    pub major_axis: Point,
    pub minor_to_major_ratio: f64,
    #[serde(default)]
    pub start_param: f64,
    #[serde(default = "full_turn")]
    pub end_param: f64,
    #[serde(default)]
    pub clockwise: bool,
}

fn full_turn() -> f64 {
    TAU
}

impl Ellipse {
    /// Full ellipse traversed counterclockwise from the major axis end.
    pub fn new(center: Point, major_axis: Point, minor_to_major_ratio: f64) -> Self {
        Self {
            center,
            major_axis,
            minor_to_major_ratio,
            start_param: 0.0,
            end_param: TAU,
            clockwise: false,
        }
    }

    pub fn minor_axis(&self) -> Point {
        self.major_axis.left_perpendicular() * self.minor_to_major_ratio
    }

    pub fn sweep(&self) -> f64 {
        if self.clockwise {
            normalize_sweep(self.start_param - self.end_param)
        } else {
            normalize_sweep(self.end_param - self.start_param)
        }
    }

    pub fn is_full(&self) -> bool {
        (self.sweep() - TAU).abs() < 1e-9
    }

    fn param_at(&self, t: f64) -> f64 {
        let delta = self.sweep() * t.clamp(0.0, 1.0);
        if self.clockwise {
            self.start_param - delta
        } else {
            self.start_param + delta
        }
    }

    fn point_at_param(&self, param: f64) -> Point {
        let (sin, cos) = param.sin_cos();
        self.center + self.major_axis * cos + self.minor_axis() * sin
    }
}

impl Segment for Ellipse {
    fn start_point(&self) -> Point {
        self.point_at_param(self.start_param)
    }

    fn end_point(&self) -> Point {
        self.point_at_param(self.end_param)
    }

    fn point_at(&self, t: f64) -> Point {
        self.point_at_param(self.param_at(t))
    }

    fn length(&self) -> f64 {
        self.tessellate(self.major_axis.length() * 1e-4)
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    fn reversed(&self) -> Self {
        Ellipse {
            start_param: self.end_param,
            end_param: self.start_param,
            clockwise: !self.clockwise,
            ..self.clone()
        }
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        let mid = self.param_at(t);
        (
            Geometry::Ellipse(Ellipse {
                end_param: mid,
                ..self.clone()
            }),
            Geometry::Ellipse(Ellipse {
                start_param: mid,
                ..self.clone()
            }),
        )
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        let n = arc_segment_count(self.major_axis.length(), self.sweep(), tolerance).max(8);
        (0..=n)
            .map(|i| self.point_at(i as f64 / n as f64))
            .collect()
    }

    fn tangent_at(&self, t: f64) -> Point {
        let (sin, cos) = self.param_at(t).sin_cos();
        let d = self.minor_axis() * cos - self.major_axis * sin;
        if self.clockwise {
            (-d).normalized()
        } else {
            d.normalized()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_ellipse_closes() {
        let e = Ellipse::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 0.5);
        assert!(e.is_full());
        assert!(e.start_point().approx_eq(&e.end_point(), 1e-9));
        assert!(e.point_at(0.25).approx_eq(&Point::new(0.0, 2.0), 1e-9));
    }

    #[test]
    fn test_ellipse_reversal() {
        let e = Ellipse {
            start_param: 0.0,
            end_param: std::f64::consts::PI,
            ..Ellipse::new(Point::new(1.0, 1.0), Point::new(2.0, 0.0), 0.5)
        };
        let rev = e.reversed();
        assert!(rev.start_point().approx_eq(&e.end_point(), 1e-9));
        assert!(rev.point_at(0.3).approx_eq(&e.point_at(0.7), 1e-9));
    }

    #[test]
    fn test_ellipse_split_shares_point() {
        let e = Ellipse::new(Point::new(0.0, 0.0), Point::new(3.0, 0.0), 1.0 / 3.0);
        let (a, b) = e.split_at(0.5);
        assert!(a.end_point().approx_eq(&Point::new(-3.0, 0.0), 1e-9));
        assert!(b.start_point().approx_eq(&Point::new(-3.0, 0.0), 1e-9));
        assert!(b.end_point().approx_eq(&e.end_point(), 1e-9));
    }
}
