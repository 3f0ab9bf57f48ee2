use serde::{Deserialize, Serialize};

use super::{BoundingBox, Geometry, Point, Segment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> Point {
        self.start.lerp(&self.end, 0.5)
    }
}

impl Segment for Line {
    fn start_point(&self) -> Point {
        self.start
    }

    fn end_point(&self) -> Point {
        self.end
    }

    fn point_at(&self, t: f64) -> Point {
        self.start.lerp(&self.end, t.clamp(0.0, 1.0))
    }

    fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    fn reversed(&self) -> Self {
        Line::new(self.end, self.start)
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        let mid = self.point_at(t);
        (
            Geometry::Line(Line::new(self.start, mid)),
            Geometry::Line(Line::new(mid, self.end)),
        )
    }

    fn tessellate(&self, _tolerance: f64) -> Vec<Point> {
        vec![self.start, self.end]
    }

    fn tangent_at(&self, _t: f64) -> Point {
        (self.end - self.start).normalized()
    }

    fn bounds(&self) -> BoundingBox {
        let mut bb = BoundingBox::new(self.start, self.start);
        bb.include(&self.end);
        bb
    }
}
