use serde::{Deserialize, Serialize};

use super::{Arc, BoundingBox, Circle, Ellipse, Line, Point, Polyline, Segment, Spline};

/// Closed variant over every supported shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Line(Line),
    Arc(Arc),
    Circle(Circle),
    Polyline(Polyline),
    Spline(Spline),
    Ellipse(Ellipse),
}

impl Geometry {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Line(_) => "line",
            Geometry::Arc(_) => "arc",
            Geometry::Circle(_) => "circle",
            Geometry::Polyline(_) => "polyline",
            Geometry::Spline(_) => "spline",
            Geometry::Ellipse(_) => "ellipse",
        }
    }
}

impl Segment for Geometry {
    fn start_point(&self) -> Point {
        match self {
            Geometry::Line(g) => g.start_point(),
            Geometry::Arc(g) => g.start_point(),
            Geometry::Circle(g) => g.start_point(),
            Geometry::Polyline(g) => g.start_point(),
            Geometry::Spline(g) => g.start_point(),
            Geometry::Ellipse(g) => g.start_point(),
        }
    }

    fn end_point(&self) -> Point {
        match self {
            Geometry::Line(g) => g.end_point(),
            Geometry::Arc(g) => g.end_point(),
            Geometry::Circle(g) => g.end_point(),
            Geometry::Polyline(g) => g.end_point(),
            Geometry::Spline(g) => g.end_point(),
            Geometry::Ellipse(g) => g.end_point(),
        }
    }

    fn point_at(&self, t: f64) -> Point {
        match self {
            Geometry::Line(g) => g.point_at(t),
            Geometry::Arc(g) => g.point_at(t),
            Geometry::Circle(g) => g.point_at(t),
            Geometry::Polyline(g) => g.point_at(t),
            Geometry::Spline(g) => g.point_at(t),
            Geometry::Ellipse(g) => g.point_at(t),
        }
    }

    fn length(&self) -> f64 {
        match self {
            Geometry::Line(g) => g.length(),
            Geometry::Arc(g) => g.length(),
            Geometry::Circle(g) => g.length(),
            Geometry::Polyline(g) => g.length(),
            Geometry::Spline(g) => g.length(),
            Geometry::Ellipse(g) => g.length(),
        }
    }

    fn reversed(&self) -> Self {
        match self {
            Geometry::Line(g) => Geometry::Line(g.reversed()),
            Geometry::Arc(g) => Geometry::Arc(g.reversed()),
            Geometry::Circle(g) => Geometry::Circle(g.reversed()),
            Geometry::Polyline(g) => Geometry::Polyline(g.reversed()),
            Geometry::Spline(g) => Geometry::Spline(g.reversed()),
            Geometry::Ellipse(g) => Geometry::Ellipse(g.reversed()),
        }
    }

    fn split_at(&self, t: f64) -> (Geometry, Geometry) {
        match self {
            Geometry::Line(g) => g.split_at(t),
            Geometry::Arc(g) => g.split_at(t),
            Geometry::Circle(g) => g.split_at(t),
            Geometry::Polyline(g) => g.split_at(t),
            Geometry::Spline(g) => g.split_at(t),
            Geometry::Ellipse(g) => g.split_at(t),
        }
    }

    fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        match self {
            Geometry::Line(g) => g.tessellate(tolerance),
            Geometry::Arc(g) => g.tessellate(tolerance),
            Geometry::Circle(g) => g.tessellate(tolerance),
            Geometry::Polyline(g) => g.tessellate(tolerance),
            Geometry::Spline(g) => g.tessellate(tolerance),
            Geometry::Ellipse(g) => g.tessellate(tolerance),
        }
    }

    fn tangent_at(&self, t: f64) -> Point {
        match self {
            Geometry::Line(g) => g.tangent_at(t),
            Geometry::Arc(g) => g.tangent_at(t),
            Geometry::Circle(g) => g.tangent_at(t),
            Geometry::Polyline(g) => g.tangent_at(t),
            Geometry::Spline(g) => g.tangent_at(t),
            Geometry::Ellipse(g) => g.tangent_at(t),
        }
    }

    fn bounds(&self) -> BoundingBox {
        match self {
            Geometry::Line(g) => g.bounds(),
            Geometry::Arc(g) => g.bounds(),
            Geometry::Circle(g) => g.bounds(),
            Geometry::Polyline(g) => g.bounds(),
            Geometry::Spline(g) => g.bounds(),
            Geometry::Ellipse(g) => g.bounds(),
        }
    }
}

/// A drawing entity: identifier plus geometry payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: String,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Shape {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    pub fn line(id: impl Into<String>, start: Point, end: Point) -> Self {
        Self::new(id, Geometry::Line(Line::new(start, end)))
    }

    pub fn start_point(&self) -> Point {
        self.geometry.start_point()
    }

    pub fn end_point(&self) -> Point {
        self.geometry.end_point()
    }

    pub fn point_at(&self, t: f64) -> Point {
        self.geometry.point_at(t)
    }

    pub fn tangent_at(&self, t: f64) -> Point {
        self.geometry.tangent_at(t)
    }

    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    pub fn tessellate(&self, tolerance: f64) -> Vec<Point> {
        self.geometry.tessellate(tolerance)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.geometry.bounds()
    }

    /// Reversed traversal; the shape keeps its identity.
    pub fn reversed(&self) -> Shape {
        Shape {
            id: self.id.clone(),
            geometry: self.geometry.reversed(),
        }
    }

    /// Splits into `{id}-a` and `{id}-b`.
    pub fn split_at(&self, t: f64) -> (Shape, Shape) {
        let (a, b) = self.geometry.split_at(t);
        (
            Shape::new(format!("{}-a", self.id), a),
            Shape::new(format!("{}-b", self.id), b),
        )
    }
}
