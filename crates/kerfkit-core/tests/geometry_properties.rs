// Property tests for shape reversal and splitting.

use kerfkit_core::{Arc, Chain, Geometry, Line, Point, Segment, Shape};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -100.0..100.0f64
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

fn arc() -> impl Strategy<Value = Arc> {
    (point(), 0.5..50.0f64, -6.0..6.0f64, -6.0..6.0f64, any::<bool>())
        .prop_map(|(c, r, a0, a1, cw)| Arc::new(c, r, a0, a1, cw))
}

proptest! {
    #[test]
    fn reversing_a_line_twice_is_identity(a in point(), b in point()) {
        let line = Line::new(a, b);
        prop_assert_eq!(line.reversed().reversed(), line);
    }

    #[test]
    fn reversed_arc_visits_points_backwards(arc in arc(), t in 0.0..1.0f64) {
        let rev = arc.reversed();
        prop_assert!(rev.point_at(t).approx_eq(&arc.point_at(1.0 - t), 1e-6));
        prop_assert!((rev.length() - arc.length()).abs() < 1e-6);
    }

    #[test]
    fn split_preserves_length(arc in arc(), t in 0.05..0.95f64) {
        let geometry = Geometry::Arc(arc.clone());
        let (a, b) = geometry.split_at(t);
        prop_assert!((a.length() + b.length() - arc.length()).abs() < 1e-6);
        prop_assert!(a.end_point().approx_eq(&b.start_point(), 1e-9));
    }

    #[test]
    fn reversed_chain_stays_connected(pts in proptest::collection::vec(point(), 3..8)) {
        let shapes: Vec<Shape> = pts
            .windows(2)
            .enumerate()
            .map(|(i, w)| Shape::line(format!("s{i}"), w[0], w[1]))
            .collect();
        let chain = Chain::new("c", shapes);
        let rev = chain.reversed();
        for w in rev.shapes.windows(2) {
            prop_assert!(w[0].end_point().approx_eq(&w[1].start_point(), 1e-12));
        }
        prop_assert_eq!(rev.start_point(), chain.end_point());
        prop_assert_eq!(rev.reversed(), chain);
    }
}
