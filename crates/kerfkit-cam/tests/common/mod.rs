//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use kerfkit_core::{
    Chain, MeasuredValue, Part, PartHole, PartSlot, Point, Shape, Tool, ToolId, ToolLibrary,
};

/// Unit square traced clockwise as `line1..line4`, flagged clockwise.
pub fn unit_square_cw() -> Chain {
    let p = [
        Point::new(0.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(1.0, 1.0),
        Point::new(1.0, 0.0),
    ];
    let shapes = (0..4)
        .map(|i| Shape::line(format!("line{}", i + 1), p[i], p[(i + 1) % 4]))
        .collect();
    Chain::new("square", shapes).with_winding(Some(true))
}

/// Axis-aligned square traced counterclockwise from `origin`.
pub fn square_ccw(id: &str, origin: Point, size: f64) -> Chain {
    let p = [
        origin,
        origin + Point::new(size, 0.0),
        origin + Point::new(size, size),
        origin + Point::new(0.0, size),
    ];
    let shapes = (0..4)
        .map(|i| Shape::line(format!("{id}-e{i}"), p[i], p[(i + 1) % 4]))
        .collect();
    Chain::new(id, shapes).with_winding(Some(false))
}

/// Shell with two top-level holes, a hole nested in the second one and a slot.
pub fn nested_part() -> Part {
    Part::new("P1", square_ccw("shell", Point::new(0.0, 0.0), 100.0))
        .with_holes(vec![
            PartHole::new("H1", square_ccw("hole-1", Point::new(10.0, 10.0), 10.0)),
            PartHole::new("H2", square_ccw("hole-2", Point::new(40.0, 40.0), 40.0)).with_holes(
                vec![PartHole::new(
                    "H2-1",
                    square_ccw("hole-2-1", Point::new(50.0, 50.0), 10.0),
                )],
            ),
        ])
        .with_slots(vec![PartSlot::new(
            "S1",
            square_ccw("slot-1", Point::new(10.0, 60.0), 5.0),
        )])
}

/// Library with a single plasma torch, kerf 2.0 mm.
pub fn torch_library() -> ToolLibrary {
    ToolLibrary::from_tools([Tool::new(ToolId::from("torch"), 1, "Plasma 45A")
        .with_kerf_width(MeasuredValue::qualified(2.0, 0.08))
        .with_feed_rate(MeasuredValue::qualified(2500.0, 100.0))])
}

pub fn shape_ids(chain: &Chain) -> Vec<String> {
    chain.shapes.iter().map(|s| s.id.clone()).collect()
}
