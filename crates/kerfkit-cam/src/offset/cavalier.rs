//! Default offset engine backed by `cavalier_contours`.
//!
//! Chains are converted to bulge polylines (arcs and circles stay exact,
//! the remaining kinds are tessellated), offset to both sides and turned
//! back into line and arc shapes.

use async_trait::async_trait;
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline as Pline};
use kerfkit_core::constants::{DEFAULT_TESSELLATION_TOLERANCE, EPSILON};
use kerfkit_core::{Arc, Chain, Geometry, Point, Segment, Shape};
use std::f64::consts::FRAC_PI_2;
use std::panic;
use tracing::{debug, warn};

use super::{ChainOffsetResult, OffsetEngine, OffsetSide};
use crate::config::OffsetParameters;
use crate::cut::GapFill;
use crate::error::CamError;

const BULGE_EPSILON: f64 = 1e-9;
const POS_EPSILON: f64 = 1e-7;

/// Offset engine using `cavalier_contours::Polyline::parallel_offset`.
#[derive(Debug, Clone)]
pub struct CavalierOffsetEngine {
    tessellation_tolerance: f64,
}

impl Default for CavalierOffsetEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Inner,
    Outer,
}

/// Source chain as a cavalier polyline plus what was bridged to build it.
struct SourcePath {
    pline: Pline<f64>,
    closed: bool,
    gap_fills: Vec<GapFill>,
    warnings: Vec<String>,
}

impl CavalierOffsetEngine {
    pub fn new() -> Self {
        Self {
            tessellation_tolerance: DEFAULT_TESSELLATION_TOLERANCE,
        }
    }

    /// Chord tolerance used for splines, ellipses and polylines
    pub fn with_tessellation_tolerance(mut self, tolerance: f64) -> Self {
        self.tessellation_tolerance = tolerance;
        self
    }

    /// Offset `chain` by `|distance|` to both sides.
    pub fn offset_sync(
        &self,
        chain: &Chain,
        distance: f64,
        params: &OffsetParameters,
    ) -> ChainOffsetResult {
        if let Err(err) = chain.ensure_not_empty() {
            return engine_failure(err);
        }
        let magnitude = distance.abs();
        if !magnitude.is_finite() || magnitude <= EPSILON {
            return engine_failure("offset distance must be non-zero");
        }

        let source = build_source(chain, params, self.tessellation_tolerance);
        if source.pline.vertex_count() < 2 {
            return engine_failure(format!("chain {} is degenerate after conversion", chain.id));
        }

        let mut warnings = source.warnings.clone();
        let mut inner = None;
        let mut outer = None;
        for signed in [magnitude, -magnitude] {
            let Some(results) = run_offset(&source.pline, signed) else {
                warnings.push(format!("Offset by {signed:.4} failed inside the engine"));
                continue;
            };
            let Some(main) = pick_main(results, source.closed, &mut warnings) else {
                continue;
            };
            let slot = match classify(&main, &source, chain) {
                Side::Inner => &mut inner,
                Side::Outer => &mut outer,
            };
            if slot.is_none() {
                *slot = Some(main);
            } else {
                warnings.push("Both offset results landed on the same side".to_string());
            }
        }

        let to_side = |pline: Pline<f64>| OffsetSide {
            shapes: finalize_shapes(&pline, &source, chain, self.tessellation_tolerance),
            gap_fills: source.gap_fills.clone(),
        };
        let inner_chain = inner.map(to_side);
        let outer_chain = outer.map(to_side);
        let success = inner_chain.is_some() || outer_chain.is_some();
        debug!(
            "Offset chain {}: inner={} outer={}",
            chain.id,
            inner_chain.is_some(),
            outer_chain.is_some()
        );

        ChainOffsetResult {
            success,
            inner_chain,
            outer_chain,
            warnings,
            errors: if success {
                Vec::new()
            } else {
                vec![CamError::OffsetEngine("offset produced no geometry".to_string()).to_string()]
            },
        }
    }
}

#[async_trait]
impl OffsetEngine for CavalierOffsetEngine {
    async fn offset_chain(
        &self,
        chain: &Chain,
        distance: f64,
        params: &OffsetParameters,
    ) -> ChainOffsetResult {
        self.offset_sync(chain, distance, params)
    }
}

fn build_source(chain: &Chain, params: &OffsetParameters, tolerance: f64) -> SourcePath {
    let snap = params.snap_threshold.max(params.tolerance);
    let closed = chain.is_closed(snap);
    let mut pline = Pline::new();
    let mut gap_fills = Vec::new();
    let mut warnings = Vec::new();

    let mut previous: Option<&Shape> = None;
    for shape in &chain.shapes {
        if let Some(prev) = previous {
            let from = prev.end_point();
            let to = shape.start_point();
            let gap = from.distance_to(&to);
            if gap > snap {
                // Straight filler from the previous end to this start
                push_vertex(&mut pline, from, 0.0);
                gap_fills.push(GapFill {
                    between: (prev.id.clone(), shape.id.clone()),
                    gap_size: gap,
                    filler: Shape::line(format!("{}-gap-{}", prev.id, shape.id), from, to),
                });
                if gap > params.max_extension {
                    warnings.push(format!(
                        "Gap of {:.4} between {} and {} exceeds max extension {:.4}",
                        gap, prev.id, shape.id, params.max_extension
                    ));
                }
            }
        }
        push_shape(&mut pline, shape, tolerance);
        previous = Some(shape);
    }

    if let Some(last) = chain.shapes.last() {
        if !closed {
            push_vertex(&mut pline, last.end_point(), 0.0);
        }
    }

    let count = pline.vertex_count();
    if closed && count > 1 {
        let first = pline.at(0);
        let last = pline.at(count - 1);
        if same_pos(&first, &last) {
            pline.remove_last();
        }
    }
    pline.set_is_closed(closed);

    SourcePath {
        pline,
        closed,
        gap_fills,
        warnings,
    }
}

fn same_pos(a: &PlineVertex<f64>, b: &PlineVertex<f64>) -> bool {
    (a.x - b.x).abs() < POS_EPSILON && (a.y - b.y).abs() < POS_EPSILON
}

/// Append a vertex; a vertex on top of the previous one replaces it.
fn push_vertex(pline: &mut Pline<f64>, p: Point, bulge: f64) {
    let vertex = PlineVertex::new(p.x, p.y, bulge);
    let count = pline.vertex_count();
    if count > 0 && same_pos(&pline.at(count - 1), &vertex) {
        pline.remove_last();
    }
    pline.add_vertex(vertex);
}

/// Append the vertices of one shape, excluding its end point.
fn push_shape(pline: &mut Pline<f64>, shape: &Shape, tolerance: f64) {
    match &shape.geometry {
        Geometry::Line(line) => push_vertex(pline, line.start, 0.0),
        Geometry::Arc(arc) => push_arc(pline, arc),
        Geometry::Circle(circle) => push_arc(
            pline,
            &Arc::new(circle.center, circle.radius, 0.0, 0.0, circle.clockwise),
        ),
        Geometry::Polyline(_) | Geometry::Spline(_) | Geometry::Ellipse(_) => {
            let points = shape.tessellate(tolerance);
            let keep = points.len().saturating_sub(1);
            for p in points.into_iter().take(keep) {
                push_vertex(pline, p, 0.0);
            }
        }
    }
}

fn engine_failure(reason: impl ToString) -> ChainOffsetResult {
    ChainOffsetResult::failure(CamError::OffsetEngine(reason.to_string()).to_string())
}

/// Arcs are split into pieces of at most a quarter turn.
fn push_arc(pline: &mut Pline<f64>, arc: &Arc) {
    let sweep = arc.sweep();
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / pieces as f64;
    let sign = if arc.clockwise { -1.0 } else { 1.0 };
    let bulge = sign * (step / 4.0).tan();
    for k in 0..pieces {
        push_vertex(pline, arc.point_at(k as f64 / pieces as f64), bulge);
    }
}

fn run_offset(pline: &Pline<f64>, distance: f64) -> Option<Vec<Pline<f64>>> {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| pline.parallel_offset(distance))) {
        Ok(results) => Some(results),
        Err(_) => {
            warn!("Panic during parallel offset by {:.4}", distance);
            None
        }
    }
}

/// Keep the dominant loop (closed) or longest piece (open).
fn pick_main(
    results: Vec<Pline<f64>>,
    closed: bool,
    warnings: &mut Vec<String>,
) -> Option<Pline<f64>> {
    let count = results.len();
    let measure = |pline: &Pline<f64>| {
        if closed {
            pline_area(pline).abs()
        } else {
            pline_length(pline)
        }
    };
    let main = results
        .into_iter()
        .filter(|pline| pline.vertex_count() >= 2)
        .max_by(|a, b| measure(a).total_cmp(&measure(b)))?;
    if count > 1 {
        warnings.push(format!(
            "Offset produced {count} pieces; keeping the largest"
        ));
    }
    Some(main)
}

fn classify(result: &Pline<f64>, source: &SourcePath, chain: &Chain) -> Side {
    if source.closed {
        if pline_area(result).abs() > pline_area(&source.pline).abs() {
            Side::Outer
        } else {
            Side::Inner
        }
    } else {
        // Open chains: left of travel counts as outside
        let (Some(first_shape), Some(start)) = (chain.shapes.first(), chain.start_point()) else {
            return Side::Outer;
        };
        let tangent = first_shape.tangent_at(0.0);
        let first = result.at(0);
        let offset = Point::new(first.x, first.y) - start;
        if tangent.cross(&offset) >= 0.0 {
            Side::Outer
        } else {
            Side::Inner
        }
    }
}

/// Signed area including the circular caps of bulge segments.
fn pline_area(pline: &Pline<f64>) -> f64 {
    let n = pline.vertex_count();
    if n < 2 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    let mut caps = 0.0;
    for i in 0..n {
        let a = pline.at(i);
        let b = pline.at((i + 1) % n);
        twice_area += a.x * b.y - b.x * a.y;
        if a.bulge.abs() > BULGE_EPSILON {
            let chord = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            let theta = 4.0 * a.bulge.abs().atan();
            let radius = chord / (2.0 * (theta / 2.0).sin());
            caps += 0.5 * radius * radius * (theta - theta.sin()) * a.bulge.signum();
        }
    }
    twice_area / 2.0 + caps
}

fn pline_length(pline: &Pline<f64>) -> f64 {
    let n = pline.vertex_count();
    (1..n)
        .map(|i| {
            let a = pline.at(i - 1);
            let b = pline.at(i);
            ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
        })
        .sum()
}

/// Shape for the polyline segment starting at `a`.
fn segment_shape(a: &PlineVertex<f64>, b: &PlineVertex<f64>) -> Shape {
    let start = Point::new(a.x, a.y);
    let end = Point::new(b.x, b.y);
    if a.bulge.abs() < BULGE_EPSILON {
        return Shape::line(String::new(), start, end);
    }
    let chord = end - start;
    let length = chord.length();
    let bulge = a.bulge;
    let mid = start.lerp(&end, 0.5);
    let center =
        mid + chord.normalized().left_perpendicular() * (length * (1.0 - bulge * bulge) / (4.0 * bulge));
    let theta = 4.0 * bulge.abs().atan();
    let radius = length / (2.0 * (theta / 2.0).sin());
    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let end_angle = (end.y - center.y).atan2(end.x - center.x);
    Shape::new(
        String::new(),
        Geometry::Arc(Arc::new(center, radius, start_angle, end_angle, bulge < 0.0)),
    )
}

/// Convert an offset polyline to shapes matching the source winding and
/// starting nearest the source start point.
fn finalize_shapes(
    pline: &Pline<f64>,
    source: &SourcePath,
    chain: &Chain,
    tolerance: f64,
) -> Vec<Shape> {
    let n = pline.vertex_count();
    let segments = if source.closed { n } else { n.saturating_sub(1) };
    let mut shapes: Vec<Shape> = (0..segments)
        .filter_map(|i| {
            let a = pline.at(i);
            let b = pline.at((i + 1) % n);
            (!same_pos(&a, &b)).then(|| segment_shape(&a, &b))
        })
        .collect();

    if source.closed {
        let source_ccw = pline_area(&source.pline) > 0.0;
        let result_ccw = pline_area(pline) > 0.0;
        if source_ccw != result_ccw {
            shapes = shapes.iter().rev().map(Shape::reversed).collect();
        }
        if let Some(start) = chain.start_point() {
            let nearest = shapes
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.start_point()
                        .distance_to(&start)
                        .total_cmp(&b.start_point().distance_to(&start))
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            shapes.rotate_left(nearest);
        }
    } else if let (Some(first), Some(start)) = (shapes.first(), chain.start_point()) {
        // Keep open results running the same way as the source
        let reversed_start = shapes.last().map(Shape::end_point).unwrap_or(first.start_point());
        if reversed_start.distance_to(&start) + tolerance < first.start_point().distance_to(&start)
        {
            shapes = shapes.iter().rev().map(Shape::reversed).collect();
        }
    }

    for (i, shape) in shapes.iter_mut().enumerate() {
        shape.id = format!("{}-offset-{}", chain.id, i);
    }
    shapes
}
