//! Cut direction resolution.
//!
//! Builds the execution chain a cut follows: a deep copy of the source (or
//! offset) shapes, reordered so the traversal matches the requested
//! direction.

use kerfkit_core::{clone_shapes, Chain, CutDirection, Shape};

/// Execution chain plus the winding it realizes.
#[derive(Debug, Clone, PartialEq)]
pub struct CutChainResult {
    pub cut_chain: Chain,
    /// `None` when no direction preference applies
    pub execution_clockwise: Option<bool>,
}

/// Natural direction of a chain, read from its stored winding flag.
pub fn natural_direction(chain: Option<&Chain>) -> CutDirection {
    chain
        .map(|c| CutDirection::from_winding(c.clockwise))
        .unwrap_or(CutDirection::None)
}

/// Build the execution chain for `chain` honoring `desired`.
///
/// When `offset_shapes` is given the execution chain is built from them,
/// but the natural direction is always taken from the original chain.
pub fn create_cut_chain(
    chain: &Chain,
    desired: CutDirection,
    offset_shapes: Option<&[Shape]>,
) -> CutChainResult {
    let source = offset_shapes.unwrap_or(&chain.shapes);
    let shapes = clone_shapes(source);
    let natural = natural_direction(Some(chain));

    let (shapes, execution_clockwise) = match (desired, natural) {
        (CutDirection::None, _) => (shapes, None),
        // Open chain: clockwise keeps the stored order, counterclockwise reverses it
        (CutDirection::Clockwise, CutDirection::None) => (shapes, Some(true)),
        (CutDirection::Counterclockwise, CutDirection::None) => {
            (reverse_shapes(shapes), Some(false))
        }
        (desired, natural) if desired != natural => {
            (reverse_shapes(shapes), desired.as_clockwise())
        }
        (desired, _) => (shapes, desired.as_clockwise()),
    };

    let winding = match natural {
        CutDirection::None => None,
        _ => execution_clockwise.or(chain.clockwise),
    };

    CutChainResult {
        cut_chain: Chain {
            id: format!("{}-cut", chain.id),
            shapes,
            clockwise: winding,
            original_chain_id: Some(chain.id.clone()),
        },
        execution_clockwise,
    }
}

/// Winding to report after the execution chain was reordered.
///
/// Closed chains report the winding their shapes actually trace; open
/// chains keep the value chosen when the chain was built.
pub fn realized_execution_clockwise(
    cut_chain: &Chain,
    desired: CutDirection,
    previous: Option<bool>,
    tolerance: f64,
) -> Option<bool> {
    if desired == CutDirection::None {
        return None;
    }
    if cut_chain.is_closed(tolerance) {
        cut_chain.realized_clockwise(tolerance).or(previous)
    } else {
        previous
    }
}

/// Reverse traversal: sequence order and each shape's own parameterization.
fn reverse_shapes(shapes: Vec<Shape>) -> Vec<Shape> {
    shapes.iter().rev().map(Shape::reversed).collect()
}
