//! Start-point optimization.
//!
//! An optimizer may hand back a reordered execution chain for a cut. The
//! compiler then recomputes the realized winding and the cut normal from
//! the new chain.

use kerfkit_core::{Chain, OptimizeStarts};
use tracing::debug;

use crate::cut::Cut;

/// Execution chain produced by a start-point optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct StartPointUpdate {
    pub cut_chain: Chain,
}

/// Picks a better start for a cut's execution chain.
pub trait StartPointOptimizer: Send + Sync {
    /// Returns `None` when the cut is left as is.
    fn optimize(&self, cut: &Cut, mode: OptimizeStarts, tolerance: f64)
        -> Option<StartPointUpdate>;
}

/// Starts closed cuts halfway along their first shape.
///
/// The first shape is split at its midpoint: the second half opens the
/// chain and the first half closes it, so the path is unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointStartOptimizer;

impl StartPointOptimizer for MidpointStartOptimizer {
    fn optimize(
        &self,
        cut: &Cut,
        mode: OptimizeStarts,
        tolerance: f64,
    ) -> Option<StartPointUpdate> {
        if mode != OptimizeStarts::Midpoint {
            return None;
        }
        let chain = cut.cut_chain.as_ref()?;
        if !chain.is_closed(tolerance) {
            debug!("Cut {}: open chain keeps its start point", cut.name);
            return None;
        }
        let first = chain.shapes.first()?;
        if first.length() <= tolerance {
            return None;
        }

        let (head, tail) = first.split_at(0.5);
        let mut shapes = Vec::with_capacity(chain.shapes.len() + 1);
        shapes.push(tail);
        shapes.extend(chain.shapes.iter().skip(1).cloned());
        shapes.push(head);

        Some(StartPointUpdate {
            cut_chain: Chain {
                shapes,
                ..chain.clone()
            },
        })
    }
}
