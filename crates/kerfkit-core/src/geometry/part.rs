//! Detected parts: a shell with nested holes and slots.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Chain};

/// Hole inside a shell or inside another hole, to any depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartHole {
    pub id: String,
    pub chain: Chain,
    #[serde(default)]
    pub holes: Vec<PartHole>,
}

impl PartHole {
    pub fn new(id: impl Into<String>, chain: Chain) -> Self {
        Self {
            id: id.into(),
            chain,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(mut self, holes: Vec<PartHole>) -> Self {
        self.holes = holes;
        self
    }

    fn count(&self) -> usize {
        1 + self.holes.iter().map(PartHole::count).sum::<usize>()
    }

    fn contains_chain(&self, chain_id: &str) -> bool {
        self.chain.id == chain_id || self.holes.iter().any(|h| h.contains_chain(chain_id))
    }
}

/// Inner boundary cut without hole semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSlot {
    pub id: String,
    pub chain: Chain,
}

impl PartSlot {
    pub fn new(id: impl Into<String>, chain: Chain) -> Self {
        Self {
            id: id.into(),
            chain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub shell: Chain,
    #[serde(default)]
    pub holes: Vec<PartHole>,
    #[serde(default)]
    pub slots: Vec<PartSlot>,
    pub bounding_box: BoundingBox,
}

impl Part {
    /// Builds a part, deriving the bounding box from the shell.
    pub fn new(id: impl Into<String>, shell: Chain) -> Self {
        let bounding_box = shell.bounds().unwrap_or_else(|| {
            BoundingBox::new(Default::default(), Default::default())
        });
        Self {
            id: id.into(),
            shell,
            holes: Vec::new(),
            slots: Vec::new(),
            bounding_box,
        }
    }

    pub fn with_holes(mut self, holes: Vec<PartHole>) -> Self {
        self.holes = holes;
        self
    }

    pub fn with_slots(mut self, slots: Vec<PartSlot>) -> Self {
        self.slots = slots;
        self
    }

    /// Holes at every nesting depth.
    pub fn total_hole_count(&self) -> usize {
        self.holes.iter().map(PartHole::count).sum()
    }

    /// Whether `chain_id` is a hole of this part at any depth.
    pub fn is_hole_chain(&self, chain_id: &str) -> bool {
        self.holes.iter().any(|h| h.contains_chain(chain_id))
    }

    pub fn is_slot_chain(&self, chain_id: &str) -> bool {
        self.slots.iter().any(|s| s.chain.id == chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Shape};

    fn tiny(id: &str) -> Chain {
        Chain::new(
            id,
            vec![Shape::line(format!("{id}-l"), Point::new(0.0, 0.0), Point::new(1.0, 1.0))],
        )
    }

    #[test]
    fn test_nested_hole_lookup() {
        let part = Part::new("p", tiny("shell")).with_holes(vec![
            PartHole::new("h1", tiny("c-h1")),
            PartHole::new("h2", tiny("c-h2"))
                .with_holes(vec![PartHole::new("h2.1", tiny("c-h2.1"))]),
        ]);
        assert_eq!(part.total_hole_count(), 3);
        assert!(part.is_hole_chain("c-h2.1"));
        assert!(!part.is_hole_chain("shell"));
        assert_eq!(part.bounding_box.max, Point::new(1.0, 1.0));
    }
}
