//! Generation tracking for recompilation.
//!
//! The compiler itself is a pure function. A layer that recompiles on
//! change takes a ticket before each run and commits the result with it;
//! a result whose ticket was superseded by a newer run is dropped so it can
//! never overwrite newer cuts.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

use crate::cut::CompileOutput;

/// Identifies one compilation run of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    operation_id: String,
    generation: u64,
}

impl GenerationTicket {
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct OperationSlot {
    started: u64,
    committed: Option<(u64, CompileOutput)>,
}

/// Latest committed compile output per operation.
#[derive(Debug, Default)]
pub struct CompileGenerations {
    slots: Mutex<HashMap<String, OperationSlot>>,
}

impl CompileGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run for `operation_id`, superseding earlier ones.
    pub fn begin(&self, operation_id: &str) -> GenerationTicket {
        let mut slots = self.slots.lock();
        let slot = slots.entry(operation_id.to_string()).or_default();
        slot.started += 1;
        GenerationTicket {
            operation_id: operation_id.to_string(),
            generation: slot.started,
        }
    }

    /// Whether no newer run was started since `ticket` was issued.
    pub fn is_current(&self, ticket: &GenerationTicket) -> bool {
        self.slots
            .lock()
            .get(&ticket.operation_id)
            .is_some_and(|slot| slot.started == ticket.generation)
    }

    /// Store `output` unless a newer run has started. Returns whether it was stored.
    pub fn commit(&self, ticket: &GenerationTicket, output: CompileOutput) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(&ticket.operation_id) else {
            return false;
        };
        let newer_committed = slot
            .committed
            .as_ref()
            .is_some_and(|(generation, _)| *generation > ticket.generation);
        if slot.started != ticket.generation || newer_committed {
            debug!(
                "Dropping stale compile of {} (generation {}, latest {})",
                ticket.operation_id, ticket.generation, slot.started
            );
            return false;
        }
        slot.committed = Some((ticket.generation, output));
        true
    }

    /// Most recent committed output for an operation.
    pub fn latest(&self, operation_id: &str) -> Option<CompileOutput> {
        self.slots
            .lock()
            .get(operation_id)
            .and_then(|slot| slot.committed.as_ref())
            .map(|(_, output)| output.clone())
    }

    /// Drop everything known about an operation.
    pub fn forget(&self, operation_id: &str) {
        self.slots.lock().remove(operation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::{CompileWarning, WarningKind};

    fn output(marker: &str) -> CompileOutput {
        CompileOutput {
            cuts: Vec::new(),
            warnings: vec![CompileWarning::new(WarningKind::TaskFailed, "op", marker, marker)],
        }
    }

    #[test]
    fn test_stale_result_is_rejected() {
        let generations = CompileGenerations::new();
        let first = generations.begin("op");
        let second = generations.begin("op");
        assert!(!generations.is_current(&first));

        assert!(generations.commit(&second, output("second")));
        assert!(!generations.commit(&first, output("first")));
        assert_eq!(generations.latest("op"), Some(output("second")));
    }

    #[test]
    fn test_operations_are_independent() {
        let generations = CompileGenerations::new();
        let a = generations.begin("a");
        let b = generations.begin("b");
        assert!(generations.commit(&a, output("a")));
        assert!(generations.commit(&b, output("b")));
        assert_eq!(a.generation(), 1);
        assert_eq!(b.operation_id(), "b");
    }

    #[test]
    fn test_forget_invalidates_tickets() {
        let generations = CompileGenerations::new();
        let ticket = generations.begin("op");
        generations.forget("op");
        assert!(!generations.commit(&ticket, output("late")));
        assert_eq!(generations.latest("op"), None);
    }
}
