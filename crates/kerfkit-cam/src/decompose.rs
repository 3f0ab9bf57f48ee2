//! Traversal plan for an operation.
//!
//! Every cut candidate of an operation gets a plan entry with a fixed
//! order index before any work is dispatched. Part targets expand into
//! their shell, their holes depth-first (parent before children, siblings
//! in list order) and finally their slots.

use kerfkit_core::{Chain, Operation, Part, PartHole, TargetType};
use std::sync::Arc;
use tracing::warn;

use crate::cut::{CompileWarning, MemberRole, WarningKind};

/// One member of a part in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartMember<'a> {
    pub role: MemberRole,
    pub chain: &'a Chain,
    /// 1-based positions from the outermost hole down to this one
    pub hole_path: Vec<usize>,
    /// 1-based slot position
    pub slot_index: Option<usize>,
}

/// Walks a part's shell, holes and slots.
pub struct PartDecomposer;

impl PartDecomposer {
    /// Members of `part` in cut order.
    pub fn members(part: &Part) -> Vec<PartMember<'_>> {
        let mut members = vec![PartMember {
            role: MemberRole::Shell,
            chain: &part.shell,
            hole_path: Vec::new(),
            slot_index: None,
        }];
        let mut path = Vec::new();
        Self::collect_holes(&part.holes, &mut path, &mut members);
        members.extend(part.slots.iter().enumerate().map(|(i, slot)| PartMember {
            role: MemberRole::Slot,
            chain: &slot.chain,
            hole_path: Vec::new(),
            slot_index: Some(i + 1),
        }));
        members
    }

    fn collect_holes<'a>(
        holes: &'a [PartHole],
        path: &mut Vec<usize>,
        members: &mut Vec<PartMember<'a>>,
    ) {
        for (i, hole) in holes.iter().enumerate() {
            path.push(i + 1);
            members.push(PartMember {
                role: MemberRole::Hole,
                chain: &hole.chain,
                hole_path: path.clone(),
                slot_index: None,
            });
            Self::collect_holes(&hole.holes, path, members);
            path.pop();
        }
    }

    /// Display name of a member within an operation.
    pub fn member_name(operation_name: &str, part_id: &str, member: &PartMember<'_>) -> String {
        match member.role {
            MemberRole::Shell => format!("{operation_name} - Part {part_id} (Shell)"),
            MemberRole::Hole => {
                let (own, ancestors): (usize, &[usize]) = match member.hole_path.split_last() {
                    Some((own, ancestors)) => (*own, ancestors),
                    None => (1, &[]),
                };
                let prefix: String = ancestors.iter().map(|k| format!("(Hole {k}) ")).collect();
                format!("{operation_name} - {prefix}Part {part_id} (Hole {own})")
            }
            MemberRole::Slot => format!(
                "{operation_name} - Part {part_id} (Slot {})",
                member.slot_index.unwrap_or(1)
            ),
            MemberRole::Standalone => format!("{operation_name} - Chain {}", member.chain.id),
        }
    }
}

/// A cut candidate with its precomputed position.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub order: usize,
    /// Target id from the operation (chain id or part id)
    pub target_id: String,
    pub role: MemberRole,
    pub name: String,
    pub chain: Chain,
    pub part: Option<Arc<Part>>,
}

/// Flat, ordered list of cut candidates for one operation.
#[derive(Debug, Clone, Default)]
pub struct CompilePlan {
    pub entries: Vec<PlanEntry>,
    pub warnings: Vec<CompileWarning>,
}

impl CompilePlan {
    /// Resolve the operation's targets and flatten them in output order.
    pub fn build(operation: &Operation, chains: &[Chain], parts: &[Part]) -> Self {
        let mut plan = CompilePlan::default();
        for target_id in &operation.target_ids {
            match operation.target_type {
                TargetType::Chains => match chains.iter().find(|c| &c.id == target_id) {
                    Some(chain) => plan.push(PlanEntry {
                        order: 0,
                        target_id: target_id.clone(),
                        role: MemberRole::Standalone,
                        name: format!("{} - Chain {}", operation.name, chain.id),
                        chain: chain.clone(),
                        part: None,
                    }),
                    None => plan.unresolved(operation, target_id, WarningKind::UnresolvedChain),
                },
                TargetType::Parts => match parts.iter().find(|p| &p.id == target_id) {
                    Some(part) => {
                        let shared = Arc::new(part.clone());
                        for member in PartDecomposer::members(part) {
                            plan.push(PlanEntry {
                                order: 0,
                                target_id: target_id.clone(),
                                role: member.role,
                                name: PartDecomposer::member_name(
                                    &operation.name,
                                    &part.id,
                                    &member,
                                ),
                                chain: member.chain.clone(),
                                part: Some(Arc::clone(&shared)),
                            });
                        }
                    }
                    None => plan.unresolved(operation, target_id, WarningKind::UnresolvedPart),
                },
            }
        }
        plan
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, mut entry: PlanEntry) {
        entry.order = self.entries.len();
        self.entries.push(entry);
    }

    fn unresolved(&mut self, operation: &Operation, target_id: &str, kind: WarningKind) {
        let what = match kind {
            WarningKind::UnresolvedPart => "Part",
            _ => "Chain",
        };
        warn!("Operation {}: {} {} not found", operation.name, what, target_id);
        self.warnings.push(CompileWarning::new(
            kind,
            &operation.id,
            target_id,
            format!("{what} {target_id} not found"),
        ));
    }
}
