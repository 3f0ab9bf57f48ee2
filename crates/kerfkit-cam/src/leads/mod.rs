//! Lead-in and lead-out orchestration.
//!
//! Picks the geometry a cut's leads are computed against, runs the lead
//! engine and folds its answer (or its failure) into a [`LeadValidation`].
//! Engine calls run in their own tasks so a panicking engine only affects
//! the cut it was working on.

mod arc_line;

pub use arc_line::ArcLineLeadEngine;

use async_trait::async_trait;
use kerfkit_core::{clone_shapes, Chain, CutDirection, LeadConfig, Operation, Part};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::cut::{Cut, CutNormal, LeadGeometry, LeadValidation};
use crate::error::CamResult;

/// Text recorded when an engine fault carries no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Everything a lead engine needs for one cut.
#[derive(Debug, Clone)]
pub struct LeadRequest {
    pub chain: Chain,
    pub lead_in: LeadConfig,
    pub lead_out: LeadConfig,
    pub cut_direction: CutDirection,
    pub part: Option<Part>,
    pub normal: Option<CutNormal>,
}

/// Leads produced by an engine, with non-fatal notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadResult {
    pub lead_in: Option<LeadGeometry>,
    pub lead_out: Option<LeadGeometry>,
    pub warnings: Vec<String>,
}

/// Lead geometry construction engine.
#[async_trait]
pub trait LeadEngine: Send + Sync {
    async fn calculate_leads(&self, request: LeadRequest) -> CamResult<LeadResult>;
}

/// Leads for one cut as stored on the cut.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutLeads {
    pub lead_in: Option<LeadGeometry>,
    pub lead_out: Option<LeadGeometry>,
    /// `None` when no lead was requested
    pub validation: Option<LeadValidation>,
}

impl CutLeads {
    pub fn apply_to(self, cut: &mut Cut) {
        cut.lead_in = self.lead_in;
        cut.lead_out = self.lead_out;
        cut.lead_validation = self.validation;
    }
}

/// Chain the leads of `cut` are computed against.
///
/// The cut's own execution chain wins; otherwise a chain is built from the
/// offset shapes, keeping the source winding and id so part lookups still
/// work; otherwise the raw source chain is used.
pub fn select_lead_source(cut: &Cut, source_chain: Option<&Chain>) -> Option<Chain> {
    if let Some(cut_chain) = &cut.cut_chain {
        return Some(cut_chain.clone());
    }
    if let Some(record) = cut.offset.as_ref().filter(|r| !r.offset_shapes.is_empty()) {
        return Some(Chain {
            id: format!("{}-offset", cut.chain_id),
            shapes: clone_shapes(&record.offset_shapes),
            clockwise: source_chain.and_then(|c| c.clockwise),
            original_chain_id: Some(cut.chain_id.clone()),
        });
    }
    source_chain.cloned()
}

/// Drives the lead engine for cuts.
#[derive(Clone)]
pub struct LeadOrchestrator {
    engine: Arc<dyn LeadEngine>,
}

impl LeadOrchestrator {
    pub fn new(engine: Arc<dyn LeadEngine>) -> Self {
        Self { engine }
    }

    /// Compute the leads of one cut.
    pub async fn calculate_cut_leads(
        &self,
        cut: &Cut,
        operation: &Operation,
        source_chain: Option<&Chain>,
        part: Option<&Part>,
    ) -> CutLeads {
        if operation.lead_in.is_none() && operation.lead_out.is_none() {
            return CutLeads::default();
        }
        let Some(chain) = select_lead_source(cut, source_chain) else {
            return CutLeads {
                validation: Some(LeadValidation::failed(format!(
                    "No geometry available for cut {}",
                    cut.name
                ))),
                ..Default::default()
            };
        };

        let request = LeadRequest {
            chain,
            lead_in: operation.lead_in,
            lead_out: operation.lead_out,
            cut_direction: cut.cut_direction,
            part: part.cloned(),
            normal: cut.normal,
        };
        let engine = Arc::clone(&self.engine);
        let handle = tokio::spawn(async move { engine.calculate_leads(request).await });

        match handle.await {
            Ok(Ok(result)) => {
                debug!(
                    "Cut {}: leads in={} out={}",
                    cut.name,
                    result.lead_in.is_some(),
                    result.lead_out.is_some()
                );
                CutLeads {
                    lead_in: result.lead_in,
                    lead_out: result.lead_out,
                    validation: Some(LeadValidation::valid(result.warnings)),
                }
            }
            Ok(Err(e)) => {
                error!("Lead calculation failed for cut {}: {}", cut.name, e);
                CutLeads {
                    validation: Some(LeadValidation::failed(e.to_string())),
                    ..Default::default()
                }
            }
            Err(join_error) => {
                let message = if join_error.is_panic() {
                    panic_message(join_error.into_panic())
                } else {
                    UNKNOWN_ERROR.to_string()
                };
                error!("Lead engine panicked for cut {}: {}", cut.name, message);
                CutLeads {
                    validation: Some(LeadValidation::failed(message)),
                    ..Default::default()
                }
            }
        }
    }

    /// Compute leads for every cut of an operation, keyed by cut id.
    ///
    /// Cuts are processed concurrently. A failure on one cut is recorded in
    /// its validation and never blocks the others.
    pub async fn calculate_operation_leads(
        &self,
        cuts: &[Cut],
        operation: &Operation,
        chains: &[Chain],
        parts: &[Part],
    ) -> HashMap<String, CutLeads> {
        let operation = Arc::new(operation.clone());
        let mut handles = Vec::with_capacity(cuts.len());
        for cut in cuts {
            let orchestrator = self.clone();
            let operation = Arc::clone(&operation);
            let cut = cut.clone();
            let chain = chains.iter().find(|c| c.id == cut.chain_id).cloned();
            let part = cut
                .part_id
                .as_ref()
                .and_then(|id| parts.iter().find(|p| &p.id == id))
                .cloned();
            let cut_id = cut.id.clone();
            let handle = tokio::spawn(async move {
                orchestrator
                    .calculate_cut_leads(&cut, &operation, chain.as_ref(), part.as_ref())
                    .await
            });
            handles.push((cut_id, handle));
        }

        let mut leads = HashMap::with_capacity(handles.len());
        for (cut_id, handle) in handles {
            match handle.await {
                Ok(result) => {
                    leads.insert(cut_id, result);
                }
                Err(e) => error!("Lead task for cut {} failed: {}", cut_id, e),
            }
        }
        leads
    }
}

/// Message carried by a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNKNOWN_ERROR.to_string()
    }
}
