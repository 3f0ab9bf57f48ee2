//! Operation to cut compilation.
//!
//! [`CutCompiler::create_cuts_from_operation`] is a pure function of its
//! inputs: it builds a [`CompilePlan`], compiles every plan entry in its own
//! task and collects the results in plan order.

use kerfkit_core::{
    Chain, CutDirection, KerfCompensation, MeasurementSystem, Operation, OptimizeStarts, Part,
    ToolLibrary,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::CompilerConfig;
use crate::cut::{
    CompileOutput, CompileWarning, Cut, CutNormal, LeadValidation, MemberRole, WarningKind,
};
use crate::decompose::{CompilePlan, PlanEntry};
use crate::direction::{create_cut_chain, realized_execution_clockwise};
use crate::error::CamError;
use crate::leads::{ArcLineLeadEngine, LeadEngine, LeadOrchestrator, UNKNOWN_ERROR};
use crate::offset::{
    resolve_offset_direction, CavalierOffsetEngine, OffsetDirection, OffsetEngine,
    OffsetOrchestrator, OffsetOutcome, OffsetSkip,
};
use crate::orientation::{NormalEngine, WasteSideNormalEngine};
use crate::start_point::{MidpointStartOptimizer, StartPointOptimizer};

/// Engines the compiler delegates geometry work to.
#[derive(Clone)]
pub struct Engines {
    pub offset: Arc<dyn OffsetEngine>,
    pub lead: Arc<dyn LeadEngine>,
    pub normal: Arc<dyn NormalEngine>,
    pub start_point: Arc<dyn StartPointOptimizer>,
}

impl Engines {
    /// Built-in engines configured from `config`
    pub fn defaults(config: &CompilerConfig) -> Self {
        let tolerance = config.tessellation_tolerance;
        Self {
            offset: Arc::new(
                CavalierOffsetEngine::new().with_tessellation_tolerance(tolerance),
            ),
            lead: Arc::new(ArcLineLeadEngine::new(tolerance)),
            normal: Arc::new(WasteSideNormalEngine::new(tolerance)),
            start_point: Arc::new(MidpointStartOptimizer),
        }
    }

    pub fn with_offset_engine(mut self, engine: Arc<dyn OffsetEngine>) -> Self {
        self.offset = engine;
        self
    }

    pub fn with_lead_engine(mut self, engine: Arc<dyn LeadEngine>) -> Self {
        self.lead = engine;
        self
    }

    pub fn with_normal_engine(mut self, engine: Arc<dyn NormalEngine>) -> Self {
        self.normal = engine;
        self
    }

    pub fn with_start_point_optimizer(mut self, optimizer: Arc<dyn StartPointOptimizer>) -> Self {
        self.start_point = optimizer;
        self
    }
}

/// Shared, read-only state for the member tasks of one compilation.
struct MemberContext {
    operation: Operation,
    tools: ToolLibrary,
    measurement_system: MeasurementSystem,
    offsets: OffsetOrchestrator,
    leads: LeadOrchestrator,
    normal: Arc<dyn NormalEngine>,
    start_point: Arc<dyn StartPointOptimizer>,
    tolerance: f64,
}

struct MemberOutcome {
    cut: Option<Cut>,
    warnings: Vec<CompileWarning>,
}

/// Compiles operations into cuts.
pub struct CutCompiler {
    engines: Engines,
    config: CompilerConfig,
}

impl Default for CutCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl CutCompiler {
    /// Create a compiler with the built-in engines
    pub fn new(config: CompilerConfig) -> Self {
        let engines = Engines::defaults(&config);
        Self { engines, config }
    }

    /// Create a compiler with caller-supplied engines
    pub fn with_engines(config: CompilerConfig, engines: Engines) -> Self {
        Self { engines, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn lead_orchestrator(&self) -> LeadOrchestrator {
        LeadOrchestrator::new(Arc::clone(&self.engines.lead))
    }

    /// Compile one operation into ordered cuts.
    ///
    /// Never fails: unresolved references, failed offsets and lead faults
    /// are reported as warnings next to whatever cuts could be built.
    pub async fn create_cuts_from_operation(
        &self,
        operation: &Operation,
        chains: &[Chain],
        parts: &[Part],
        tools: &ToolLibrary,
        tolerance: f64,
    ) -> CompileOutput {
        if !operation.is_compilable() {
            debug!(
                "Operation {} is disabled or has no targets; nothing to compile",
                operation.name
            );
            return CompileOutput::default();
        }

        let plan = CompilePlan::build(operation, chains, parts);
        debug!(
            "Operation {}: {} cut candidates from {} targets",
            operation.name,
            plan.len(),
            operation.target_ids.len()
        );

        let context = Arc::new(MemberContext {
            operation: operation.clone(),
            tools: tools.clone(),
            measurement_system: self.config.measurement_system,
            offsets: OffsetOrchestrator::new(
                Arc::clone(&self.engines.offset),
                self.config.offset,
                self.config.measurement_system,
            ),
            leads: self.lead_orchestrator(),
            normal: Arc::clone(&self.engines.normal),
            start_point: Arc::clone(&self.engines.start_point),
            tolerance,
        });

        let mut output = CompileOutput {
            cuts: Vec::with_capacity(plan.len()),
            warnings: plan.warnings,
        };

        let mut handles = Vec::with_capacity(plan.entries.len());
        for entry in plan.entries {
            let chain_id = entry.chain.id.clone();
            let context = Arc::clone(&context);
            handles.push((chain_id, tokio::spawn(compile_member(context, entry))));
        }

        // Awaiting in plan order keeps the output independent of completion order
        for (chain_id, handle) in handles {
            match handle.await {
                Ok(outcome) => {
                    output.warnings.extend(outcome.warnings);
                    output.cuts.extend(outcome.cut);
                }
                Err(e) => {
                    error!("Compilation task for chain {} failed: {}", chain_id, e);
                    output.warnings.push(CompileWarning::new(
                        WarningKind::TaskFailed,
                        &operation.id,
                        &chain_id,
                        format!("Compilation of chain {chain_id} failed: {e}"),
                    ));
                }
            }
        }

        info!(
            "Operation {}: {} cuts, {} warnings",
            operation.name,
            output.cuts.len(),
            output.warnings.len()
        );
        output
    }

    /// Recompute the leads of already compiled cuts.
    ///
    /// Used when only the lead settings of an operation changed. Returns
    /// warnings for cuts whose leads failed.
    pub async fn refresh_leads(
        &self,
        cuts: &mut [Cut],
        operation: &Operation,
        chains: &[Chain],
        parts: &[Part],
    ) -> Vec<CompileWarning> {
        let mut leads = self
            .lead_orchestrator()
            .calculate_operation_leads(cuts, operation, chains, parts)
            .await;
        let mut warnings = Vec::new();
        for cut in cuts.iter_mut() {
            let Some(result) = leads.remove(&cut.id) else {
                continue;
            };
            if let Some(warning) = lead_warning(operation, cut, result.validation.as_ref()) {
                warnings.push(warning);
            }
            result.apply_to(cut);
        }
        warnings
    }
}

fn lead_warning(
    operation: &Operation,
    cut: &Cut,
    validation: Option<&LeadValidation>,
) -> Option<CompileWarning> {
    let validation = validation.filter(|v| !v.is_valid)?;
    Some(CompileWarning::new(
        WarningKind::LeadFailed,
        &operation.id,
        &cut.chain_id,
        format!(
            "Leads for {} failed: {}",
            cut.name,
            validation.error.as_deref().unwrap_or(UNKNOWN_ERROR)
        ),
    ))
}

/// Kerf mode recorded on the cut; `part` means nothing for a bare chain.
fn effective_kerf(mode: KerfCompensation, role: MemberRole) -> KerfCompensation {
    match (mode, role) {
        (KerfCompensation::Part, MemberRole::Standalone) => KerfCompensation::None,
        (mode, _) => mode,
    }
}

fn skip_warning_kind(reason: &OffsetSkip) -> Option<WarningKind> {
    match reason {
        OffsetSkip::NoDirection => None,
        OffsetSkip::NoTool | OffsetSkip::ToolNotFound(_) => Some(WarningKind::UnresolvedTool),
        OffsetSkip::NoKerfWidth(_) => Some(WarningKind::MissingKerfWidth),
        OffsetSkip::EngineFailed(_) | OffsetSkip::EmptySide(_) => Some(WarningKind::OffsetFailed),
    }
}

fn compute_normal(
    context: &MemberContext,
    cut: &Cut,
    part: Option<&Part>,
) -> Option<CutNormal> {
    let chain = cut.cut_chain.as_ref()?;
    context
        .normal
        .compute_cut_normal(chain, cut.cut_direction, part, cut.kerf_direction)
}

/// Compile one plan entry: offset, direction, orientation, start point, leads.
async fn compile_member(context: Arc<MemberContext>, entry: PlanEntry) -> MemberOutcome {
    let operation = &context.operation;
    let chain = &entry.chain;
    let part = entry.part.as_deref();
    let member_warning = |kind: WarningKind, message: String| {
        CompileWarning::new(kind, &operation.id, &chain.id, message)
    };

    if let Err(err) = chain.ensure_not_empty() {
        let err = CamError::from(err);
        warn!("{}: {}", entry.name, err);
        return MemberOutcome {
            cut: None,
            warnings: vec![member_warning(WarningKind::EmptyChain, err.to_string())],
        };
    }

    let mut warnings = Vec::new();
    let kerf_mode = effective_kerf(operation.kerf_compensation, entry.role);
    let kerf_direction = resolve_offset_direction(kerf_mode, entry.role);
    let tool = operation
        .tool_id
        .as_ref()
        .and_then(|id| context.tools.get_tool(id));

    if kerf_direction == OffsetDirection::None && tool.is_none() {
        if let Some(tool_id) = &operation.tool_id {
            warn!("{}: tool {} not found", entry.name, tool_id);
            warnings.push(member_warning(
                WarningKind::UnresolvedTool,
                format!("Tool {tool_id} not found"),
            ));
        }
    }

    let offset = match context
        .offsets
        .compute_offset_outcome(chain, kerf_direction, operation.tool_id.as_ref(), &context.tools)
        .await
    {
        OffsetOutcome::Applied(record) => {
            for note in &record.warnings {
                debug!("{}: offset note: {}", entry.name, note);
            }
            Some(record)
        }
        OffsetOutcome::Skipped(reason) => {
            if let Some(kind) = skip_warning_kind(&reason) {
                warnings.push(member_warning(kind, reason.to_string()));
            }
            None
        }
    };

    let built = create_cut_chain(
        chain,
        operation.cut_direction,
        offset.as_ref().map(|record| record.offset_shapes.as_slice()),
    );

    let system = context.measurement_system;
    let is_hole = entry.role == MemberRole::Hole;
    let kerf_width = offset
        .as_ref()
        .map(|record| record.kerf_width)
        .or_else(|| tool.and_then(|t| t.kerf_width_for(system)));

    let mut cut = Cut {
        id: Uuid::new_v4().to_string(),
        name: entry.name.clone(),
        operation_id: operation.id.clone(),
        chain_id: chain.id.clone(),
        part_id: part.map(|p| p.id.clone()),
        tool_id: operation.tool_id.clone(),
        role: entry.role,
        order: entry.order,
        enabled: true,
        cut_direction: operation.cut_direction,
        execution_clockwise: built.execution_clockwise,
        kerf_compensation: kerf_mode,
        kerf_direction,
        kerf_width,
        offset,
        cut_chain: Some(built.cut_chain),
        feed_rate: tool.and_then(|t| t.feed_rate.resolve(system)),
        plunge_rate: tool.and_then(|t| t.plunge_rate.resolve(system)),
        is_hole,
        hole_underspeed_percent: (is_hole && operation.hole_underspeed_enabled)
            .then_some(operation.hole_underspeed_percent),
        normal: None,
        lead_in: None,
        lead_out: None,
        lead_validation: None,
    };
    cut.normal = compute_normal(&context, &cut, part);

    if operation.optimize_starts != OptimizeStarts::None {
        if let Some(update) =
            context
                .start_point
                .optimize(&cut, operation.optimize_starts, context.tolerance)
        {
            cut.execution_clockwise = realized_execution_clockwise(
                &update.cut_chain,
                operation.cut_direction,
                cut.execution_clockwise,
                context.tolerance,
            );
            cut.cut_chain = Some(update.cut_chain);
            cut.normal = compute_normal(&context, &cut, part);
            debug!("{}: start point moved", entry.name);
        }
    }

    let leads = context
        .leads
        .calculate_cut_leads(&cut, operation, Some(chain), part)
        .await;
    if let Some(warning) = lead_warning(operation, &cut, leads.validation.as_ref()) {
        warnings.push(warning);
    }
    leads.apply_to(&mut cut);

    if cut.cut_direction != CutDirection::None {
        debug!(
            "{}: order {} clockwise={:?}",
            cut.name, cut.order, cut.execution_clockwise
        );
    }

    MemberOutcome {
        cut: Some(cut),
        warnings,
    }
}
