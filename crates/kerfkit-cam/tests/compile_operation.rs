mod common;

use common::{nested_part, square_ccw, torch_library, unit_square_cw};
use kerfkit_cam::{
    resolve_offset_direction, CavalierOffsetEngine, CompileOutput, CompilerConfig, CutCompiler,
    MemberRole, NormalSide, OffsetDirection, OffsetOrchestrator, OffsetParameters, WarningKind,
};
use kerfkit_core::{
    CutDirection, KerfCompensation, LeadConfig, MeasurementSystem, Operation, OptimizeStarts,
    Point, TargetType, ToolId, ToolLibrary,
};
use std::sync::Arc;

const TOLERANCE: f64 = 1e-6;

fn compiler() -> CutCompiler {
    CutCompiler::new(CompilerConfig::default())
}

#[test]
fn test_kerf_role_table() {
    use KerfCompensation as K;
    use MemberRole as R;
    use OffsetDirection as D;

    let expected = [
        (K::None, [D::None, D::None, D::None, D::None]),
        (K::Inner, [D::Inset, D::Inset, D::Inset, D::Inset]),
        (K::Outer, [D::Outset, D::Outset, D::Outset, D::Outset]),
        (K::Part, [D::None, D::Outset, D::Inset, D::None]),
    ];
    let roles = [R::Standalone, R::Shell, R::Hole, R::Slot];
    for (mode, directions) in expected {
        for (role, direction) in roles.iter().zip(directions) {
            assert_eq!(
                resolve_offset_direction(mode, *role),
                direction,
                "{mode} on {role}"
            );
        }
    }
}

#[tokio::test]
async fn test_nested_part_yields_ordered_cuts() {
    let mut part = nested_part();
    part.slots.clear();
    let op = Operation::new("op1", "Profile", TargetType::Parts)
        .with_targets(["P1"])
        .with_tool("torch")
        .with_kerf(KerfCompensation::Part);

    let output = compiler()
        .create_cuts_from_operation(&op, &[], &[part], &torch_library(), TOLERANCE)
        .await;

    assert!(output.warnings.is_empty(), "{:?}", output.warnings);
    assert_eq!(output.cuts.len(), 4);
    let chains: Vec<&str> = output.cuts.iter().map(|c| c.chain_id.as_str()).collect();
    assert_eq!(chains, vec!["shell", "hole-1", "hole-2", "hole-2-1"]);
    for pair in output.cuts.windows(2) {
        assert!(pair[0].order < pair[1].order);
    }
    assert_eq!(output.cuts[0].role, MemberRole::Shell);
    assert!(output.cuts[1..].iter().all(|c| c.is_hole && c.role == MemberRole::Hole));
    assert_eq!(output.cuts[3].name, "Profile - (Hole 2) Part P1 (Hole 1)");
    assert!(output.cuts.iter().all(|c| c.part_id.as_deref() == Some("P1")));
}

#[tokio::test]
async fn test_part_mode_offsets_per_role() {
    let op = Operation::new("op1", "Profile", TargetType::Parts)
        .with_targets(["P1"])
        .with_tool("torch")
        .with_kerf(KerfCompensation::Part);

    let output = compiler()
        .create_cuts_from_operation(&op, &[], &[nested_part()], &torch_library(), TOLERANCE)
        .await;
    assert_eq!(output.cuts.len(), 5);

    let shell = &output.cuts[0];
    assert_eq!(shell.kerf_direction, OffsetDirection::Outset);
    let bounds = shell.cut_chain.as_ref().unwrap().bounds().unwrap();
    assert!((bounds.min.x + 1.0).abs() < 1e-3);
    assert!((bounds.max.x - 101.0).abs() < 1e-3);

    let hole = &output.cuts[1];
    assert_eq!(hole.kerf_direction, OffsetDirection::Inset);
    assert_eq!(hole.kerf_width, Some(2.0));
    let bounds = hole.cut_chain.as_ref().unwrap().bounds().unwrap();
    assert!((bounds.min.x - 11.0).abs() < 1e-6);
    assert!((bounds.max.x - 19.0).abs() < 1e-6);

    let slot = &output.cuts[4];
    assert_eq!(slot.role, MemberRole::Slot);
    assert_eq!(slot.kerf_compensation, KerfCompensation::Part);
    assert_eq!(slot.kerf_direction, OffsetDirection::None);
    assert!(slot.offset.is_none());
    assert_eq!(slot.name, "Profile - Part P1 (Slot 1)");
}

#[tokio::test]
async fn test_part_mode_on_chain_target_means_no_offset() {
    let chain = square_ccw("c1", Point::new(0.0, 0.0), 10.0);
    let op = Operation::new("op1", "Profile", TargetType::Chains)
        .with_targets(["c1"])
        .with_tool("torch")
        .with_kerf(KerfCompensation::Part);

    let output = compiler()
        .create_cuts_from_operation(&op, &[chain.clone()], &[], &torch_library(), TOLERANCE)
        .await;
    let cut = &output.cuts[0];
    assert_eq!(cut.kerf_compensation, KerfCompensation::None);
    assert!(cut.offset.is_none());
    assert_eq!(cut.cut_chain.as_ref().unwrap().shapes, chain.shapes);
    assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn test_missing_tool_degrades_to_no_offset() {
    let chain = square_ccw("c1", Point::new(0.0, 0.0), 10.0);
    let tools = torch_library();
    let missing = ToolId::from("no-such-tool");

    let orchestrator = OffsetOrchestrator::new(
        Arc::new(CavalierOffsetEngine::new()),
        OffsetParameters::default(),
        MeasurementSystem::Metric,
    );
    assert!(orchestrator
        .compute_offset(&chain, OffsetDirection::Inset, Some(&missing), &tools)
        .await
        .is_none());

    let op = Operation::new("op1", "Inner", TargetType::Chains)
        .with_targets(["c1"])
        .with_tool("no-such-tool")
        .with_kerf(KerfCompensation::Inner);
    let output = compiler()
        .create_cuts_from_operation(&op, &[chain.clone()], &[], &tools, TOLERANCE)
        .await;

    assert_eq!(output.cuts.len(), 1);
    let cut = &output.cuts[0];
    assert_eq!(cut.kerf_compensation, KerfCompensation::Inner);
    assert!(cut.offset.is_none());
    assert!(!cut.is_offset());
    assert_eq!(cut.cut_chain.as_ref().unwrap().shapes, chain.shapes);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].kind, WarningKind::UnresolvedTool);
    assert!(output.warnings[0].message.contains("no-such-tool"));
}

#[tokio::test]
async fn test_unresolved_targets_do_not_block_siblings() {
    let op = Operation::new("op1", "Profile", TargetType::Chains)
        .with_targets(["ghost", "c1"]);
    let chains = vec![square_ccw("c1", Point::new(0.0, 0.0), 10.0)];
    let output = compiler()
        .create_cuts_from_operation(&op, &chains, &[], &ToolLibrary::new(), TOLERANCE)
        .await;
    assert_eq!(output.cuts.len(), 1);
    assert_eq!(output.warnings[0].kind, WarningKind::UnresolvedChain);
    assert_eq!(output.warnings[0].target_id, "ghost");
}

#[tokio::test]
async fn test_midpoint_start_updates_chain_and_normal() {
    let square = unit_square_cw();
    let op = Operation::new("op1", "Profile", TargetType::Chains)
        .with_targets(["square"])
        .with_direction(CutDirection::Clockwise)
        .with_optimize_starts(OptimizeStarts::Midpoint);

    let output = compiler()
        .create_cuts_from_operation(&op, &[square], &[], &ToolLibrary::new(), TOLERANCE)
        .await;
    let cut = &output.cuts[0];
    let chain = cut.cut_chain.as_ref().unwrap();

    assert_eq!(chain.shapes.len(), 5);
    assert_eq!(chain.start_point(), Some(Point::new(0.0, 0.5)));
    assert_eq!(chain.end_point(), Some(Point::new(0.0, 0.5)));
    assert_eq!(chain.shapes[4].start_point(), Point::new(0.0, 0.0));
    assert_eq!(cut.execution_clockwise, Some(true));

    let normal = cut.normal.unwrap();
    assert_eq!(normal.connection_point, Point::new(0.0, 0.5));
    // Travelling up the left edge clockwise: outside is -X
    assert_eq!(normal.side, NormalSide::Left);
    assert!((normal.normal.x + 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_leads_follow_final_geometry() {
    let op = Operation::new("op1", "Profile", TargetType::Chains)
        .with_targets(["square"])
        .with_direction(CutDirection::Clockwise)
        .with_optimize_starts(OptimizeStarts::Midpoint)
        .with_leads(LeadConfig::line(0.25), LeadConfig::none());

    let output = compiler()
        .create_cuts_from_operation(&op, &[unit_square_cw()], &[], &ToolLibrary::new(), TOLERANCE)
        .await;
    let cut = &output.cuts[0];
    let lead_in = cut.lead_in.as_ref().unwrap();
    assert_eq!(lead_in.points.last(), Some(&Point::new(0.0, 0.5)));
    assert!((lead_in.points[0].x + 0.25).abs() < 1e-12);
    assert!(cut.lead_validation.as_ref().unwrap().is_valid);
}

fn normalized(mut output: CompileOutput) -> CompileOutput {
    for cut in &mut output.cuts {
        cut.id.clear();
        if let Some(record) = cut.offset.as_mut() {
            record.generated_at = chrono::DateTime::from_timestamp(0, 0).unwrap();
        }
    }
    output
}

#[tokio::test]
async fn test_compilation_is_deterministic_and_pure() {
    let parts = vec![nested_part()];
    let chains = vec![unit_square_cw(), square_ccw("c2", Point::new(200.0, 0.0), 20.0)];
    let tools = torch_library();
    let before_parts = serde_json::to_vec(&parts).unwrap();
    let before_chains = serde_json::to_vec(&chains).unwrap();

    let part_op = Operation::new("op1", "Parts", TargetType::Parts)
        .with_targets(["P1"])
        .with_tool("torch")
        .with_kerf(KerfCompensation::Part)
        .with_direction(CutDirection::Clockwise)
        .with_leads(LeadConfig::arc(1.0), LeadConfig::line(1.0));
    let chain_op = Operation::new("op2", "Chains", TargetType::Chains)
        .with_targets(["c2", "square"])
        .with_tool("torch")
        .with_kerf(KerfCompensation::Outer)
        .with_optimize_starts(OptimizeStarts::Midpoint);

    let compiler = compiler();
    for op in [&part_op, &chain_op] {
        let first = compiler
            .create_cuts_from_operation(op, &chains, &parts, &tools, TOLERANCE)
            .await;
        let second = compiler
            .create_cuts_from_operation(op, &chains, &parts, &tools, TOLERANCE)
            .await;
        assert!(!first.cuts.is_empty());
        assert_ne!(first.cuts[0].id, second.cuts[0].id);
        assert_eq!(normalized(first), normalized(second));
    }

    assert_eq!(serde_json::to_vec(&parts).unwrap(), before_parts);
    assert_eq!(serde_json::to_vec(&chains).unwrap(), before_chains);
}

#[tokio::test]
async fn test_hole_underspeed_only_on_holes() {
    let mut op = Operation::new("op1", "Profile", TargetType::Parts)
        .with_targets(["P1"])
        .with_tool("torch");
    op.hole_underspeed_enabled = true;
    op.hole_underspeed_percent = 50.0;

    let output = compiler()
        .create_cuts_from_operation(&op, &[], &[nested_part()], &torch_library(), TOLERANCE)
        .await;
    for cut in &output.cuts {
        let expected = (cut.role == MemberRole::Hole).then_some(50.0);
        assert_eq!(cut.hole_underspeed_percent, expected, "{}", cut.name);
        assert_eq!(cut.feed_rate, Some(2500.0));
    }
}
