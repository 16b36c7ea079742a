//! `plan_hash` must depend only on the canonical content of a plan request,
//! not on row ordering, and must differ whenever the content differs.

mod common;

use common::{claims, orchestrator, plan_request, row};
use rcs::plan::RowAction;

#[test]
fn plan_hash_is_independent_of_row_order() {
    let orch_a = orchestrator();
    let plan_a = orch_a
        .create_dry_run_plan(
            plan_request("plan-a", vec![row("row-01", RowAction::Update), row("row-02", RowAction::Update)]),
            &claims(),
        )
        .unwrap();

    let orch_b = orchestrator();
    let plan_b = orch_b
        .create_dry_run_plan(
            plan_request("plan-a", vec![row("row-02", RowAction::Update), row("row-01", RowAction::Update)]),
            &claims(),
        )
        .unwrap();

    assert_eq!(plan_a.plan_hash, plan_b.plan_hash);
    // the stored plan itself is still returned sorted by row_id
    assert_eq!(plan_a.rows[0].row_id, "row-01");
    assert_eq!(plan_b.rows[0].row_id, "row-01");
}

#[test]
fn plan_hash_changes_when_a_row_action_changes() {
    let orch = orchestrator();
    let plan_a = orch
        .create_dry_run_plan(plan_request("plan-a", vec![row("row-01", RowAction::Update)]), &claims())
        .unwrap();

    let orch2 = orchestrator();
    let plan_b = orch2
        .create_dry_run_plan(plan_request("plan-b", vec![row("row-01", RowAction::Delete)]), &claims())
        .unwrap();

    assert_ne!(plan_a.plan_hash, plan_b.plan_hash);
}

#[test]
fn executable_gate_is_granted_once_watermarks_are_fresh() {
    let orch = orchestrator();
    let plan = orch
        .create_dry_run_plan(plan_request("plan-a", vec![row("row-01", RowAction::Update)]), &claims())
        .unwrap();
    assert_eq!(plan.gate.reason_code, "none");
}
