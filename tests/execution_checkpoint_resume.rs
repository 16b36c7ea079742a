//! Plan → job → execute through the public `Orchestrator` facade, forcing a
//! chunk-budget pause and walking it to completion via resume, inspecting
//! the checkpoint and rollback journal along the way.

mod common;

use common::{claims, create_job_request, execute_request, orchestrator, orchestrator_with_config, plan_request, resume_request, row};
use rcs::config::RcsConfig;
use rcs::execution::ExecutionStatus;
use rcs::plan::RowAction;

#[test]
fn happy_path_single_chunk_completes_immediately() {
    let orch = orchestrator();
    let claims = claims();

    let plan = orch
        .create_dry_run_plan(
            plan_request("plan-a", vec![row("row-01", RowAction::Update), row("row-02", RowAction::Update)]),
            &claims,
        )
        .unwrap();

    let job = orch.create_job(create_job_request(&plan), &claims, &plan).unwrap();
    let record = orch.execute_job(&job.job_id, execute_request(), &claims, &plan).unwrap();

    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(record.summary.applied_rows, 2);
    assert_eq!(record.chunks.len(), 1);

    let journal = orch.get_rollback_journal(&job.job_id, &claims).unwrap();
    assert_eq!(journal.len(), 2);
}

#[test]
fn chunk_budget_pause_then_resume_walks_to_completion() {
    let mut config = RcsConfig::default();
    config.max_chunks_per_attempt = 1;
    let orch = orchestrator_with_config(config);
    let claims = claims();

    let plan = orch
        .create_dry_run_plan(
            plan_request(
                "plan-b",
                vec![row("row-01", RowAction::Update), row("row-02", RowAction::Update), row("row-03", RowAction::Update)],
            ),
            &claims,
        )
        .unwrap();

    let job = orch.create_job(create_job_request(&plan), &claims, &plan).unwrap();

    let mut request = execute_request();
    request.chunk_size = Some(1);
    let record = orch.execute_job(&job.job_id, request, &claims, &plan).unwrap();
    assert_eq!(record.status, ExecutionStatus::Paused);
    assert_eq!(record.checkpoint.next_chunk_index, 1);

    let checkpoint = orch.get_checkpoint(&job.job_id, &claims).unwrap();
    assert_eq!(checkpoint.next_chunk_index, 1);
    assert_eq!(checkpoint.total_chunks, 3);

    let record = orch.resume_job(&job.job_id, resume_request(), &claims, &plan).unwrap();
    assert_eq!(record.status, ExecutionStatus::Paused);
    assert_eq!(record.checkpoint.next_chunk_index, 2);
    assert_eq!(record.resume_attempt_count, 1);

    let record = orch.resume_job(&job.job_id, resume_request(), &claims, &plan).unwrap();
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(record.summary.applied_rows, 3);
    assert_eq!(record.resume_attempt_count, 2);

    let journal = orch.get_rollback_journal(&job.job_id, &claims).unwrap();
    assert_eq!(journal.len(), 3);
}

#[test]
fn resume_after_completion_is_idempotent() {
    let orch = orchestrator();
    let claims = claims();

    let plan = orch.create_dry_run_plan(plan_request("plan-a", vec![row("row-01", RowAction::Update)]), &claims).unwrap();
    let job = orch.create_job(create_job_request(&plan), &claims, &plan).unwrap();
    let record = orch.execute_job(&job.job_id, execute_request(), &claims, &plan).unwrap();
    assert_eq!(record.status, ExecutionStatus::Completed);

    // the record is already terminal, so resume is a no-op that returns
    // the same completed record rather than erroring.
    let again = orch.resume_job(&job.job_id, resume_request(), &claims, &plan).unwrap();
    assert_eq!(again.status, ExecutionStatus::Completed);
    assert_eq!(again.resume_attempt_count, record.resume_attempt_count);
}
