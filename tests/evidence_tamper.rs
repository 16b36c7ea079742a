//! A completed job's evidence export self-verifies; mutating any of the
//! artifact hashes, the report hash, or the signature independently must
//! each be caught by `validate_evidence_record` with a distinct reason code.

mod common;

use common::{claims, create_job_request, execute_request, orchestrator, plan_request, row};
use rcs::evidence::SignatureVerification;
use rcs::plan::RowAction;

fn exported_record(job_id_suffix: &str) -> (rcs::orchestrator::Orchestrator, rcs::evidence::EvidenceRecord) {
    let orch = orchestrator();
    let claims = claims();
    let plan = orch
        .create_dry_run_plan(plan_request(&format!("plan-{job_id_suffix}"), vec![row("row-01", RowAction::Update)]), &claims)
        .unwrap();
    let job = orch.create_job(create_job_request(&plan), &claims, &plan).unwrap();
    orch.execute_job(&job.job_id, execute_request(), &claims, &plan).unwrap();
    let (record, reused) = orch.export_evidence(&job.job_id, &claims, &plan).unwrap();
    assert!(!reused);
    (orch, record)
}

#[test]
fn freshly_exported_evidence_validates_clean() {
    let (orch, record) = exported_record("a");
    let (verification, reason_code) = orch.validate_evidence_record(&record);
    assert_eq!(verification, SignatureVerification::Verified);
    assert_eq!(reason_code, "none");
}

#[test]
fn second_export_reuses_the_same_record() {
    let orch = orchestrator();
    let claims = claims();
    let plan = orch.create_dry_run_plan(plan_request("plan-a", vec![row("row-01", RowAction::Update)]), &claims).unwrap();
    let job = orch.create_job(create_job_request(&plan), &claims, &plan).unwrap();
    orch.execute_job(&job.job_id, execute_request(), &claims, &plan).unwrap();

    let (first, reused_first) = orch.export_evidence(&job.job_id, &claims, &plan).unwrap();
    let (second, reused_second) = orch.export_evidence(&job.job_id, &claims, &plan).unwrap();
    assert!(!reused_first);
    assert!(reused_second);
    assert_eq!(first.evidence_id, second.evidence_id);
}

#[test]
fn tampering_an_artifact_is_caught_by_hash_mismatch() {
    let (orch, mut record) = exported_record("b");
    record.artifacts[0].canonical_json.push_str("tampered");

    let (verification, reason_code) = orch.validate_evidence_record(&record);
    assert_eq!(verification, SignatureVerification::VerificationFailed);
    assert_eq!(reason_code, "failed_evidence_artifact_hash_mismatch");
}

#[test]
fn tampering_the_report_hash_is_caught_once_artifacts_still_match() {
    let (orch, mut record) = exported_record("c");
    // flip the artifact hash to match a tampered report_hash consistently
    // would require recomputation; instead tamper report_hash directly,
    // which the artifact-hash check does not see since that check only
    // recomputes from `artifacts`, not `report_hash`.
    record.report_hash = "0".repeat(64);

    let (verification, reason_code) = orch.validate_evidence_record(&record);
    assert_eq!(verification, SignatureVerification::VerificationFailed);
    assert_eq!(reason_code, "failed_evidence_report_hash_mismatch");
}

#[test]
fn tampering_the_signature_is_caught_once_hashes_still_match() {
    let (orch, mut record) = exported_record("d");
    record.manifest_signature.signature = "0".repeat(88);

    let (verification, reason_code) = orch.validate_evidence_record(&record);
    assert_eq!(verification, SignatureVerification::VerificationFailed);
    assert_eq!(reason_code, "failed_evidence_signature_verification");
}

#[test]
fn evidence_get_by_job_id_and_by_evidence_id_agree() {
    let (orch, record) = exported_record("e");
    let claims = claims();

    let by_job = orch.get_evidence(&record.job_id, &claims).unwrap();
    let by_id = orch.get_evidence_by_id(&record.evidence_id, &claims).unwrap();
    assert_eq!(by_job.evidence_id, record.evidence_id);
    assert_eq!(by_id.evidence_id, record.evidence_id);

    let all = orch.list_evidence(&claims).unwrap();
    assert!(all.iter().any(|e| e.evidence_id == record.evidence_id));
}
