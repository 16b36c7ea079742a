//! CLI command implementations.
//!
//! Every command boots an [`Orchestrator`] over a fresh in-memory store
//! (`serve` keeps one alive across a stream of requests; the rest boot,
//! run one operation, and exit). Request bodies that don't fit on a
//! command line come from stdin, one JSON value per line.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::config::RcsConfig;
use crate::execution::{ExecuteJobRequest, ResumeJobRequest};
use crate::job::CreateJobRequest;
use crate::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::plan::CreateDryRunPlanRequest;
use crate::source_registry::SourceRegistryEntry;

use super::args::{BootArgs, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, read_stdin_json, read_stdin_lines, write_cli_error, write_response};

/// Main CLI entry point. Parses arguments and dispatches to the appropriate
/// command. This is the only function main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args.
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { boot } => serve(&boot),
        Command::PlanCreate { boot } => plan_create(&boot),
        Command::PlanGet { plan_id, boot } => plan_get(&plan_id, &boot),
        Command::PlanList { boot } => plan_list(&boot),
        Command::JobCreate { boot } => job_create(&boot),
        Command::JobGet { job_id, boot } => job_get(&job_id, &boot),
        Command::JobList { boot } => job_list(&boot),
        Command::JobPause { job_id, reason_code, boot } => job_pause(&job_id, &reason_code, &boot),
        Command::JobEvents { job_id, boot } => job_events(&job_id, &boot),
        Command::JobCrossServiceEvents { job_id, boot } => job_cross_service_events(&job_id, &boot),
        Command::JobLockSnapshot { tenant_id, instance_id, boot } => job_lock_snapshot(&tenant_id, &instance_id, &boot),
        Command::Execute { job_id, boot } => execute(&job_id, &boot),
        Command::Resume { job_id, boot } => resume(&job_id, &boot),
        Command::ExecutionGet { job_id, boot } => execution_get(&job_id, &boot),
        Command::CheckpointGet { job_id, boot } => checkpoint_get(&job_id, &boot),
        Command::JournalGet { job_id, boot } => journal_get(&job_id, &boot),
        Command::EvidenceExport { job_id, boot } => evidence_export(&job_id, &boot),
        Command::EvidenceGet { job_id, boot } => evidence_get(&job_id, &boot),
        Command::EvidenceGetById { evidence_id, boot } => evidence_get_by_id(&evidence_id, &boot),
        Command::EvidenceList { boot } => evidence_list(&boot),
        Command::EvidenceValidate { job_id, boot } => evidence_validate(&job_id, &boot),
    }
}

fn load_config(path: &Path) -> CliResult<RcsConfig> {
    if !path.exists() {
        return Ok(RcsConfig::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| CliError::config_error(format!("failed to read {:?}: {}", path, e)))?;
    let mut config = RcsConfig::from_toml_str(&content)?;
    config.apply_env_overrides();
    Ok(config)
}

fn load_claims(path: &Path) -> CliResult<Claims> {
    read_json_file(path)
}

fn load_registry(path: &Option<PathBuf>) -> CliResult<Vec<SourceRegistryEntry>> {
    match path {
        Some(path) => read_json_file(path),
        None => Ok(Vec::new()),
    }
}

/// Boots a fresh in-memory `Orchestrator` plus the caller's claims from the
/// paths a `BootArgs` names.
fn boot(args: &BootArgs) -> CliResult<(Orchestrator, Claims)> {
    let config = load_config(&args.config)?;
    let claims = load_claims(&args.claims)?;
    let registry_entries = load_registry(&args.registry)?;

    let orchestrator = Orchestrator::new_in_memory(
        config,
        OrchestratorOptions {
            registry_entries,
            resolver: None,
            audit_log_path: args.audit_log.clone(),
            media_effector: None,
            index_reader: None,
        },
    );

    Ok((orchestrator, claims))
}

// -- Plan (C6) --------------------------------------------------------------

fn plan_create(boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let request: CreateDryRunPlanRequest = read_stdin_json()?;
    let plan = orchestrator.create_dry_run_plan(request, &claims)?;
    write_response(plan)
}

fn plan_get(plan_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let plan = orchestrator.get_plan(plan_id, &claims)?;
    write_response(plan)
}

fn plan_list(boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let plans = orchestrator.list_plans(&claims)?;
    write_response(plans)
}

// -- Job (C7) -----------------------------------------------------------------

fn job_create(boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let request: CreateJobRequest = read_stdin_json()?;
    let plan = orchestrator.get_plan(&request.plan_id, &claims)?;
    let job = orchestrator.create_job(request, &claims, &plan)?;
    write_response(job)
}

fn job_get(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let job = orchestrator.get_job(job_id, &claims)?;
    write_response(job)
}

fn job_list(boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let jobs = orchestrator.list_jobs(&claims)?;
    write_response(jobs)
}

fn job_pause(job_id: &str, reason_code: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let job = orchestrator.pause_job(job_id, &claims, reason_code)?;
    write_response(job)
}

fn job_events(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let events = orchestrator.list_job_events(job_id, &claims)?;
    write_response(events)
}

fn job_cross_service_events(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let events = orchestrator.list_cross_service_job_events(job_id, &claims)?;
    write_response(events)
}

fn job_lock_snapshot(tenant_id: &str, instance_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, _claims) = boot(boot_args)?;
    let snapshot = orchestrator.get_lock_snapshot(tenant_id, instance_id);
    write_response(snapshot)
}

// -- Execution (C8) -------------------------------------------------------------

fn execute(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let request: ExecuteJobRequest = read_stdin_json()?;
    let job = orchestrator.get_job(job_id, &claims)?;
    let plan = orchestrator.get_plan(&job.plan_id, &claims)?;
    let execution = orchestrator.execute_job(job_id, request, &claims, &plan)?;
    write_response(execution)
}

fn resume(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let request: ResumeJobRequest = read_stdin_json()?;
    let job = orchestrator.get_job(job_id, &claims)?;
    let plan = orchestrator.get_plan(&job.plan_id, &claims)?;
    let execution = orchestrator.resume_job(job_id, request, &claims, &plan)?;
    write_response(execution)
}

fn execution_get(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let execution = orchestrator.get_execution(job_id, &claims)?;
    write_response(execution)
}

fn checkpoint_get(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let checkpoint = orchestrator.get_checkpoint(job_id, &claims)?;
    write_response(checkpoint)
}

fn journal_get(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let journal = orchestrator.get_rollback_journal(job_id, &claims)?;
    write_response(journal)
}

// -- Evidence (C9) --------------------------------------------------------------

fn evidence_export(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let job = orchestrator.get_job(job_id, &claims)?;
    let plan = orchestrator.get_plan(&job.plan_id, &claims)?;
    let (record, reused) = orchestrator.export_evidence(job_id, &claims, &plan)?;
    write_response(json!({"record": record, "reused": reused}))
}

fn evidence_get(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let record = orchestrator.get_evidence(job_id, &claims)?;
    write_response(record)
}

fn evidence_get_by_id(evidence_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let record = orchestrator.get_evidence_by_id(evidence_id, &claims)?;
    write_response(record)
}

fn evidence_list(boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let records = orchestrator.list_evidence(&claims)?;
    write_response(records)
}

fn evidence_validate(job_id: &str, boot_args: &BootArgs) -> CliResult<()> {
    let (orchestrator, claims) = boot(boot_args)?;
    let record = orchestrator.get_evidence(job_id, &claims)?;
    let (verification, reason_code) = orchestrator.validate_evidence_record(&record);
    write_response(json!({"verification": verification, "reason_code": reason_code}))
}

// -- serve: stateful JSON-RPC loop over one boot -------------------------------

/// One line of the `serve` wire protocol: an operation name, the caller's
/// claims, and an operation-specific JSON body.
#[derive(Debug, Deserialize)]
struct RpcRequest {
    op: String,
    claims: Claims,
    #[serde(default)]
    body: Value,
}

fn serve(boot_args: &BootArgs) -> CliResult<()> {
    let config = load_config(&boot_args.config)?;
    let registry_entries = load_registry(&boot_args.registry)?;
    let orchestrator = Orchestrator::new_in_memory(
        config,
        OrchestratorOptions {
            registry_entries,
            resolver: None,
            audit_log_path: boot_args.audit_log.clone(),
            media_effector: None,
            index_reader: None,
        },
    );

    for line in read_stdin_lines() {
        let request = match line {
            Ok(l) => l,
            Err(e) => {
                write_cli_error(&e)?;
                continue;
            }
        };
        let outcome = dispatch_rpc(&orchestrator, request);
        match outcome {
            Ok(data) => write_response(data)?,
            Err(e) => write_cli_error(&e)?,
        }
    }

    Ok(())
}

fn dispatch_rpc(orchestrator: &Orchestrator, request: Value) -> CliResult<Value> {
    let request: RpcRequest = serde_json::from_value(request)?;
    let claims = request.claims;
    let body = request.body;

    match request.op.as_str() {
        "plan.create" => {
            let req: CreateDryRunPlanRequest = serde_json::from_value(body)?;
            let plan = orchestrator.create_dry_run_plan(req, &claims)?;
            Ok(serde_json::to_value(plan)?)
        }
        "plan.get" => {
            let plan_id = body_str(&body, "plan_id")?;
            Ok(serde_json::to_value(orchestrator.get_plan(&plan_id, &claims)?)?)
        }
        "plan.list" => Ok(serde_json::to_value(orchestrator.list_plans(&claims)?)?),
        "job.create" => {
            let req: CreateJobRequest = serde_json::from_value(body)?;
            let plan = orchestrator.get_plan(&req.plan_id, &claims)?;
            Ok(serde_json::to_value(orchestrator.create_job(req, &claims, &plan)?)?)
        }
        "job.get" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.get_job(&job_id, &claims)?)?)
        }
        "job.list" => Ok(serde_json::to_value(orchestrator.list_jobs(&claims)?)?),
        "job.pause" => {
            let job_id = body_str(&body, "job_id")?;
            let reason_code = body_str(&body, "reason_code")?;
            Ok(serde_json::to_value(orchestrator.pause_job(&job_id, &claims, &reason_code)?)?)
        }
        "job.events" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.list_job_events(&job_id, &claims)?)?)
        }
        "job.cross_service_events" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.list_cross_service_job_events(&job_id, &claims)?)?)
        }
        "job.lock_snapshot" => {
            let tenant_id = body_str(&body, "tenant_id")?;
            let instance_id = body_str(&body, "instance_id")?;
            Ok(serde_json::to_value(orchestrator.get_lock_snapshot(&tenant_id, &instance_id))?)
        }
        "execution.execute" => {
            let job_id = body_str(&body, "job_id")?;
            let req: ExecuteJobRequest = serde_json::from_value(
                body.get("request").cloned().ok_or_else(|| CliError::request_error("missing 'request'"))?,
            )?;
            let job = orchestrator.get_job(&job_id, &claims)?;
            let plan = orchestrator.get_plan(&job.plan_id, &claims)?;
            Ok(serde_json::to_value(orchestrator.execute_job(&job_id, req, &claims, &plan)?)?)
        }
        "execution.resume" => {
            let job_id = body_str(&body, "job_id")?;
            let req: ResumeJobRequest = serde_json::from_value(
                body.get("request").cloned().ok_or_else(|| CliError::request_error("missing 'request'"))?,
            )?;
            let job = orchestrator.get_job(&job_id, &claims)?;
            let plan = orchestrator.get_plan(&job.plan_id, &claims)?;
            Ok(serde_json::to_value(orchestrator.resume_job(&job_id, req, &claims, &plan)?)?)
        }
        "execution.get" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.get_execution(&job_id, &claims)?)?)
        }
        "execution.checkpoint" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.get_checkpoint(&job_id, &claims)?)?)
        }
        "execution.journal" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.get_rollback_journal(&job_id, &claims)?)?)
        }
        "evidence.export" => {
            let job_id = body_str(&body, "job_id")?;
            let job = orchestrator.get_job(&job_id, &claims)?;
            let plan = orchestrator.get_plan(&job.plan_id, &claims)?;
            let (record, reused) = orchestrator.export_evidence(&job_id, &claims, &plan)?;
            Ok(json!({"record": record, "reused": reused}))
        }
        "evidence.get" => {
            let job_id = body_str(&body, "job_id")?;
            Ok(serde_json::to_value(orchestrator.get_evidence(&job_id, &claims)?)?)
        }
        "evidence.get_by_id" => {
            let evidence_id = body_str(&body, "evidence_id")?;
            Ok(serde_json::to_value(orchestrator.get_evidence_by_id(&evidence_id, &claims)?)?)
        }
        "evidence.list" => Ok(serde_json::to_value(orchestrator.list_evidence(&claims)?)?),
        "evidence.validate" => {
            let job_id = body_str(&body, "job_id")?;
            let record = orchestrator.get_evidence(&job_id, &claims)?;
            let (verification, reason_code) = orchestrator.validate_evidence_record(&record);
            Ok(json!({"verification": verification, "reason_code": reason_code}))
        }
        other => Err(CliError::request_error(format!("unknown op '{other}'"))),
    }
}

fn body_str(body: &Value, field: &str) -> CliResult<String> {
    body.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| CliError::request_error(format!("missing or non-string field '{field}'")))
}
