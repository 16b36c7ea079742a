//! CLI argument definitions using clap
//!
//! Two shapes of command:
//! - one-shot: boot a fresh in-memory service graph, execute a single
//!   operation (reading its request body from stdin where one applies),
//!   print the result, exit.
//! - `serve`: boot once and process a stream of newline-delimited JSON
//!   RPC requests from stdin, so a single process can carry state across
//!   a plan → job → execute → evidence workflow.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rcs - Restore Control Service CLI
#[derive(Parser, Debug)]
#[command(name = "rcs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Config/claims/registry inputs shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct BootArgs {
    /// Path to the RcsConfig TOML file.
    #[arg(long, default_value = "./rcs.toml")]
    pub config: PathBuf,

    /// Path to the verified Claims JSON the external authenticator produced.
    #[arg(long, default_value = "./claims.json")]
    pub claims: PathBuf,

    /// Path to a JSON array of `SourceRegistryEntry` seeding the local registry.
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Durable audit log path; falls back to an in-memory log when unset.
    #[arg(long)]
    pub audit_log: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Boot the service and process newline-delimited JSON RPC requests from stdin.
    Serve {
        #[command(flatten)]
        boot: BootArgs,
    },

    /// Create a dry-run restore plan from a `CreateDryRunPlanRequest` read from stdin.
    PlanCreate {
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch a plan by id.
    PlanGet {
        plan_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// List plans visible to the caller.
    PlanList {
        #[command(flatten)]
        boot: BootArgs,
    },

    /// Create a job from a `CreateJobRequest` read from stdin; the referenced
    /// plan is fetched automatically.
    JobCreate {
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch a job by id.
    JobGet {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// List jobs visible to the caller.
    JobList {
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Pause a running job.
    JobPause {
        job_id: String,
        #[arg(long)]
        reason_code: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// List a job's own event log.
    JobEvents {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// List the cross-service events a job has emitted.
    JobCrossServiceEvents {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Inspect the scope lock manager's running/queued state for a tenant+instance.
    JobLockSnapshot {
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        instance_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },

    /// Execute a job from an `ExecuteJobRequest` read from stdin; the job's
    /// plan is fetched automatically.
    Execute {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Resume a paused job from a `ResumeJobRequest` read from stdin.
    Resume {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch a job's execution record.
    ExecutionGet {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch a job's latest checkpoint.
    CheckpointGet {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch a job's rollback journal.
    JournalGet {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },

    /// Export (or re-fetch, idempotently) the signed evidence manifest for a job.
    EvidenceExport {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch the evidence manifest for a job.
    EvidenceGet {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Fetch an evidence manifest by its own id.
    EvidenceGetById {
        evidence_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
    /// List evidence manifests visible to the caller.
    EvidenceList {
        #[command(flatten)]
        boot: BootArgs,
    },
    /// Recompute and verify a job's evidence manifest hashes and signature.
    EvidenceValidate {
        job_id: String,
        #[command(flatten)]
        boot: BootArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
