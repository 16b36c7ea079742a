//! Cross-service audit event projection.
//!
//! - Every job lifecycle transition MUST be logged.
//! - Audit log is append-only and durable.
//! - Crash-safe: writes are synced before acknowledgement.
//! - No background purging or retention policies (those are external concerns).

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use uuid::Uuid;

/// Which lifecycle stage a job event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Plan,
    Execute,
    Evidence,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Plan => "plan",
            Lifecycle::Execute => "execute",
            Lifecycle::Evidence => "evidence",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit action — the event that occurred, matching `JobEvent.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    PlanCreated,
    PlanRejected,
    JobCreated,
    QueuedForLock,
    Promoted,
    ExecutionStarted,
    ChunkApplied,
    Paused,
    Resumed,
    Completed,
    Failed,
    EvidenceExported,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::PlanCreated => "plan_created",
            AuditAction::PlanRejected => "plan_rejected",
            AuditAction::JobCreated => "job_created",
            AuditAction::QueuedForLock => "queued_for_lock",
            AuditAction::Promoted => "promoted",
            AuditAction::ExecutionStarted => "execution_started",
            AuditAction::ChunkApplied => "chunk_applied",
            AuditAction::Paused => "paused",
            AuditAction::Resumed => "resumed",
            AuditAction::Completed => "completed",
            AuditAction::Failed => "failed",
            AuditAction::EvidenceExported => "evidence_exported",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit record outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Rejected,
    Failed,
    Pending,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Rejected => "rejected",
            AuditOutcome::Failed => "failed",
            AuditOutcome::Pending => "pending",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cross-service audit record, shaped per the projection contract:
/// `{contract_version, schema_version, service, tenant_id, instance_id,
/// source, plan_id, job_id, lifecycle, action, outcome, reason_code, at}`.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: SystemTime,
    pub tenant_id: Option<String>,
    pub instance_id: Option<String>,
    pub source: Option<String>,
    pub plan_id: Option<String>,
    pub job_id: Option<String>,
    pub lifecycle: Lifecycle,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    pub reason_code: Option<String>,
    pub error_message: Option<String>,
}

const CONTRACT_VERSION: &str = "audit.contracts.v1";
const SCHEMA_VERSION: &str = "audit.event.v1";
const SERVICE_NAME: &str = "rrs";

impl AuditRecord {
    pub fn new(lifecycle: Lifecycle, action: AuditAction, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            tenant_id: None,
            instance_id: None,
            source: None,
            plan_id: None,
            job_id: None,
            lifecycle,
            action,
            outcome,
            reason_code: None,
            error_message: None,
        }
    }

    pub fn with_scope(mut self, tenant_id: impl Into<String>, instance_id: impl Into<String>, source: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self.instance_id = Some(instance_id.into());
        self.source = Some(source.into());
        self
    }

    pub fn with_plan_id(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_reason_code(mut self, reason_code: impl Into<String>) -> Self {
        self.reason_code = Some(reason_code.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Serialize to a JSON line (for append-only logging).
    pub fn to_json(&self) -> String {
        let at = self
            .timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let mut json = format!(
            r#"{{"id":"{}","contract_version":"{}","schema_version":"{}","service":"{}","lifecycle":"{}","action":"{}","outcome":"{}","at":{}"#,
            self.id, CONTRACT_VERSION, SCHEMA_VERSION, SERVICE_NAME, self.lifecycle, self.action, self.outcome, at
        );

        if let Some(ref v) = self.tenant_id {
            json.push_str(&format!(r#","tenant_id":"{}""#, escape_json(v)));
        }
        if let Some(ref v) = self.instance_id {
            json.push_str(&format!(r#","instance_id":"{}""#, escape_json(v)));
        }
        if let Some(ref v) = self.source {
            json.push_str(&format!(r#","source":"{}""#, escape_json(v)));
        }
        if let Some(ref v) = self.plan_id {
            json.push_str(&format!(r#","plan_id":"{}""#, escape_json(v)));
        }
        if let Some(ref v) = self.job_id {
            json.push_str(&format!(r#","job_id":"{}""#, escape_json(v)));
        }
        if let Some(ref v) = self.reason_code {
            json.push_str(&format!(r#","reason_code":"{}""#, escape_json(v)));
        }
        if let Some(ref v) = self.error_message {
            json.push_str(&format!(r#","error":"{}""#, escape_json(v)));
        }

        json.push('}');
        json
    }
}

fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Audit log trait. Append MUST be synchronous and durable; the record MUST
/// be visible to readers after the call returns.
pub trait AuditLog: Send + Sync {
    fn append(&self, record: &AuditRecord) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

/// File-based audit log: append-only, one JSON record per line, fsynced
/// after every write.
pub struct FileAuditLog {
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl FileAuditLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, record: &AuditRecord) -> io::Result<()> {
        let json = record.to_json();
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    fn sync(&self) -> io::Result<()> {
        let writer = self.writer.lock().unwrap();
        writer.get_ref().sync_all()
    }
}

/// In-memory audit log for testing.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> io::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_audit_record_creation() {
        let record = AuditRecord::new(Lifecycle::Plan, AuditAction::PlanCreated, AuditOutcome::Success)
            .with_scope("t1", "i1", "orders_db")
            .with_plan_id("plan-1");

        assert_eq!(record.action, AuditAction::PlanCreated);
        assert_eq!(record.outcome, AuditOutcome::Success);
        assert_eq!(record.plan_id, Some("plan-1".to_string()));
    }

    #[test]
    fn test_audit_record_json() {
        let record = AuditRecord::new(Lifecycle::Execute, AuditAction::ChunkApplied, AuditOutcome::Success)
            .with_job_id("job-1")
            .with_reason_code("none");

        let json = record.to_json();
        assert!(json.contains("chunk_applied"));
        assert!(json.contains("success"));
        assert!(json.contains("job-1"));
        assert!(json.contains("audit.contracts.v1"));
        assert!(json.contains("\"service\":\"rrs\""));
    }

    #[test]
    fn test_memory_audit_log() {
        let log = MemoryAuditLog::new();

        let record1 = AuditRecord::new(Lifecycle::Plan, AuditAction::PlanCreated, AuditOutcome::Success);
        let record2 = AuditRecord::new(Lifecycle::Execute, AuditAction::Completed, AuditOutcome::Success);

        log.append(&record1).unwrap();
        log.append(&record2).unwrap();

        assert_eq!(log.len(), 2);
        let records = log.records();
        assert_eq!(records[0].action, AuditAction::PlanCreated);
        assert_eq!(records[1].action, AuditAction::Completed);
    }

    #[test]
    fn test_file_audit_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");

        let log = FileAuditLog::open(&path).unwrap();

        let record = AuditRecord::new(Lifecycle::Evidence, AuditAction::EvidenceExported, AuditOutcome::Success)
            .with_job_id("job-1");

        log.append(&record).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("evidence_exported"));
        assert!(contents.contains("job-1"));
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("line\nbreak"), "line\\nbreak");
    }
}
