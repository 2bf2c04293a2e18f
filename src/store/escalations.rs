//! Escalation log — append-only record of tickets handed to humans.
//!
//! One row per escalated ticket. The sink is the only resource shared
//! between concurrent pipeline runs: appends are serialized behind a mutex
//! and each record is written as one complete row, so interleaved
//! escalations never tear. Interleaving order across runs is unspecified.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::pipeline::state::TicketState;

/// Column headers, written once when the log file is created.
const HEADER: &[&str] = &[
    "subject",
    "description",
    "category",
    "context",
    "all_drafts",
    "all_feedback",
    "retries",
    "timestamp",
];

/// One escalated ticket, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationRecord {
    pub subject: String,
    pub description: String,
    pub category: String,
    /// Context snippets joined with "; ".
    pub context: String,
    pub all_drafts: Vec<String>,
    pub all_feedback: Vec<String>,
    pub retries: u32,
    pub timestamp: DateTime<Utc>,
}

impl EscalationRecord {
    /// Build a record from the terminal ticket state.
    ///
    /// If the audit trails are empty the current draft/feedback stand in,
    /// so the record always carries whatever the pipeline last produced.
    pub fn from_state(state: &TicketState) -> Self {
        let mut all_drafts = state.all_drafts.clone();
        if all_drafts.is_empty() {
            if let Some(draft) = &state.draft_reply {
                all_drafts.push(draft.clone());
            }
        }
        let mut all_feedback = state.all_feedback.clone();
        if all_feedback.is_empty() {
            if let Some(feedback) = &state.review_feedback {
                all_feedback.push(feedback.clone());
            }
        }

        Self {
            subject: state.subject.clone(),
            description: state.description.clone(),
            category: state
                .category
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            context: state.context.join("; "),
            all_drafts,
            all_feedback,
            retries: state.retries,
            timestamp: Utc::now(),
        }
    }

    /// Render as one CSV row (with trailing newline). The audit lists are
    /// JSON-encoded, matching how reviewers consume the log.
    fn to_csv_row(&self) -> Result<String, StoreError> {
        let drafts_json = serde_json::to_string(&self.all_drafts)?;
        let feedback_json = serde_json::to_string(&self.all_feedback)?;
        let fields = [
            self.subject.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.context.as_str(),
            drafts_json.as_str(),
            feedback_json.as_str(),
            &self.retries.to_string(),
            &self.timestamp.to_rfc3339(),
        ];
        let mut row = fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(",");
        row.push('\n');
        Ok(row)
    }
}

/// Durable sink for escalation records.
///
/// Must support safe concurrent append: at least once per escalation, each
/// record atomic and complete.
#[async_trait]
pub trait EscalationSink: Send + Sync {
    async fn append(&self, record: &EscalationRecord) -> Result<(), StoreError>;
}

/// Append-only CSV file sink.
pub struct CsvEscalationLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvEscalationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl EscalationSink for CsvEscalationLog {
    async fn append(&self, record: &EscalationRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let write_header = !tokio::fs::try_exists(&self.path).await?;
        let mut payload = String::new();
        if write_header {
            payload.push_str(&HEADER.join(","));
            payload.push('\n');
        }
        payload.push_str(&record.to_csv_row()?);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), "Appended escalation record");
        Ok(())
    }
}

/// In-memory sink for tests and demos.
#[derive(Default)]
pub struct MemoryEscalationLog {
    records: Mutex<Vec<EscalationRecord>>,
}

impl MemoryEscalationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<EscalationRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl EscalationSink for MemoryEscalationLog {
    async fn append(&self, record: &EscalationRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

/// RFC 4180-style escaping: quote fields containing separators or quotes,
/// doubling embedded quotes. Drafts and feedback routinely contain commas.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
