//! Ticket state threaded through the triage pipeline.
//!
//! One `TicketState` is created per incoming ticket and exclusively owned by
//! a single pipeline run — never shared across concurrent runs. Stages merge
//! their results field by field: `context` and `draft_reply` are replaced on
//! each pass, `all_drafts`/`all_feedback` only ever grow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Support ticket category. Closed set — the classifier always lands on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Billing,
    Technical,
    Security,
    General,
}

impl Category {
    /// All categories, in classifier priority order.
    pub const ALL: [Category; 4] = [
        Category::Billing,
        Category::Technical,
        Category::Security,
        Category::General,
    ];

    /// Wire/display name (matches the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing => "Billing",
            Self::Technical => "Technical",
            Self::Security => "Security",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Billing" => Ok(Self::Billing),
            "Technical" => Ok(Self::Technical),
            "Security" => Ok(Self::Security),
            "General" => Ok(Self::General),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Verdict of a reviewer pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// A captured stage fault.
///
/// Stages never propagate errors across their boundary; any internal failure
/// is recorded here and the orchestrator terminates the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFault {
    /// Stage that failed ("classify", "retrieve", "draft", ...).
    pub node: String,
    /// Human-readable failure description, surfaced verbatim to the caller.
    pub message: String,
}

impl StageFault {
    pub fn new(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StageFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.node, self.message)
    }
}

/// Mutable record for one ticket run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketState {
    /// Caller-supplied ticket ID.
    pub ticket_id: String,
    /// Ticket subject line.
    pub subject: String,
    /// Ticket body — the text the drafter replies to.
    pub description: String,

    /// Set exactly once by the classifier, never recomputed.
    pub category: Option<Category>,
    /// Retrieved context snippets, replaced wholesale on each retrieval pass.
    pub context: Vec<String>,
    /// Current draft reply, replaced on each drafter pass.
    pub draft_reply: Option<String>,

    /// Append-only audit trail of every draft produced across retries.
    pub all_drafts: Vec<String>,
    /// Append-only audit trail of every rejection feedback.
    pub all_feedback: Vec<String>,

    /// Verdict of the most recent reviewer pass.
    pub review_decision: Option<ReviewDecision>,
    /// Feedback from the most recent rejection.
    pub review_feedback: Option<String>,
    /// Terminal reply — non-null iff the run ended approved or escalated.
    pub final_reply: Option<String>,
    /// Refinement count. Bumped only by the refiner, by exactly 1 per pass.
    pub retries: u32,
    /// Monotone — once true, never cleared.
    pub escalated: bool,
    /// Populated fault forces immediate termination.
    pub error: Option<StageFault>,
    /// Set by the refiner when the retry budget is consumed; tells the
    /// orchestrator to finish without another reviewer pass.
    pub done: bool,

    /// When this run was created.
    pub created_at: DateTime<Utc>,
}

impl TicketState {
    /// Create a fresh state with only the input fields populated.
    pub fn new(
        ticket_id: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            subject: subject.into(),
            description: description.into(),
            category: None,
            context: Vec::new(),
            draft_reply: None,
            all_drafts: Vec::new(),
            all_feedback: Vec::new(),
            review_decision: None,
            review_feedback: None,
            final_reply: None,
            retries: 0,
            escalated: false,
            error: None,
            done: false,
            created_at: Utc::now(),
        }
    }

    /// Subject and description joined — the text classification and policy
    /// review evaluate against.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.description)
    }

    /// Record a stage fault. The orchestrator treats this as an unconditional
    /// signal to terminate the run.
    pub fn record_fault(&mut self, node: &str, message: impl Into<String>) {
        self.error = Some(StageFault::new(node, message));
    }

    /// Whether the run reached a policy terminal (approved or escalated).
    pub fn is_resolved(&self) -> bool {
        matches!(self.review_decision, Some(ReviewDecision::Approved)) || self.escalated
    }
}
