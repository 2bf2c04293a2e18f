//! Storage collaborators: the read-only knowledge corpus and the
//! append-only escalation log.

pub mod corpus;
pub mod escalations;

pub use corpus::KnowledgeStore;
pub use escalations::{CsvEscalationLog, EscalationRecord, EscalationSink, MemoryEscalationLog};
