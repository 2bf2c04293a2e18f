//! Ticket triage pipeline.
//!
//! Every ticket flows through:
//! 1. `classify` — keyword category, assigned once
//! 2. `Retriever` — ranked context from the knowledge corpus
//! 3. `Drafter` — draft reply (deterministic template or pluggable backend)
//! 4. `Reviewer` — policy check, first matching rule wins
//! 5. `Refiner` ⇄ `Reviewer` — bounded retry loop with reviewer feedback
//! 6. Escalation — direct (reviewer) or retry-exhaustion (escalator + log)
//!
//! The `TriagePipeline` orchestrator owns the transition table; stages never
//! propagate errors, they record a `StageFault` that terminates the run.

pub mod classify;
pub mod draft;
pub mod orchestrator;
pub mod refine;
pub mod retrieve;
pub mod review;
pub mod state;

pub use orchestrator::{PipelineStage, TriagePipeline};
pub use state::{Category, ReviewDecision, StageFault, TicketState};
