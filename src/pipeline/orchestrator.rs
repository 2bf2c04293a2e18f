//! Pipeline state machine.
//!
//! Drives a `TicketState` through classify → retrieve → draft → review, with
//! a bounded review ⇄ refine loop and two distinct escalation terminals:
//! direct escalation (finalized by the reviewer, no escalation record) and
//! retry-exhaustion escalation (finalized by the escalator, which persists
//! the record). A populated `error` field terminates the run from any stage.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TriageConfig;
use crate::pipeline::classify::classify;
use crate::pipeline::draft::Drafter;
use crate::pipeline::refine::{RefineOutcome, Refiner};
use crate::pipeline::retrieve::Retriever;
use crate::pipeline::review::{ESCALATED_REPLY, ReviewOutcome, Reviewer};
use crate::pipeline::state::{Category, ReviewDecision, TicketState};
use crate::store::corpus::KnowledgeStore;
use crate::store::escalations::{EscalationRecord, EscalationSink};

/// Reply recorded when persisting the escalation record fails.
const ESCALATION_FAULT_REPLY: &str = "Error occurred during escalation";

/// Stages of the triage pipeline. `Done` is the only terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Classify,
    Retrieve,
    Draft,
    Review,
    Refine,
    Escalate,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Classify => "classify",
            Self::Retrieve => "retrieve",
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Refine => "refine",
            Self::Escalate => "escalate",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// The triage pipeline — sequences the stages over one owned `TicketState`.
///
/// One instance serves many runs; runs never share state, so concurrent
/// tickets just need their own `run` calls. The escalation sink is the only
/// shared resource and guards its own appends.
pub struct TriagePipeline {
    config: TriageConfig,
    retriever: Retriever,
    reviewer: Reviewer,
    refiner: Refiner,
    drafter: Arc<dyn Drafter>,
    escalations: Arc<dyn EscalationSink>,
}

impl TriagePipeline {
    pub fn new(
        config: TriageConfig,
        store: Arc<KnowledgeStore>,
        drafter: Arc<dyn Drafter>,
        escalations: Arc<dyn EscalationSink>,
    ) -> Self {
        let refiner = Refiner::new(config.max_retries);
        Self {
            config,
            retriever: Retriever::new(store),
            reviewer: Reviewer::new(),
            refiner,
            drafter,
            escalations,
        }
    }

    /// Drive one ticket to its terminal state.
    pub async fn run(&self, mut state: TicketState) -> TicketState {
        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            ticket_id = %state.ticket_id,
            subject = %state.subject,
            "Starting triage run"
        );

        let mut stage = PipelineStage::Classify;
        let mut steps = 0u32;
        while stage != PipelineStage::Done {
            steps += 1;
            if steps > self.config.step_limit {
                warn!(
                    run_id = %run_id,
                    stage = %stage,
                    limit = self.config.step_limit,
                    "Step ceiling exceeded, terminating run"
                );
                state.record_fault(
                    "orchestrator",
                    format!(
                        "step ceiling of {} exceeded at stage {}",
                        self.config.step_limit, stage
                    ),
                );
                break;
            }

            let next = self.step(stage, &mut state).await;
            debug!(run_id = %run_id, from = %stage, to = %next, "Stage transition");
            stage = next;
        }

        info!(
            run_id = %run_id,
            ticket_id = %state.ticket_id,
            category = state.category.map(|c| c.as_str()).unwrap_or("Unknown"),
            retries = state.retries,
            escalated = state.escalated,
            faulted = state.error.is_some(),
            "Triage run finished"
        );
        state
    }

    /// Execute one stage and return the next, per the transition table.
    async fn step(&self, stage: PipelineStage, state: &mut TicketState) -> PipelineStage {
        match stage {
            PipelineStage::Classify => {
                // Assigned exactly once; the refiner never re-classifies.
                state.category = Some(classify(&state.subject, &state.description));
                PipelineStage::Retrieve
            }

            PipelineStage::Retrieve => {
                let category = state.category.unwrap_or(Category::General);
                let query = state.combined_text();
                state.context = self.retriever.retrieve(category, &query, None);
                PipelineStage::Draft
            }

            PipelineStage::Draft => {
                match self.drafter.draft(&state.description, &state.context).await {
                    Ok(draft) => {
                        state.all_drafts.push(draft.clone());
                        state.draft_reply = Some(draft);
                        PipelineStage::Review
                    }
                    Err(e) => {
                        state.record_fault("draft", e.to_string());
                        PipelineStage::Done
                    }
                }
            }

            PipelineStage::Review => {
                let draft = state.draft_reply.clone().unwrap_or_default();
                let category = state.category.unwrap_or(Category::General);
                let outcome = self.reviewer.review(
                    &draft,
                    &state.subject,
                    &state.description,
                    category,
                    state.retries,
                );

                match outcome {
                    ReviewOutcome::Approved { final_reply, feedback } => {
                        state.review_decision = Some(ReviewDecision::Approved);
                        if let Some(note) = feedback {
                            state.review_feedback = Some(note);
                        }
                        state.final_reply = Some(final_reply);
                        PipelineStage::Done
                    }
                    ReviewOutcome::Rejected { feedback } => {
                        state.review_decision = Some(ReviewDecision::Rejected);
                        state.review_feedback = Some(feedback.clone());
                        state.all_feedback.push(feedback);
                        state.final_reply = None;
                        if state.retries < self.config.max_retries {
                            PipelineStage::Refine
                        } else {
                            PipelineStage::Escalate
                        }
                    }
                    ReviewOutcome::EscalateNow { feedback, final_reply } => {
                        // Direct escalation: finalized here, retry loop
                        // bypassed, no escalation record.
                        state.review_decision = Some(ReviewDecision::Rejected);
                        state.review_feedback = Some(feedback.clone());
                        state.all_feedback.push(feedback);
                        state.escalated = true;
                        state.final_reply = Some(final_reply);
                        PipelineStage::Done
                    }
                    ReviewOutcome::EscalateExhausted { feedback } => {
                        state.review_decision = Some(ReviewDecision::Rejected);
                        state.review_feedback = Some(feedback.clone());
                        state.all_feedback.push(feedback);
                        state.escalated = true;
                        PipelineStage::Escalate
                    }
                }
            }

            PipelineStage::Refine => {
                match self
                    .refiner
                    .refine(state, &self.retriever, self.drafter.as_ref())
                    .await
                {
                    Ok(RefineOutcome::Refined) => PipelineStage::Review,
                    Ok(RefineOutcome::Exhausted) => PipelineStage::Escalate,
                    Err(e) => {
                        state.record_fault("refine", e.to_string());
                        PipelineStage::Done
                    }
                }
            }

            PipelineStage::Escalate => {
                let record = EscalationRecord::from_state(state);
                match self.escalations.append(&record).await {
                    Ok(()) => {
                        info!(
                            ticket_id = %state.ticket_id,
                            retries = state.retries,
                            "Escalation recorded"
                        );
                        state.final_reply = Some(ESCALATED_REPLY.to_string());
                        state.escalated = true;
                    }
                    Err(e) => {
                        // Faults here still leave the ticket escalated; the
                        // record is the only thing lost.
                        state.record_fault("escalate", e.to_string());
                        state.final_reply = Some(ESCALATION_FAULT_REPLY.to_string());
                        state.escalated = true;
                    }
                }
                PipelineStage::Done
            }

            PipelineStage::Done => PipelineStage::Done,
        }
    }
}
