//! Retry controller.
//!
//! Runs only after a rejection that is still inside the retry budget. Bumps
//! the counter, and either escalates (budget consumed) or folds the
//! reviewer's feedback into a fresh retrieval + draft pass. No quality check
//! happens on the refined draft here; the reviewer sees it next.

use tracing::debug;

use crate::error::DraftError;
use crate::pipeline::draft::Drafter;
use crate::pipeline::retrieve::Retriever;
use crate::pipeline::state::{Category, TicketState};

/// Interim reply recorded when the retry budget runs out. The escalator
/// overwrites it with the terminal text once the record is persisted.
pub const EXHAUSTED_REPLY: &str = "This ticket has been escalated to a human agent.";

/// What a refinement pass decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOutcome {
    /// Context and draft were refreshed; back to review.
    Refined,
    /// Retry budget consumed; no re-retrieval, no re-draft. Escalate.
    Exhausted,
}

/// Bumps the retry counter and re-runs retrieval + drafting with feedback.
pub struct Refiner {
    max_retries: u32,
}

impl Refiner {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Run one refinement pass.
    ///
    /// Increments `retries` by exactly 1. On exhaustion sets `escalated`,
    /// `done`, and the interim reply without touching context or draft.
    /// Otherwise replaces `context`/`draft_reply` and appends the new draft
    /// to the audit trail. Never clears a prior `escalated`.
    pub async fn refine(
        &self,
        state: &mut TicketState,
        retriever: &Retriever,
        drafter: &dyn Drafter,
    ) -> Result<RefineOutcome, DraftError> {
        state.retries += 1;

        if state.retries >= self.max_retries {
            state.escalated = true;
            state.done = true;
            state.final_reply = Some(EXHAUSTED_REPLY.to_string());
            debug!(
                ticket_id = %state.ticket_id,
                retries = state.retries,
                "Retry budget consumed"
            );
            return Ok(RefineOutcome::Exhausted);
        }

        let category = state.category.unwrap_or(Category::General);
        let query = state.combined_text();
        let context = retriever.retrieve(category, &query, state.review_feedback.as_deref());
        let draft = drafter.draft(&state.description, &context).await?;

        debug!(
            ticket_id = %state.ticket_id,
            retries = state.retries,
            context_len = context.len(),
            "Refined draft with reviewer feedback"
        );

        state.context = context;
        state.all_drafts.push(draft.clone());
        state.draft_reply = Some(draft);
        Ok(RefineOutcome::Refined)
    }
}
