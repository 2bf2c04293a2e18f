//! Draft generation seam.
//!
//! The pipeline only depends on the `Drafter` contract: pure (no hidden
//! state between invocations), total (always returns a reply, even with no
//! context), and invoked fresh on every retrieval pass including
//! refinements. The shipped implementation is a deterministic template;
//! an LLM-backed drafter plugs in behind the same trait.

use async_trait::async_trait;

use crate::error::DraftError;

/// Produces a draft reply from the ticket text and retrieved context.
#[async_trait]
pub trait Drafter: Send + Sync {
    async fn draft(&self, ticket_text: &str, context: &[String]) -> Result<String, DraftError>;
}

/// Deterministic template drafter.
///
/// Echoes the ticket text (the reply must quote what the customer asked)
/// and leads with the most relevant context snippet when one is available.
pub struct TemplateDrafter;

impl TemplateDrafter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TemplateDrafter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Drafter for TemplateDrafter {
    async fn draft(&self, ticket_text: &str, context: &[String]) -> Result<String, DraftError> {
        let mut reply = String::with_capacity(256);
        reply.push_str("Hello, thanks for reaching out to support.\n\n");
        reply.push_str(&format!("Regarding your message: \"{}\"\n\n", ticket_text));
        if let Some(snippet) = context.first() {
            reply.push_str(&format!("From our documentation: {}\n\n", snippet));
        }
        reply.push_str(
            "We hope this helps. If anything is still unclear, just reply to this \
             message and we will take another look.",
        );
        Ok(reply)
    }
}
