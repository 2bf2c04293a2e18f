//! Policy review engine.
//!
//! Ordered rules, first match wins:
//! 1. Sensitive-content guard — non-negotiable floor, checked before any
//!    category logic.
//! 2. Technical fast-path — approve.
//! 3. Billing / refund ladder — reject, approve on the first retry, or
//!    escalate (directly on extreme demands, second-order after the
//!    allotted attempts).
//! 4. Default — approve.
//!
//! The reviewer never touches the retry counter; that is the refiner's job.

use regex::Regex;

use crate::pipeline::classify::{TECHNICAL_TERMS, contains_any};
use crate::pipeline::state::Category;

/// Feedback attached to a sensitive-content rejection.
pub const SENSITIVE_FEEDBACK: &str = "Remove any sensitive information from the reply.";

/// Feedback attached to a direct escalation.
pub const DIRECT_ESCALATION_FEEDBACK: &str =
    "Do not promise refunds; escalate this ticket to human support.";

/// Feedback attached to a first-pass refund rejection.
pub const REFUND_FEEDBACK: &str =
    "Do not promise refunds. Offer to check billing policy and next steps.";

/// Feedback attached to a second-order escalation.
pub const EXHAUSTED_REFUND_FEEDBACK: &str =
    "After multiple attempts, this refund request requires human attention.";

/// Terminal reply text for an escalated ticket.
pub const ESCALATED_REPLY: &str = "Escalated to human agent";

/// Outcome of one reviewer pass.
///
/// A tagged enum rather than loose decision/feedback fields so the
/// orchestrator's routing is an explicit match with visible precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Draft passes policy; `final_reply` is the draft verbatim.
    Approved {
        final_reply: String,
        /// Reviewer note recorded on the state but not appended to the
        /// audit trail (only rejections are).
        feedback: Option<String>,
    },
    /// Draft rejected; eligible for refinement.
    Rejected { feedback: String },
    /// Direct escalation: policy finalizes the run on this pass, bypassing
    /// the retry loop entirely.
    EscalateNow {
        feedback: String,
        final_reply: String,
    },
    /// Second-order escalation: the refund is still unresolved after the
    /// allotted attempts. The escalator finalizes the reply.
    EscalateExhausted { feedback: String },
}

/// Policy reviewer with compiled disallowed-content patterns.
pub struct Reviewer {
    sensitive_patterns: Vec<Regex>,
    refund: Regex,
    extreme_demand: Regex,
}

impl Reviewer {
    /// Create a reviewer with the default policy patterns: password, SSN,
    /// and payment-card markers are disallowed in drafts; a currency symbol
    /// or explicit demand language in the ticket marks an extreme monetary
    /// demand.
    pub fn new() -> Self {
        let sensitive_patterns = vec![
            Regex::new(r"(?i)password").unwrap(),
            Regex::new(r"(?i)ssn").unwrap(),
            Regex::new(r"(?i)credit card").unwrap(),
        ];
        Self {
            sensitive_patterns,
            refund: Regex::new(r"(?i)refund").unwrap(),
            extreme_demand: Regex::new(r"(?i)\$|demand").unwrap(),
        }
    }

    /// Evaluate a draft against policy.
    ///
    /// `retries` is read, never written: 0 rejects a refund draft, 1
    /// approves it (one refinement happened), 2+ escalates.
    pub fn review(
        &self,
        draft: &str,
        subject: &str,
        description: &str,
        category: Category,
        retries: u32,
    ) -> ReviewOutcome {
        let combined = format!("{} {}", subject, description).to_lowercase();

        // Policy floor: no sensitive content in outbound drafts, regardless
        // of category.
        if self.sensitive_patterns.iter().any(|re| re.is_match(draft)) {
            return ReviewOutcome::Rejected {
                feedback: SENSITIVE_FEEDBACK.to_string(),
            };
        }

        // Technical incidents: approve.
        if category == Category::Technical || contains_any(&combined, TECHNICAL_TERMS) {
            return ReviewOutcome::Approved {
                final_reply: draft.to_string(),
                feedback: None,
            };
        }

        // Billing / refund ladder.
        if category == Category::Billing || self.refund.is_match(&combined) {
            if self.extreme_demand.is_match(&combined) {
                return ReviewOutcome::EscalateNow {
                    feedback: DIRECT_ESCALATION_FEEDBACK.to_string(),
                    final_reply: ESCALATED_REPLY.to_string(),
                };
            }
            return match retries {
                0 => ReviewOutcome::Rejected {
                    feedback: REFUND_FEEDBACK.to_string(),
                },
                1 => ReviewOutcome::Approved {
                    final_reply: draft.to_string(),
                    feedback: None,
                },
                _ => ReviewOutcome::EscalateExhausted {
                    feedback: EXHAUSTED_REFUND_FEEDBACK.to_string(),
                },
            };
        }

        ReviewOutcome::Approved {
            final_reply: draft.to_string(),
            feedback: Some("Auto-approved: no issues detected.".to_string()),
        }
    }
}

impl Default for Reviewer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewer() -> Reviewer {
        Reviewer::new()
    }

    #[test]
    fn sensitive_guard_rejects() {
        let outcome = reviewer().review(
            "Your password is hunter2",
            "Login help",
            "I cannot log in",
            Category::General,
            0,
        );
        assert_eq!(
            outcome,
            ReviewOutcome::Rejected {
                feedback: SENSITIVE_FEEDBACK.to_string()
            }
        );
    }

    #[test]
    fn sensitive_guard_wins_over_technical_fast_path() {
        // Technical category, but the draft leaks a credential — the floor
        // is checked before all category logic.
        let outcome = reviewer().review(
            "Reset your password via the admin panel",
            "Server Down",
            "server error",
            Category::Technical,
            0,
        );
        assert!(matches!(outcome, ReviewOutcome::Rejected { .. }));
    }

    #[test]
    fn sensitive_guard_case_insensitive() {
        let outcome = reviewer().review(
            "Here is your Credit Card number",
            "s",
            "d",
            Category::General,
            0,
        );
        assert!(matches!(outcome, ReviewOutcome::Rejected { .. }));
    }

    #[test]
    fn technical_approves_immediately() {
        let outcome = reviewer().review(
            "safe draft",
            "Server Down Issue",
            "The server is down with a 500 error",
            Category::Technical,
            0,
        );
        assert_eq!(
            outcome,
            ReviewOutcome::Approved {
                final_reply: "safe draft".to_string(),
                feedback: None,
            }
        );
    }

    #[test]
    fn technical_markers_approve_even_without_category() {
        // Classified General, but the text mentions an incident marker.
        let outcome = reviewer().review("safe draft", "Weird", "an api thing broke", Category::General, 0);
        assert!(matches!(outcome, ReviewOutcome::Approved { .. }));
    }

    #[test]
    fn refund_first_pass_rejected() {
        let outcome = reviewer().review(
            "safe draft",
            "Billing Refund Request",
            "I need a refund for my last invoice",
            Category::Billing,
            0,
        );
        assert_eq!(
            outcome,
            ReviewOutcome::Rejected {
                feedback: REFUND_FEEDBACK.to_string()
            }
        );
    }

    #[test]
    fn refund_second_pass_approved() {
        let outcome = reviewer().review(
            "refined draft",
            "Billing Refund Request",
            "I need a refund for my last invoice",
            Category::Billing,
            1,
        );
        assert_eq!(
            outcome,
            ReviewOutcome::Approved {
                final_reply: "refined draft".to_string(),
                feedback: None,
            }
        );
    }

    #[test]
    fn refund_exhausted_escalates() {
        let outcome = reviewer().review(
            "still bad",
            "Billing Refund Request",
            "I need a refund",
            Category::Billing,
            2,
        );
        assert_eq!(
            outcome,
            ReviewOutcome::EscalateExhausted {
                feedback: EXHAUSTED_REFUND_FEEDBACK.to_string()
            }
        );
    }

    #[test]
    fn extreme_demand_escalates_directly() {
        for description in ["I demand a $1M refund immediately", "refund now, I demand it"] {
            let outcome = reviewer().review(
                "safe draft",
                "Urgent: Money Back",
                description,
                Category::Billing,
                0,
            );
            assert_eq!(
                outcome,
                ReviewOutcome::EscalateNow {
                    feedback: DIRECT_ESCALATION_FEEDBACK.to_string(),
                    final_reply: ESCALATED_REPLY.to_string(),
                }
            );
        }
    }

    #[test]
    fn extreme_demand_ignores_retry_count() {
        let outcome = reviewer().review(
            "safe draft",
            "",
            "$50 refund or else",
            Category::Billing,
            1,
        );
        assert!(matches!(outcome, ReviewOutcome::EscalateNow { .. }));
    }

    #[test]
    fn refund_term_triggers_ladder_without_billing_category() {
        let outcome = reviewer().review("safe draft", "", "where is my refund", Category::General, 0);
        assert!(matches!(outcome, ReviewOutcome::Rejected { .. }));
    }

    #[test]
    fn default_approves_with_note() {
        let outcome = reviewer().review(
            "safe draft",
            "Office Hours",
            "Can you tell me your office hours?",
            Category::General,
            0,
        );
        match outcome {
            ReviewOutcome::Approved { final_reply, feedback } => {
                assert_eq!(final_reply, "safe draft");
                assert_eq!(feedback.as_deref(), Some("Auto-approved: no issues detected."));
            }
            other => panic!("Expected Approved, got {:?}", other),
        }
    }
}
