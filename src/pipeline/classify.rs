//! Keyword classifier — first stage of the pipeline.
//!
//! Total and deterministic: every input lands on exactly one category, and
//! the same text always lands on the same one. Categories are checked in
//! fixed priority order; the first keyword set with a hit wins.

use crate::pipeline::state::Category;

/// Billing-related terms, checked first.
const BILLING_TERMS: &[&str] = &["invoice", "refund", "payment", "bill", "billing"];

/// Technical-incident terms. Also used by the reviewer's fast-path.
pub(crate) const TECHNICAL_TERMS: &[&str] = &["server", "error", "bug", "crash", "latency", "api"];

/// Security-incident terms.
const SECURITY_TERMS: &[&str] = &["hack", "phish", "breach", "password", "2fa", "unauthorized"];

/// Classify a ticket from its subject and description.
///
/// Matching is case-insensitive substring containment over the combined
/// text. Falls through to `General` when nothing matches.
pub fn classify(subject: &str, description: &str) -> Category {
    let text = format!("{} {}", subject, description).to_lowercase();

    if contains_any(&text, BILLING_TERMS) {
        Category::Billing
    } else if contains_any(&text, TECHNICAL_TERMS) {
        Category::Technical
    } else if contains_any(&text, SECURITY_TERMS) {
        Category::Security
    } else {
        Category::General
    }
}

pub(crate) fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_keywords() {
        assert_eq!(classify("Refund Request", "I need a refund"), Category::Billing);
        assert_eq!(classify("", "My invoice was charged twice"), Category::Billing);
        assert_eq!(classify("Payment issue", ""), Category::Billing);
    }

    #[test]
    fn technical_keywords() {
        assert_eq!(
            classify("Server Down Issue", "The server is down with a 500 error"),
            Category::Technical
        );
        assert_eq!(classify("", "the app keeps crashing"), Category::Technical);
    }

    #[test]
    fn security_keywords() {
        assert_eq!(classify("Account breach", "someone hacked me"), Category::Security);
        assert_eq!(classify("", "I forgot my password"), Category::Security);
        assert_eq!(classify("", "enable 2fa please"), Category::Security);
    }

    #[test]
    fn defaults_to_general() {
        assert_eq!(
            classify("Office Hours", "Can you tell me your office hours?"),
            Category::General
        );
        assert_eq!(classify("", ""), Category::General);
    }

    #[test]
    fn billing_wins_over_technical() {
        // "refund" and "error" both present — billing is checked first
        assert_eq!(
            classify("", "refund failed with an error"),
            Category::Billing
        );
    }

    #[test]
    fn technical_wins_over_security() {
        assert_eq!(
            classify("", "server password reset"),
            Category::Technical
        );
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify("REFUND", ""), Category::Billing);
        assert_eq!(classify("", "SERVER down"), Category::Technical);
    }

    #[test]
    fn subject_and_description_both_considered() {
        // keyword only in the subject
        assert_eq!(classify("billing question", "hello"), Category::Billing);
        // keyword only in the description
        assert_eq!(classify("hello", "billing question"), Category::Billing);
    }

    #[test]
    fn deterministic() {
        for _ in 0..3 {
            assert_eq!(classify("Weird ticket", "about nothing"), Category::General);
        }
    }
}
