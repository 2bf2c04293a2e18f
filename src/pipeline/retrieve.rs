//! Context retrieval — ranked snippet lookup over the knowledge corpus.

use std::sync::Arc;

use crate::pipeline::state::Category;
use crate::store::corpus::KnowledgeStore;

/// Retrieves per-category context snippets ranked by query relevance.
///
/// The corpus is read-only; ranking never mutates it. An empty category
/// yields an empty result, never an error.
pub struct Retriever {
    store: Arc<KnowledgeStore>,
}

impl Retriever {
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Rank the category's snippets against the query.
    ///
    /// `feedback` is reviewer feedback folded into the query on refinement
    /// passes (the caller passes `None` on the first pass).
    pub fn retrieve(
        &self,
        category: Category,
        query: &str,
        feedback: Option<&str>,
    ) -> Vec<String> {
        let mut full_query = query.to_string();
        if let Some(feedback) = feedback {
            full_query.push(' ');
            full_query.push_str(feedback);
        }

        rank_by_query(self.store.snippets(category), &full_query)
    }
}

/// Sort snippets by descending relevance score.
///
/// Relevance is the number of query terms (whitespace-split, lowercased)
/// contained in the lowercased snippet; repeated terms count each time.
/// The sort is stable, so ties keep the corpus's original relative order —
/// required for reproducible fixtures.
fn rank_by_query(snippets: &[String], query: &str) -> Vec<String> {
    let terms: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if terms.is_empty() {
        return snippets.to_vec();
    }

    let mut scored: Vec<(usize, &String)> = snippets
        .iter()
        .map(|snippet| {
            let haystack = snippet.to_lowercase();
            let score = terms
                .iter()
                .filter(|term| haystack.contains(term.as_str()))
                .count();
            (score, snippet)
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, snippet)| snippet.clone()).collect()
}
