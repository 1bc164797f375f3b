use crate::error::Result;
use crate::relevance::RelevanceProvider;
use crate::report::{EvaluationRecord, RecallReport};
use shortlist_retrieval::HybridRetriever;
use std::collections::{BTreeSet, HashSet};

/// Recall@K for one query: the fraction of its relevant references that
/// appear among the top-k retrieved references.
///
/// Defined as 1.0 when the relevant set is empty — there was nothing to
/// miss — so the degenerate case never divides by zero. Such queries are
/// excluded from aggregates by the evaluator.
#[must_use]
pub fn recall_at_k(retrieved: &[String], relevant: &BTreeSet<String>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 1.0;
    }
    let found: HashSet<&str> = retrieved
        .iter()
        .take(k)
        .map(String::as_str)
        .filter(|reference| relevant.contains(*reference))
        .collect();
    found.len() as f64 / relevant.len() as f64
}

/// Drives the retriever over a query set and assembles a `RecallReport`.
#[derive(Debug, Clone, Copy)]
pub struct RecallEvaluator {
    k: usize,
    use_keyword_boost: bool,
}

impl RecallEvaluator {
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            use_keyword_boost: true,
        }
    }

    #[must_use]
    pub const fn with_keyword_boost(mut self, on: bool) -> Self {
        self.use_keyword_boost = on;
        self
    }

    /// Evaluate every query in input order. Queries with empty relevant sets
    /// score 1.0 and stay in the per-query detail, but are excluded from the
    /// aggregate statistics; the report's note states both.
    pub async fn evaluate(
        &self,
        retriever: &HybridRetriever,
        queries: &[String],
        relevance: &dyn RelevanceProvider,
    ) -> Result<RecallReport> {
        log::info!(
            "Recall@{} evaluation over {} queries ({})",
            self.k,
            queries.len(),
            relevance.describe()
        );

        let mut records = Vec::with_capacity(queries.len());
        let mut included_scores = Vec::with_capacity(queries.len());

        for query in queries {
            let results = retriever
                .retrieve(query, self.k, self.use_keyword_boost)
                .await?;
            let retrieved: Vec<String> = results
                .into_iter()
                .map(|result| result.item.reference)
                .collect();

            let relevant = relevance.relevant(query);
            let recall = recall_at_k(&retrieved, &relevant, self.k);
            log::debug!("Recall@{} = {recall:.4} for query '{query}'", self.k);

            if !relevant.is_empty() {
                included_scores.push(recall);
            }
            records.push(EvaluationRecord {
                query: query.clone(),
                recall_at_k: recall,
            });
        }

        Ok(RecallReport::new(
            self.k,
            records,
            &included_scores,
            &relevance.describe(),
        ))
    }
}
