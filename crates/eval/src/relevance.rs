use shortlist_vector_store::VectorIndex;
use std::collections::{BTreeSet, HashMap};

/// Source of per-query relevance labels.
///
/// Kept pluggable because the no-labels fallback (every catalog reference
/// counts as relevant for every query) makes recall saturate once the top-k
/// window covers the catalog. Callers with real labels should always prefer
/// them; the report's note records which source was used.
pub trait RelevanceProvider: Send + Sync {
    /// The set of references considered relevant for `query`. May be empty.
    fn relevant(&self, query: &str) -> BTreeSet<String>;

    /// One-line description of the label source, surfaced in the report.
    fn describe(&self) -> String;
}

/// Explicit per-query relevance labels.
pub struct LabeledRelevance {
    labels: HashMap<String, BTreeSet<String>>,
}

impl LabeledRelevance {
    #[must_use]
    pub fn new(labels: HashMap<String, BTreeSet<String>>) -> Self {
        Self { labels }
    }
}

impl RelevanceProvider for LabeledRelevance {
    fn relevant(&self, query: &str) -> BTreeSet<String> {
        self.labels.get(query).cloned().unwrap_or_default()
    }

    fn describe(&self) -> String {
        format!("explicit labels for {} queries", self.labels.len())
    }
}

/// Degenerate fallback: the whole training catalog is the relevant set for
/// every query. Recall against it approaches 1.0 for any retriever whose
/// top-k window covers the catalog, so treat the numbers as a smoke signal,
/// not a quality measure.
pub struct CatalogRelevance {
    references: BTreeSet<String>,
}

impl CatalogRelevance {
    #[must_use]
    pub fn from_index(index: &VectorIndex) -> Self {
        Self {
            references: index
                .items()
                .iter()
                .map(|item| item.reference.clone())
                .collect(),
        }
    }
}

impl RelevanceProvider for CatalogRelevance {
    fn relevant(&self, _query: &str) -> BTreeSet<String> {
        self.references.clone()
    }

    fn describe(&self) -> String {
        format!(
            "entire training catalog ({} references) treated as relevant; \
             recall saturates once top-k covers the catalog",
            self.references.len()
        )
    }
}
