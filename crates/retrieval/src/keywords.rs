use crate::vocabulary::Vocabulary;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Deterministically maps free text to a tag set against a fixed vocabulary.
///
/// Pure function of the input text and the vocabulary: the same extraction
/// rule runs at index-build time and at query time, which keyword scoring
/// relies on (tag sets on both sides must come from the same rule to be
/// comparable).
pub struct KeywordExtractor {
    vocabulary: Arc<Vocabulary>,
}

impl KeywordExtractor {
    #[must_use]
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Matched skill tags plus matched seniority level names.
    ///
    /// Empty or whitespace-only text yields an empty set, not an error.
    #[must_use]
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return BTreeSet::new();
        }

        let mut tags: BTreeSet<String> = self
            .vocabulary
            .matching_skills(&normalized)
            .map(str::to_string)
            .collect();
        tags.extend(
            self.vocabulary
                .matching_seniority(&normalized)
                .map(|level| level.tag().to_string()),
        );
        tags
    }
}

/// Case-fold and collapse whitespace so multi-word vocabulary terms match
/// across line breaks and irregular spacing. No stemming.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity between two tag sets: `|A ∩ B| / |A ∪ B|`.
///
/// Defined as 0.0 when both sets are empty, so tag-free texts never earn a
/// spurious boost.
#[must_use]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}
