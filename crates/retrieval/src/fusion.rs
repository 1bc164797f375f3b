use crate::keywords::jaccard;
use serde::Serialize;
use shortlist_vector_store::{CatalogItem, Neighbor};
use std::collections::BTreeSet;
use std::collections::HashSet;

/// Final fused, ranked result for one candidate. All three scores live in
/// `[0, 1]`; `final_score` is the convex combination of the other two.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    pub item: CatalogItem,
    pub semantic_score: f32,
    pub keyword_score: f32,
    pub final_score: f32,
}

/// Semantic stage output: a fetched neighbor with its distance mapped into a
/// bounded score.
#[derive(Debug, Clone)]
pub struct SemanticCandidate {
    pub neighbor: Neighbor,
    pub semantic_score: f32,
}

/// Keyword stage output.
#[derive(Debug, Clone)]
pub struct KeywordCandidate {
    pub candidate: SemanticCandidate,
    pub keyword_score: f32,
}

/// Fusion stage output, ready for ranking.
#[derive(Debug, Clone)]
pub struct FusedCandidate {
    pub candidate: KeywordCandidate,
    pub final_score: f32,
}

/// Map a raw Euclidean distance into `(0, 1]`: 1 at distance zero,
/// decreasing monotonically. Bounded and independent of the candidate set —
/// min-max normalization over the fetched candidates would make a score
/// depend on which candidates happened to be fetched.
#[must_use]
pub fn semantic_score(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

pub fn semantic_stage(neighbors: Vec<Neighbor>) -> Vec<SemanticCandidate> {
    neighbors
        .into_iter()
        .map(|neighbor| SemanticCandidate {
            semantic_score: semantic_score(neighbor.distance),
            neighbor,
        })
        .collect()
}

/// Score tag overlap as Jaccard similarity against the query's tag set.
/// With boosting off every candidate reports 0.0 so the output schema stays
/// uniform.
pub fn keyword_stage(
    candidates: Vec<SemanticCandidate>,
    query_tags: &BTreeSet<String>,
    use_keyword_boost: bool,
) -> Vec<KeywordCandidate> {
    candidates
        .into_iter()
        .map(|candidate| {
            let keyword_score = if use_keyword_boost {
                jaccard(query_tags, &candidate.neighbor.item.tags)
            } else {
                0.0
            };
            KeywordCandidate {
                candidate,
                keyword_score,
            }
        })
        .collect()
}

/// Convex combination of the two signals. The caller supplies validated
/// weights; with boosting off the effective pair is `(1.0, 0.0)` so the
/// final score equals the semantic score exactly.
pub fn fusion_stage(
    candidates: Vec<KeywordCandidate>,
    semantic_weight: f32,
    keyword_weight: f32,
) -> Vec<FusedCandidate> {
    candidates
        .into_iter()
        .map(|candidate| FusedCandidate {
            final_score: semantic_weight * candidate.candidate.semantic_score
                + keyword_weight * candidate.keyword_score,
            candidate,
        })
        .collect()
}

/// Order by final score descending; ties break by ascending semantic
/// distance, then by catalog slot. De-duplicates by reference (best-ranked
/// occurrence wins) and truncates to `top_k`.
pub fn rank(mut fused: Vec<FusedCandidate>, top_k: usize) -> Vec<ScoredResult> {
    fused.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.candidate
                    .candidate
                    .neighbor
                    .distance
                    .partial_cmp(&b.candidate.candidate.neighbor.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                a.candidate
                    .candidate
                    .neighbor
                    .slot
                    .cmp(&b.candidate.candidate.neighbor.slot)
            })
    });

    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::with_capacity(top_k.min(fused.len()));
    for fused_candidate in fused {
        let FusedCandidate {
            candidate:
                KeywordCandidate {
                    candidate:
                        SemanticCandidate {
                            neighbor,
                            semantic_score,
                        },
                    keyword_score,
                },
            final_score,
        } = fused_candidate;
        if !seen.insert(neighbor.item.reference.clone()) {
            continue;
        }
        results.push(ScoredResult {
            item: neighbor.item,
            semantic_score,
            keyword_score,
            final_score,
        });
        if results.len() == top_k {
            break;
        }
    }
    results
}
