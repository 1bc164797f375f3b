use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An indexed catalog unit: a reference string plus the tag set extracted
/// from its training query.
///
/// The embedding is not stored inline; it lives in the index's vector table
/// at the same slot (see `VectorIndex`), so the persisted form stays
/// slot-aligned. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Opaque identifier assigned at build time from the insertion ordinal.
    pub id: String,
    /// What the item points at, e.g. an assessment URL.
    pub reference: String,
    /// Normalized keyword tags (skills and seniority levels).
    pub tags: BTreeSet<String>,
}

/// One unit of catalog ingestion: a representative query text and the
/// reference it should surface. The query text is the item's semantic
/// anchor — the catalog is indexed by queries, not by item descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub query: String,
    pub reference: String,
}

/// A single nearest-neighbor hit.
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Catalog slot (insertion order) the hit came from.
    pub slot: usize,
    /// Raw Euclidean distance to the query vector.
    pub distance: f32,
    pub item: CatalogItem,
}
