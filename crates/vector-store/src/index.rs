use crate::error::{Result, VectorStoreError};
use crate::types::{CatalogItem, Neighbor};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const INDEX_SCHEMA_VERSION: u32 = 1;

/// Exact brute-force nearest-neighbor index over Euclidean distance.
///
/// The catalog is small enough that a linear scan beats an ANN structure and
/// stays exactly auditable, which the recall harness depends on. Vectors and
/// items are parallel arrays: slot `i` of one always describes slot `i` of
/// the other, in insertion order. A build produces a new immutable snapshot,
/// so readers of a previous snapshot are never exposed to partial state.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    items: Vec<CatalogItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    schema_version: u32,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    items: Vec<CatalogItem>,
}

impl VectorIndex {
    /// Build a snapshot from aligned `(vector, item)` entries.
    ///
    /// An empty sequence is accepted (a valid, degenerate index). Any vector
    /// whose length differs from `dimension` fails the whole build.
    pub fn build(dimension: usize, entries: Vec<(Vec<f32>, CatalogItem)>) -> Result<Self> {
        let mut vectors = Vec::with_capacity(entries.len());
        let mut items = Vec::with_capacity(entries.len());
        for (vector, item) in entries {
            if vector.len() != dimension {
                return Err(VectorStoreError::InvalidDimension {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            vectors.push(vector);
            items.push(item);
        }
        log::info!(
            "Built vector index: {} items, dimension {}",
            items.len(),
            dimension
        );
        Ok(Self {
            dimension,
            vectors,
            items,
        })
    }

    /// Return the `k` nearest items by ascending Euclidean distance.
    ///
    /// Distance ties keep insertion order (stable sort). Fewer than `k`
    /// stored items means all of them come back; an empty index returns an
    /// empty result rather than erroring.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(slot, vector)| (slot, euclidean_distance(query, vector)))
            .collect();
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        Ok(hits
            .into_iter()
            .map(|(slot, distance)| Neighbor {
                slot,
                distance,
                item: self.items[slot].clone(),
            })
            .collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// All catalog items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Persist the snapshot as a schema-versioned JSON document.
    ///
    /// Written to a temp file and renamed into place so a crash never leaves
    /// a half-written index behind.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedIndex {
            schema_version: INDEX_SCHEMA_VERSION,
            dimension: self.dimension,
            vectors: self.vectors.clone(),
            items: self.items.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::info!("Saved vector index to {}", path.display());
        Ok(())
    }

    /// Load a snapshot, failing fast on any integrity violation: unknown
    /// schema version, vector/item slot count mismatch, or a stored vector
    /// with the wrong dimension.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)?;

        if persisted.schema_version != INDEX_SCHEMA_VERSION {
            return Err(VectorStoreError::CorruptIndex(format!(
                "unsupported index schema_version {} (expected {INDEX_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        if persisted.vectors.len() != persisted.items.len() {
            return Err(VectorStoreError::CorruptIndex(format!(
                "vector store and reference array are misaligned: {} vectors vs {} items",
                persisted.vectors.len(),
                persisted.items.len()
            )));
        }
        if let Some(bad) = persisted
            .vectors
            .iter()
            .find(|v| v.len() != persisted.dimension)
        {
            return Err(VectorStoreError::CorruptIndex(format!(
                "stored vector has dimension {} (index dimension {})",
                bad.len(),
                persisted.dimension
            )));
        }

        log::info!(
            "Loaded vector index from {}: {} items",
            path.display(),
            persisted.items.len()
        );
        Ok(Self {
            dimension: persisted.dimension,
            vectors: persisted.vectors,
            items: persisted.items,
        })
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
