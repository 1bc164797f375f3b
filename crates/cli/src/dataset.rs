use anyhow::{Context as AnyhowContext, Result};
use serde::Deserialize;
use shortlist_vector_store::TrainingPair;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

pub const DATASET_SCHEMA_VERSION: u32 = 1;

/// Training-pair dataset: the catalog ingestion contract. Pair order is
/// preserved; duplicate query texts are allowed and become independent
/// catalog entries.
#[derive(Debug, Deserialize)]
pub struct PairsFile {
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub pairs: Vec<TrainingPair>,
}

impl PairsFile {
    fn validate(&self) -> Result<()> {
        if self.schema_version != DATASET_SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported pairs schema_version {} (expected {DATASET_SCHEMA_VERSION})",
                self.schema_version
            );
        }
        if self.pairs.is_empty() {
            anyhow::bail!("Pairs dataset must contain at least one pair");
        }
        for (idx, pair) in self.pairs.iter().enumerate() {
            if pair.query.trim().is_empty() {
                anyhow::bail!("Pair {idx} has an empty query");
            }
            if pair.reference.trim().is_empty() {
                anyhow::bail!("Pair {idx} has an empty reference");
            }
        }
        Ok(())
    }
}

/// Evaluation query set.
#[derive(Debug, Deserialize)]
pub struct QueriesFile {
    pub schema_version: u32,
    pub queries: Vec<String>,
}

impl QueriesFile {
    fn validate(&self) -> Result<()> {
        if self.schema_version != DATASET_SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported queries schema_version {} (expected {DATASET_SCHEMA_VERSION})",
                self.schema_version
            );
        }
        if self.queries.is_empty() {
            anyhow::bail!("Query set must contain at least one query");
        }
        if self.queries.iter().any(|query| query.trim().is_empty()) {
            anyhow::bail!("Query set contains an empty query");
        }
        Ok(())
    }
}

/// Optional explicit relevance labels: query text → relevant references.
#[derive(Debug, Deserialize)]
pub struct LabelsFile {
    pub schema_version: u32,
    pub labels: BTreeMap<String, Vec<String>>,
}

impl LabelsFile {
    fn validate(&self) -> Result<()> {
        if self.schema_version != DATASET_SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported labels schema_version {} (expected {DATASET_SCHEMA_VERSION})",
                self.schema_version
            );
        }
        Ok(())
    }

    pub fn into_label_map(self) -> HashMap<String, BTreeSet<String>> {
        self.labels
            .into_iter()
            .map(|(query, references)| (query, references.into_iter().collect()))
            .collect()
    }
}

pub async fn load_pairs(path: &Path) -> Result<PairsFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read pairs dataset {}", path.display()))?;
    let dataset: PairsFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Pairs dataset {} is not valid JSON", path.display()))?;
    dataset.validate()?;
    Ok(dataset)
}

pub async fn load_queries(path: &Path) -> Result<Vec<String>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read query set {}", path.display()))?;
    let dataset: QueriesFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Query set {} is not valid JSON", path.display()))?;
    dataset.validate()?;
    Ok(dataset.queries)
}

pub async fn load_labels(path: &Path) -> Result<HashMap<String, BTreeSet<String>>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read labels file {}", path.display()))?;
    let labels: LabelsFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Labels file {} is not valid JSON", path.display()))?;
    labels.validate()?;
    Ok(labels.into_label_map())
}
