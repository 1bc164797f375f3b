use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One evaluated query. Kept in input order, including queries whose
/// relevant set was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub query: String,
    pub recall_at_k: f64,
}

/// Immutable evaluation output: per-query detail plus aggregates.
///
/// Aggregates cover only queries with a non-empty relevant set; the `note`
/// field states that exclusion and describes the relevance source. Written
/// once, never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallReport {
    pub k: usize,
    pub recall_scores: Vec<f64>,
    pub mean_recall: f64,
    pub median_recall: f64,
    pub min_recall: f64,
    pub max_recall: f64,
    pub evaluated_queries: usize,
    pub excluded_queries: usize,
    pub note: String,
    pub query_results: Vec<EvaluationRecord>,
}

impl RecallReport {
    /// Assemble the report from per-query records plus the subset of scores
    /// eligible for aggregation (queries with non-empty relevant sets).
    #[must_use]
    pub fn new(
        k: usize,
        records: Vec<EvaluationRecord>,
        included_scores: &[f64],
        relevance_note: &str,
    ) -> Self {
        let excluded = records.len() - included_scores.len();
        let note = format!(
            "Relevance source: {relevance_note}. Aggregates cover {} of {} queries; \
             {} with empty relevant sets are excluded from aggregates but retained \
             in query_results.",
            included_scores.len(),
            records.len(),
            excluded,
        );
        Self {
            k,
            recall_scores: records.iter().map(|r| r.recall_at_k).collect(),
            mean_recall: mean(included_scores),
            median_recall: median(included_scores),
            min_recall: fold_min(included_scores),
            max_recall: fold_max(included_scores),
            evaluated_queries: included_scores.len(),
            excluded_queries: excluded,
            note,
            query_results: records,
        }
    }

    /// Serialize once to pretty JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, bytes).await?;
        log::info!("Saved recall report to {}", path.display());
        Ok(())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn fold_min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn fold_max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(query: &str, recall: f64) -> EvaluationRecord {
        EvaluationRecord {
            query: query.to_string(),
            recall_at_k: recall,
        }
    }

    #[test]
    fn aggregates_cover_only_included_scores() {
        let records = vec![
            record("a", 0.2),
            record("b", 0.8),
            // Empty relevant set: recorded as 1.0 but not aggregated.
            record("c", 1.0),
        ];
        let report = RecallReport::new(10, records, &[0.2, 0.8], "test labels");

        assert_eq!(report.recall_scores, vec![0.2, 0.8, 1.0]);
        assert_eq!(report.mean_recall, 0.5);
        assert_eq!(report.median_recall, 0.5);
        assert_eq!(report.min_recall, 0.2);
        assert_eq!(report.max_recall, 0.8);
        assert_eq!(report.evaluated_queries, 2);
        assert_eq!(report.excluded_queries, 1);
        assert!(report.note.contains("excluded from aggregates"));
    }

    #[test]
    fn median_averages_the_two_middles_for_even_counts() {
        assert_eq!(median(&[0.0, 1.0]), 0.5);
        assert_eq!(median(&[0.1, 0.2, 0.7, 0.8]), 0.45);
        assert_eq!(median(&[0.3, 0.9, 0.1]), 0.3);
    }

    #[test]
    fn empty_aggregation_set_yields_zeroed_stats() {
        let report = RecallReport::new(5, vec![record("a", 1.0)], &[], "no labels");
        assert_eq!(report.mean_recall, 0.0);
        assert_eq!(report.min_recall, 0.0);
        assert_eq!(report.max_recall, 0.0);
        assert_eq!(report.evaluated_queries, 0);
        assert_eq!(report.excluded_queries, 1);
    }

    #[tokio::test]
    async fn report_saves_as_json_with_expected_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.json");
        let report = RecallReport::new(3, vec![record("q", 0.5)], &[0.5], "labels");
        report.save(&path).await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["k"], 3);
        assert_eq!(value["mean_recall"], 0.5);
        assert!(value["query_results"].is_array());
        assert!(value["note"].is_string());
    }
}
