//! # Shortlist Eval
//!
//! Recall@K evaluation harness for the hybrid retriever.
//!
//! Relevance is a pluggable input: explicit per-query labels when they
//! exist, or the degenerate whole-catalog fallback (kept for parity with
//! unlabeled datasets, and called out in the report note because it
//! saturates for large k). The output is an immutable report, written once.

mod error;
mod recall;
mod relevance;
mod report;

pub use error::{EvalError, Result};
pub use recall::{recall_at_k, RecallEvaluator};
pub use relevance::{CatalogRelevance, LabeledRelevance, RelevanceProvider};
pub use report::{EvaluationRecord, RecallReport};
