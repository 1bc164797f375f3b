//! # Shortlist Retrieval
//!
//! Hybrid ranking of catalog items against free-text queries: dense semantic
//! similarity from the vector index, lexical overlap from a fixed keyword
//! vocabulary, fused with validated convex weights.
//!
//! The scoring pipeline is three explicit stages with typed inputs and
//! outputs — semantic, keyword, fusion — followed by a deterministic rank
//! (score descending, ties by ascending distance, then catalog order).

mod config;
mod error;
mod fusion;
mod keywords;
mod retriever;
mod vocabulary;

pub use config::{
    RetrieverConfig, DEFAULT_KEYWORD_WEIGHT, DEFAULT_MAX_TOP_K, DEFAULT_SEMANTIC_WEIGHT,
};
pub use error::{Result, RetrievalError};
pub use fusion::{semantic_score, ScoredResult};
pub use keywords::{jaccard, KeywordExtractor};
pub use retriever::HybridRetriever;
pub use vocabulary::{default_vocabulary, SeniorityLevel, Vocabulary};
