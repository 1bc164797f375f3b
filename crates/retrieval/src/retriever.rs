use crate::config::RetrieverConfig;
use crate::error::{Result, RetrievalError};
use crate::fusion::{self, ScoredResult};
use crate::keywords::KeywordExtractor;
use crate::vocabulary::Vocabulary;
use lru::LruCache;
use shortlist_vector_store::{
    CatalogItem, EmbeddingProvider, TrainingPair, VectorIndex, VectorStoreError,
};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Query embeddings repeat heavily during evaluation runs; a small in-memory
/// cache keeps the provider out of the hot path. Correctness never depends
/// on it.
const QUERY_CACHE_CAPACITY: usize = 256;

/// Hybrid retriever: fuses semantic distance against the vector index with
/// keyword overlap from the fixed vocabulary.
///
/// Holds an immutable index snapshot; building a new catalog produces a new
/// retriever rather than mutating this one, so concurrent readers of an
/// existing snapshot are never exposed to partial state.
pub struct HybridRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: KeywordExtractor,
    config: RetrieverConfig,
    index: VectorIndex,
    query_cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl std::fmt::Debug for HybridRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRetriever")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl HybridRetriever {
    /// Build a retriever from training pairs.
    ///
    /// Each pair's query text is the item's semantic anchor: all texts go to
    /// the provider in one batch call, tags are extracted with the same rule
    /// used at query time, and the index snapshot is assembled in input
    /// order. Duplicate query texts are accepted as independent entries.
    pub async fn build(
        embedder: Arc<dyn EmbeddingProvider>,
        vocabulary: Arc<Vocabulary>,
        config: RetrieverConfig,
        pairs: Vec<TrainingPair>,
    ) -> Result<Self> {
        config.validate()?;

        log::info!("Building catalog index from {} training pairs", pairs.len());
        let texts: Vec<String> = pairs.iter().map(|pair| pair.query.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != pairs.len() {
            return Err(RetrievalError::VectorStore(
                VectorStoreError::EmbeddingError(format!(
                    "provider returned {} vectors for {} texts",
                    vectors.len(),
                    pairs.len()
                )),
            ));
        }

        let extractor = KeywordExtractor::new(vocabulary.clone());
        let entries: Vec<(Vec<f32>, CatalogItem)> = pairs
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(slot, (pair, vector))| {
                let item = CatalogItem {
                    id: format!("item-{slot:06}"),
                    reference: pair.reference,
                    tags: extractor.extract(&pair.query),
                };
                (vector, item)
            })
            .collect();

        let index = VectorIndex::build(embedder.dimension(), entries)?;
        Self::from_index(embedder, vocabulary, config, index)
    }

    /// Wrap an existing index snapshot (typically one loaded from disk).
    pub fn from_index(
        embedder: Arc<dyn EmbeddingProvider>,
        vocabulary: Arc<Vocabulary>,
        config: RetrieverConfig,
        index: VectorIndex,
    ) -> Result<Self> {
        config.validate()?;
        if index.dimension() != embedder.dimension() {
            return Err(RetrievalError::Config(format!(
                "index dimension {} does not match embedding provider dimension {}",
                index.dimension(),
                embedder.dimension()
            )));
        }
        Ok(Self {
            embedder,
            extractor: KeywordExtractor::new(vocabulary),
            config,
            index,
            query_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(QUERY_CACHE_CAPACITY)
                    .unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    /// Retrieve the top-`top_k` catalog items for a free-text query.
    ///
    /// Over-fetches `2 * top_k` candidates from the index so keyword
    /// re-ranking cannot push a semantically-close item out of the window,
    /// then runs the semantic, keyword, and fusion stages and ranks. Returns
    /// at most `min(top_k, corpus_size)` results with no duplicate
    /// references; an empty corpus yields an empty result, not an error.
    pub async fn retrieve(
        &self,
        text: &str,
        top_k: usize,
        use_keyword_boost: bool,
    ) -> Result<Vec<ScoredResult>> {
        self.config.validate()?;
        if top_k == 0 {
            return Err(RetrievalError::Config("top_k must be positive".to_string()));
        }
        if top_k > self.config.max_top_k {
            return Err(RetrievalError::Config(format!(
                "top_k {top_k} exceeds configured bound {}",
                self.config.max_top_k
            )));
        }

        let query_vector = self.embed_cached(text).await?;
        let query_tags = self.extractor.extract(text);
        log::debug!(
            "Retrieve: top_k={top_k}, boost={use_keyword_boost}, query tags: {query_tags:?}"
        );

        let fetch = (2 * top_k).min(self.index.len());
        let neighbors = self.index.search(&query_vector, fetch)?;

        let (semantic_weight, keyword_weight) = if use_keyword_boost {
            (self.config.semantic_weight, self.config.keyword_weight)
        } else {
            (1.0, 0.0)
        };

        let candidates = fusion::semantic_stage(neighbors);
        let candidates = fusion::keyword_stage(candidates, &query_tags, use_keyword_boost);
        let fused = fusion::fusion_stage(candidates, semantic_weight, keyword_weight);
        Ok(fusion::rank(fused, top_k))
    }

    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[must_use]
    pub const fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    async fn embed_cached(&self, text: &str) -> Result<Vec<f32>> {
        if let Ok(mut cache) = self.query_cache.lock() {
            if let Some(vector) = cache.get(text) {
                return Ok(vector.clone());
            }
        }
        let vector = self.embedder.embed(text).await?;
        if let Ok(mut cache) = self.query_cache.lock() {
            cache.put(text.to_string(), vector.clone());
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::default_vocabulary;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use shortlist_vector_store::HashEmbedder;
    use std::collections::{BTreeSet, HashMap, HashSet};

    /// Provider with canned vectors per text, for scenarios where distances
    /// must be exact.
    struct FixedEmbedder {
        dimension: usize,
        vectors: HashMap<String, Vec<f32>>,
    }

    impl FixedEmbedder {
        fn new(dimension: usize, entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                dimension,
                vectors: entries
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        fn dimension(&self) -> usize {
            self.dimension
        }

        async fn embed(&self, text: &str) -> shortlist_vector_store::Result<Vec<f32>> {
            self.vectors.get(text).cloned().ok_or_else(|| {
                VectorStoreError::EmbeddingError(format!("no canned vector for '{text}'"))
            })
        }
    }

    fn pair(query: &str, reference: &str) -> TrainingPair {
        TrainingPair {
            query: query.to_string(),
            reference: reference.to_string(),
        }
    }

    async fn hash_retriever(pairs: Vec<TrainingPair>) -> HybridRetriever {
        let embedder = Arc::new(HashEmbedder::new(32).unwrap());
        HybridRetriever::build(
            embedder,
            default_vocabulary(),
            RetrieverConfig::default(),
            pairs,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn output_length_is_min_of_top_k_and_corpus() {
        let retriever = hash_retriever(vec![
            pair("java developer", "https://catalog/a"),
            pair("python analyst", "https://catalog/b"),
            pair("devops engineer", "https://catalog/c"),
        ])
        .await;

        assert_eq!(retriever.retrieve("engineer", 2, true).await.unwrap().len(), 2);
        assert_eq!(retriever.retrieve("engineer", 10, true).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn results_contain_no_duplicate_references() {
        // Two pairs share a reference; the contract still forbids duplicates
        // in the output.
        let retriever = hash_retriever(vec![
            pair("java developer", "https://catalog/dup"),
            pair("senior java engineer", "https://catalog/dup"),
            pair("python analyst", "https://catalog/b"),
        ])
        .await;

        let results = retriever.retrieve("java", 10, true).await.unwrap();
        let references: HashSet<&str> =
            results.iter().map(|r| r.item.reference.as_str()).collect();
        assert_eq!(references.len(), results.len());
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn empty_corpus_retrieves_to_empty() {
        let retriever = hash_retriever(Vec::new()).await;
        let results = retriever.retrieve("anything", 5, true).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn disabled_boost_reports_zero_keyword_and_semantic_final() {
        let retriever = hash_retriever(vec![
            pair("senior java developer", "https://catalog/a"),
            pair("junior python developer", "https://catalog/b"),
        ])
        .await;

        let results = retriever
            .retrieve("senior java developer", 2, false)
            .await
            .unwrap();
        for result in &results {
            assert_eq!(result.keyword_score, 0.0);
            assert_eq!(result.final_score, result.semantic_score);
        }
    }

    #[tokio::test]
    async fn keyword_boost_rescues_tagged_item() {
        // Item "plain" is semantically closer; "tagged" wins once its exact
        // tag overlap is fused in.
        let embedder = Arc::new(FixedEmbedder::new(
            2,
            &[("Senior Java developer", vec![0.0, 0.0])],
        ));
        let items = vec![
            (
                vec![1.0, 0.0],
                CatalogItem {
                    id: "item-000000".to_string(),
                    reference: "plain".to_string(),
                    tags: BTreeSet::new(),
                },
            ),
            (
                vec![1.01, 0.0],
                CatalogItem {
                    id: "item-000001".to_string(),
                    reference: "tagged".to_string(),
                    tags: ["java", "senior"].iter().map(|s| s.to_string()).collect(),
                },
            ),
        ];
        let index = VectorIndex::build(2, items).unwrap();
        let retriever = HybridRetriever::from_index(
            embedder,
            default_vocabulary(),
            RetrieverConfig::default(),
            index,
        )
        .unwrap();

        let boosted = retriever
            .retrieve("Senior Java developer", 2, true)
            .await
            .unwrap();
        assert_eq!(boosted[0].item.reference, "tagged");
        assert_eq!(boosted[0].keyword_score, 1.0);

        let unboosted = retriever
            .retrieve("Senior Java developer", 2, false)
            .await
            .unwrap();
        assert_eq!(unboosted[0].item.reference, "plain");
    }

    #[tokio::test]
    async fn invalid_weights_are_rejected_before_any_embedding() {
        let embedder = Arc::new(FixedEmbedder::new(2, &[]));
        let index = VectorIndex::build(2, Vec::new()).unwrap();
        let config = RetrieverConfig {
            semantic_weight: 0.8,
            keyword_weight: 0.3,
            ..RetrieverConfig::default()
        };
        let err =
            HybridRetriever::from_index(embedder, default_vocabulary(), config, index).unwrap_err();
        assert!(matches!(err, RetrievalError::Config(_)));
    }

    #[tokio::test]
    async fn out_of_bounds_top_k_is_rejected() {
        let retriever = hash_retriever(vec![pair("java", "a")]).await;
        assert!(retriever.retrieve("java", 0, true).await.is_err());
        assert!(retriever.retrieve("java", 101, true).await.is_err());
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let embedder = Arc::new(FixedEmbedder::new(2, &[("known", vec![0.0, 0.0])]));
        let index = VectorIndex::build(2, Vec::new()).unwrap();
        let retriever = HybridRetriever::from_index(
            embedder,
            default_vocabulary(),
            RetrieverConfig::default(),
            index,
        )
        .unwrap();

        let err = retriever.retrieve("unknown", 3, true).await.unwrap_err();
        assert!(matches!(err, RetrievalError::VectorStore(_)));
    }

    #[tokio::test]
    async fn mismatched_index_dimension_is_rejected() {
        let embedder = Arc::new(FixedEmbedder::new(3, &[]));
        let index = VectorIndex::build(2, Vec::new()).unwrap();
        let err = HybridRetriever::from_index(
            embedder,
            default_vocabulary(),
            RetrieverConfig::default(),
            index,
        )
        .unwrap_err();
        assert!(matches!(err, RetrievalError::Config(_)));
    }
}
