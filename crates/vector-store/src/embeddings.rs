use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use std::env;
use std::sync::Arc;

/// Default vector width; matches the 384-wide sentence encoders this index
/// is usually paired with.
pub const DEFAULT_DIMENSION: usize = 384;

/// Opaque text-to-vector service.
///
/// The engine never inspects vector contents. It requires a dimension that
/// stays fixed for the lifetime of the provider and order-preserving batches
/// (one output vector per input text). Failures are surfaced to the caller
/// unchanged; no retry happens at this layer.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Vector width, fixed for the lifetime of the provider.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Order-preserving batch encode. Providers with a real batch path should
    /// override this; the default loops one call per text, which is correct
    /// but slower.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Deterministic embedding backend seeded from an FNV-1a hash of the text.
///
/// Stands in for a real sentence encoder when none is wired up: the same
/// text always maps to the same unit-norm vector at any dimension. Carries
/// no semantics, so ranking quality with it is meaningless — its job is
/// reproducible tests and offline index plumbing.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::EmbeddingError(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        hash_embed(text, self.dimension)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.encode(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }
}

/// Resolve the embedding backend from `SHORTLIST_EMBEDDING_MODE`.
///
/// Only the deterministic `hash` backend ships in-process; a real encoder is
/// expected to live behind the caller's own `EmbeddingProvider` impl. Unknown
/// modes are rejected rather than silently falling back.
pub fn provider_from_env(dimension: usize) -> Result<Arc<dyn EmbeddingProvider>> {
    let raw = env::var("SHORTLIST_EMBEDDING_MODE")
        .unwrap_or_else(|_| "hash".to_string())
        .to_ascii_lowercase();
    match raw.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(dimension)?)),
        other => Err(VectorStoreError::EmbeddingError(format!(
            "Unsupported SHORTLIST_EMBEDDING_MODE '{other}' (expected 'hash')"
        ))),
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state = fnv1a_64(text.as_bytes()).wrapping_add(dimension as u64);
    let mut vec: Vec<f32> = (0..dimension)
        .map(|_| {
            let bits = splitmix64(&mut state);
            // Top 24 bits give a uniform value in [0, 1); center it.
            let unit = (bits >> 40) as f32 / (1u64 << 24) as f32;
            unit * 2.0 - 1.0
        })
        .collect();
    normalize(&mut vec);
    vec
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}
