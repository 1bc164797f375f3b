use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.7;
pub const DEFAULT_KEYWORD_WEIGHT: f32 = 0.3;
pub const DEFAULT_MAX_TOP_K: usize = 100;

/// Weights must sum to 1 within this tolerance; anything further off is a
/// configuration error, never silently renormalized.
const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

/// Fusion weights and retrieval bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Weight on the semantic (distance-derived) score.
    pub semantic_weight: f32,
    /// Weight on the keyword (Jaccard) score.
    pub keyword_weight: f32,
    /// Upper bound accepted for a `top_k` argument.
    pub max_top_k: usize,
    /// Default for keyword boosting when the caller does not specify.
    pub use_keyword_boost: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
            max_top_k: DEFAULT_MAX_TOP_K,
            use_keyword_boost: true,
        }
    }
}

impl RetrieverConfig {
    /// Reject invalid weight pairs and bounds before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if !self.semantic_weight.is_finite()
            || !self.keyword_weight.is_finite()
            || self.semantic_weight < 0.0
            || self.keyword_weight < 0.0
        {
            return Err(RetrievalError::Config(format!(
                "fusion weights must be finite and non-negative, got semantic={} keyword={}",
                self.semantic_weight, self.keyword_weight
            )));
        }
        let sum = self.semantic_weight + self.keyword_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RetrievalError::Config(format!(
                "fusion weights must sum to 1.0, got {sum}"
            )));
        }
        if self.max_top_k == 0 {
            return Err(RetrievalError::Config(
                "max_top_k must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a profile document, trying JSON first and TOML second, and
    /// validate the result. Profiles are shipped next to an index and carry
    /// only the fields they override.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self = match serde_json::from_slice(bytes) {
            Ok(config) => config,
            Err(json_err) => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    RetrievalError::Config(
                        "profile is neither valid JSON nor UTF-8 TOML".to_string(),
                    )
                })?;
                toml::from_str(text).map_err(|toml_err| {
                    RetrievalError::Config(format!(
                        "profile is not valid JSON ({json_err}) or TOML ({toml_err})"
                    ))
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }
}
