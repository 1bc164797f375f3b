use crate::commands::print_stdout;
use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use serde::Serialize;
use shortlist_retrieval::{default_vocabulary, HybridRetriever, RetrieverConfig, ScoredResult};
use shortlist_vector_store::{provider_from_env, VectorIndex};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct SearchArgs {
    /// Index snapshot to load
    #[arg(long, default_value = "shortlist-index.json")]
    index: PathBuf,

    /// Free-text query
    #[arg(long)]
    query: String,

    /// Number of results to return
    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// Disable keyword boosting (rank on semantic distance alone)
    #[arg(long)]
    no_keyword_boost: bool,

    /// Retriever profile (JSON or TOML) overriding the default weights
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    results: Vec<ScoredResult>,
}

pub async fn load_config(profile: Option<&Path>) -> Result<RetrieverConfig> {
    match profile {
        None => Ok(RetrieverConfig::default()),
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read profile {}", path.display()))?;
            RetrieverConfig::from_bytes(&bytes)
                .with_context(|| format!("Failed to parse profile {}", path.display()))
        }
    }
}

pub async fn load_retriever(
    index_path: &Path,
    profile: Option<&Path>,
) -> Result<HybridRetriever> {
    let index = VectorIndex::load(index_path)
        .await
        .with_context(|| format!("Failed to load index {}", index_path.display()))?;
    let embedder = provider_from_env(index.dimension())
        .context("Failed to resolve embedding backend")?;
    let config = load_config(profile).await?;
    HybridRetriever::from_index(embedder, default_vocabulary(), config, index)
        .context("Failed to initialize retriever")
}

pub async fn run_search(args: SearchArgs) -> Result<()> {
    let retriever = load_retriever(&args.index, args.profile.as_deref()).await?;
    // The flag always wins; otherwise the profile decides.
    let boost = !args.no_keyword_boost && retriever.config().use_keyword_boost;
    let results = retriever
        .retrieve(&args.query, args.top_k, boost)
        .await
        .with_context(|| format!("Retrieval failed for query '{}'", args.query))?;

    let output = SearchOutput {
        query: args.query,
        results,
    };
    print_stdout(&serde_json::to_string_pretty(&output)?)
}
