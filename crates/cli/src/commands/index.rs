use crate::commands::print_stdout;
use crate::dataset;
use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use serde::Serialize;
use shortlist_retrieval::{default_vocabulary, HybridRetriever, RetrieverConfig};
use shortlist_vector_store::{provider_from_env, DEFAULT_DIMENSION};
use std::path::PathBuf;

#[derive(Args)]
pub struct IndexArgs {
    /// Training-pair dataset (JSON: { schema_version, pairs: [{query, reference}] })
    #[arg(long)]
    pairs: PathBuf,

    /// Where to write the index snapshot
    #[arg(long, default_value = "shortlist-index.json")]
    out: PathBuf,

    /// Embedding dimension for the in-process backend
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,
}

#[derive(Serialize)]
struct IndexSummary {
    dataset: Option<String>,
    indexed: usize,
    dimension: usize,
    out: String,
}

pub async fn run_index(args: IndexArgs) -> Result<()> {
    let dataset = dataset::load_pairs(&args.pairs).await?;
    let embedder = provider_from_env(args.dimension)
        .context("Failed to resolve embedding backend")?;

    let retriever = HybridRetriever::build(
        embedder,
        default_vocabulary(),
        RetrieverConfig::default(),
        dataset.pairs,
    )
    .await
    .context("Failed to build catalog index")?;

    retriever
        .index()
        .save(&args.out)
        .await
        .with_context(|| format!("Failed to save index to {}", args.out.display()))?;

    let summary = IndexSummary {
        dataset: dataset.name,
        indexed: retriever.index().len(),
        dimension: retriever.index().dimension(),
        out: args.out.display().to_string(),
    };
    print_stdout(&serde_json::to_string_pretty(&summary)?)
}
