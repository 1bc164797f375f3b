use crate::commands::print_stdout;
use crate::commands::search::load_retriever;
use crate::dataset;
use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use serde::Serialize;
use shortlist_eval::{CatalogRelevance, LabeledRelevance, RecallEvaluator, RelevanceProvider};
use std::path::PathBuf;

#[derive(Args)]
pub struct EvalArgs {
    /// Index snapshot to evaluate against
    #[arg(long, default_value = "shortlist-index.json")]
    index: PathBuf,

    /// Evaluation query set (JSON: { schema_version, queries: [...] })
    #[arg(long)]
    queries: PathBuf,

    /// Explicit relevance labels; without this the whole catalog counts as
    /// relevant for every query
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Recall window size
    #[arg(long, default_value_t = 10)]
    k: usize,

    /// Where to write the full report
    #[arg(long, default_value = "recall-report.json")]
    out: PathBuf,

    /// Disable keyword boosting during evaluation
    #[arg(long)]
    no_keyword_boost: bool,

    /// Retriever profile (JSON or TOML) overriding the default weights
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvalSummary {
    k: usize,
    mean_recall: f64,
    median_recall: f64,
    min_recall: f64,
    max_recall: f64,
    evaluated_queries: usize,
    excluded_queries: usize,
    report: String,
}

pub async fn run_eval(args: EvalArgs) -> Result<()> {
    let retriever = load_retriever(&args.index, args.profile.as_deref()).await?;
    let queries = dataset::load_queries(&args.queries).await?;

    let relevance: Box<dyn RelevanceProvider> = match &args.labels {
        Some(path) => {
            let labels = dataset::load_labels(path).await?;
            Box::new(LabeledRelevance::new(labels))
        }
        None => Box::new(CatalogRelevance::from_index(retriever.index())),
    };

    let boost = !args.no_keyword_boost && retriever.config().use_keyword_boost;
    let report = RecallEvaluator::new(args.k)
        .with_keyword_boost(boost)
        .evaluate(&retriever, &queries, relevance.as_ref())
        .await
        .context("Evaluation run failed")?;

    report
        .save(&args.out)
        .await
        .with_context(|| format!("Failed to write report to {}", args.out.display()))?;

    let summary = EvalSummary {
        k: report.k,
        mean_recall: report.mean_recall,
        median_recall: report.median_recall,
        min_recall: report.min_recall,
        max_recall: report.max_recall,
        evaluated_queries: report.evaluated_queries,
        excluded_queries: report.excluded_queries,
        report: args.out.display().to_string(),
    };
    print_stdout(&serde_json::to_string_pretty(&summary)?)
}
