use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod dataset;

use commands::{run_eval, run_index, run_search, EvalArgs, IndexArgs, SearchArgs};

#[derive(Parser)]
#[command(name = "shortlist")]
#[command(about = "Hybrid semantic + keyword retrieval over a text-labeled catalog", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog index from a training-pair dataset
    Index(IndexArgs),
    /// Retrieve the top-k catalog items for a free-text query
    Search(SearchArgs),
    /// Evaluate retrieval quality with Recall@K over a query set
    Eval(EvalArgs),
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Index(args) => run_index(args).await,
        Commands::Search(args) => run_search(args).await,
        Commands::Eval(args) => run_eval(args).await,
    }
}
