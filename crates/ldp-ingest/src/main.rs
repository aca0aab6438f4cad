//! LDP Ingest - batch flat-file ingestion runner

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ldp_common::env;
use ldp_common::logging::{init_logging, LogConfig, LogLevel};
use ldp_ingest::filesystem::{FilesystemConfig, FilesystemPipeline};
use ldp_ingest::report::{report, RunSummary};
use ldp_ingest::runner::{RunConfig, Runner};
use ldp_ingest::tpch;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ldp-ingest")]
#[command(author, version, about = "Batch flat-file ingestion runner")]
struct Cli {
    /// Source root directory that table globs resolve against
    #[arg(long)]
    source: Option<PathBuf>,

    /// Destination root directory holding dataset namespaces
    #[arg(long)]
    destination: Option<PathBuf>,

    /// Dataset namespace to load into
    #[arg(long)]
    dataset: Option<String>,

    /// Load only the named tables (repeatable, registration order kept)
    #[arg(long = "only")]
    only: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn run_progress(tables: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(tables);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag-derived config.
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("ldp-ingest".to_string())
        .build()
        .merged_with_env()?;

    init_logging(&log_config)?;

    // Destination parameters come from flags, then environment, then defaults.
    let source_root = cli
        .source
        .unwrap_or_else(|| PathBuf::from(env::string_or("LDP_SOURCE_DIR", ".")));
    let destination_root = cli
        .destination
        .unwrap_or_else(|| PathBuf::from(env::string_or("LDP_DESTINATION_DIR", "./data/bronze")));
    let dataset = cli
        .dataset
        .unwrap_or_else(|| env::string_or("LDP_DATASET", "tpch_data"));
    let buffer_max_items: usize = env::parse_or("LDP_BUFFER_MAX_ITEMS", 5_000)?;

    let full_registry = tpch::registry()?;
    let registry = if cli.only.is_empty() {
        full_registry
    } else {
        full_registry.filtered(&cli.only)
    };
    anyhow::ensure!(!registry.is_empty(), "no tables selected");

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        %dataset,
        destination = %destination_root.display(),
        tables = registry.len(),
        "ldp-ingest starting"
    );

    // A handle-acquisition failure is the one fatal error: it propagates
    // and the process exits non-zero before any table is attempted.
    let mut pipeline = FilesystemPipeline::acquire(FilesystemConfig {
        source_root,
        destination_root,
        dataset,
        buffer_max_items,
    })
    .context("failed to acquire pipeline handle")?;

    let progress = run_progress(registry.len() as u64, !cli.no_progress);
    let runner = Runner::new(RunConfig {
        verbose: cli.verbose,
        progress: Some(progress.clone()),
    });

    let results = runner.run(&registry, &mut pipeline).await;
    progress.finish_and_clear();

    let summary_text = report(&results);
    println!("{}", summary_text);

    let summary = RunSummary::from_results(&results);
    info!(
        %run_id,
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        all_succeeded = summary.all_succeeded(),
        "ldp-ingest finished"
    );

    // Partial per-table failures still exit 0; callers inspect the summary.
    Ok(())
}
