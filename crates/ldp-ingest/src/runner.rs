//! Run orchestration
//!
//! The runner walks the registry in registration order, builds a source
//! descriptor per table, submits it to the pipeline, and records one
//! [`RunResult`] per table. One table's failure never aborts the batch;
//! whatever happens, callers get the full ordered result sequence back.
//!
//! The runner itself is strictly sequential. Parallel-reader and batching
//! hints ride along inside the descriptor for the pipeline to interpret.

use crate::error::{FailureKind, IngestError};
use crate::pipeline::Pipeline;
use crate::source::build_source;
use crate::spec::SpecRegistry;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Why a table's load attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<IngestError> for Failure {
    fn from(err: IngestError) -> Self {
        Failure {
            kind: err.failure_kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome record for one table's load attempt.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Logical table name.
    pub table: String,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time around the build + load.
    pub duration: Duration,
    /// Rows written, when the pipeline reports them.
    pub rows_loaded: Option<u64>,
    /// Present only on failure.
    pub failure: Option<Failure>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Rows per second, when both rows and a non-zero duration are known.
    pub fn rows_per_second(&self) -> Option<f64> {
        let rows = self.rows_loaded?;
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            Some(rows as f64 / secs)
        } else {
            None
        }
    }
}

/// Orchestrator options. No process-wide state: everything the runner
/// needs arrives through this struct.
#[derive(Default)]
pub struct RunConfig {
    /// Emit per-table configuration detail at info level.
    pub verbose: bool,
    /// Progress bar advanced once per attempted table.
    pub progress: Option<ProgressBar>,
}

/// Sequential batch runner over a [`SpecRegistry`].
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Attempt every registered table against the pipeline, in order.
    ///
    /// Returns exactly one [`RunResult`] per spec. Per-table errors are
    /// recorded and never re-raised; there is nothing this method can fail
    /// with once the pipeline handle exists.
    pub async fn run(&self, registry: &SpecRegistry, pipeline: &mut dyn Pipeline) -> Vec<RunResult> {
        info!(
            dataset = pipeline.dataset(),
            tables = registry.len(),
            "starting ingestion run"
        );

        let mut results = Vec::with_capacity(registry.len());

        for spec in registry.all() {
            if let Some(ref pb) = self.config.progress {
                pb.set_message(spec.name.clone());
            }

            info!(
                table = %spec.name,
                glob = %spec.file_glob,
                disposition = %spec.write_disposition,
                "processing table"
            );
            if self.config.verbose {
                if let Some(ref description) = spec.description {
                    info!(table = %spec.name, %description, "table description");
                }
                if !spec.batch.is_empty() {
                    info!(
                        table = %spec.name,
                        batch_size = ?spec.batch.batch_size,
                        chunk_size = ?spec.batch.chunk_size,
                        parallel_readers = ?spec.batch.parallel_readers,
                        "batch configuration"
                    );
                }
            }

            let started_at = Utc::now();
            let start = Instant::now();

            let attempt = match build_source(spec) {
                Ok(source) => {
                    pipeline
                        .load(&source, &spec.name, spec.write_disposition)
                        .await
                },
                Err(e) => Err(e),
            };
            let duration = start.elapsed();

            let result = match attempt {
                Ok(outcome) => {
                    info!(
                        table = %spec.name,
                        rows = ?outcome.rows_loaded,
                        load_ids = outcome.load_ids.len(),
                        elapsed_secs = duration.as_secs_f64(),
                        "table completed"
                    );
                    RunResult {
                        table: spec.name.clone(),
                        started_at,
                        duration,
                        rows_loaded: outcome.rows_loaded,
                        failure: None,
                    }
                },
                Err(e) => {
                    error!(
                        table = %spec.name,
                        kind = %e.failure_kind(),
                        error = %e,
                        "table failed, continuing with remaining tables"
                    );
                    RunResult {
                        table: spec.name.clone(),
                        started_at,
                        duration,
                        rows_loaded: None,
                        failure: Some(e.into()),
                    }
                },
            };
            results.push(result);

            if let Some(ref pb) = self.config.progress {
                pb.inc(1);
            }
        }

        let failed = results.iter().filter(|r| !r.succeeded()).count();
        info!(
            attempted = results.len(),
            succeeded = results.len() - failed,
            failed,
            "ingestion run finished"
        );

        results
    }
}
