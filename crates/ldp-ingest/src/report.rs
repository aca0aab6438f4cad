//! Run reporting
//!
//! Pure formatting over the ordered result sequence the runner produced.
//! Nothing here does I/O; the caller decides whether the summary text gets
//! printed, logged, or dropped.

use crate::runner::RunResult;
use std::fmt::Write;
use std::time::Duration;

/// Aggregate counts for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration: Duration,
}

impl RunSummary {
    pub fn from_results(results: &[RunResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        Self {
            attempted: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            total_duration: results.iter().map(|r| r.duration).sum(),
        }
    }

    /// Overall-success flag: true only when no table failed.
    ///
    /// The process exit code does not reflect per-table failures, so this
    /// flag in the summary is how callers detect partial failure.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Render the run summary as text, one line per table plus a totals line.
pub fn report(results: &[RunResult]) -> String {
    let summary = RunSummary::from_results(results);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "run summary: {} attempted, {} succeeded, {} failed in {:.2}s",
        summary.attempted,
        summary.succeeded,
        summary.failed,
        summary.total_duration.as_secs_f64()
    );

    for result in results {
        match &result.failure {
            None => {
                let _ = write!(
                    out,
                    "  ok    {:<20} {:>8.2}s",
                    result.table,
                    result.duration.as_secs_f64()
                );
                if let Some(rows) = result.rows_loaded {
                    let _ = write!(out, "  {} rows", rows);
                    if let Some(rate) = result.rows_per_second() {
                        let _ = write!(out, " ({:.0} rows/s)", rate);
                    }
                }
                let _ = writeln!(out);
            },
            Some(failure) => {
                let _ = writeln!(
                    out,
                    "  FAIL  {:<20} {:>8.2}s  [{}] {}",
                    result.table,
                    result.duration.as_secs_f64(),
                    failure.kind,
                    failure.message
                );
            },
        }
    }

    out
}
