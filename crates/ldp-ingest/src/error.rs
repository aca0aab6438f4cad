//! Error types for ingestion runs
//!
//! The taxonomy separates errors that are local to one table (recorded in
//! its [`RunResult`](crate::runner::RunResult) while the batch continues)
//! from errors that make the whole run impossible (handle acquisition).

use serde::Serialize;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Main error type for ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// A table name was registered twice. Registration never overwrites.
    #[error("table '{0}' is already registered")]
    DuplicateTable(String),

    /// A TableSpec failed validation before any I/O was attempted.
    #[error("invalid spec for table '{table}': {field}: {reason}")]
    InvalidSpec {
        table: String,
        field: &'static str,
        reason: String,
    },

    /// The pipeline rejected a source descriptor before touching storage.
    #[error("source construction failed for table '{table}': {reason}")]
    SourceConstruction { table: String, reason: String },

    /// Data movement failed (storage, parse, or destination rejection).
    /// May be transient; the runner records it and moves on, it does not retry.
    #[error("load failed for table '{table}': {reason}")]
    Load { table: String, reason: String },

    /// The destination session could not be established. Fatal: no table
    /// can proceed without a handle, so this aborts the run.
    #[error("cannot acquire pipeline handle: {0}")]
    HandleAcquisition(String),
}

impl IngestError {
    /// Whether this error aborts the whole run rather than one table.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::HandleAcquisition(_))
    }

    /// Kind tag used when the error is recorded in a failed RunResult.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            IngestError::InvalidSpec { .. } | IngestError::DuplicateTable(_) => {
                FailureKind::InvalidSpec
            },
            IngestError::SourceConstruction { .. } => FailureKind::SourceConstruction,
            IngestError::Load { .. } => FailureKind::Load,
            // Acquisition failures abort a run before any result exists, so
            // this arm is only reached if a pipeline misreports one from a
            // load call. Recording it as a failed load keeps it visible in
            // the summary instead of panicking on a contract violation.
            IngestError::HandleAcquisition(_) => FailureKind::Load,
        }
    }
}

/// Error-kind tag carried by failed run results.
///
/// The runner decides continue-vs-abort from the error variant itself; the
/// tag exists so reports and downstream consumers can distinguish a bad
/// configuration from a failed data movement without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidSpec,
    SourceConstruction,
    Load,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::InvalidSpec => "invalid_spec",
            FailureKind::SourceConstruction => "source_construction",
            FailureKind::Load => "load",
        };
        write!(f, "{}", s)
    }
}
