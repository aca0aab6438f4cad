//! Pipeline boundary
//!
//! [`Pipeline`] is the narrow interface through which the runner talks to
//! whatever moves the bytes: it submits a [`SourceDescriptor`] plus a table
//! name and gets back a [`LoadOutcome`]. Staging files, schema handling,
//! retries, and load bookkeeping all live behind this trait.
//!
//! A pipeline instance is a session bound to one destination and one
//! dataset namespace. Acquisition is the concrete type's concern (see
//! [`FilesystemPipeline::acquire`](crate::filesystem::FilesystemPipeline::acquire));
//! release must happen on every exit path, which concrete types implement
//! via `Drop`.

use crate::error::Result;
use crate::source::SourceDescriptor;
use crate::spec::WriteDisposition;
use async_trait::async_trait;

/// What one load attempt produced.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Rows written to the destination, when the destination reports it.
    pub rows_loaded: Option<u64>,
    /// Identifiers of the load jobs that ran, for traceability.
    pub load_ids: Vec<String>,
}

/// A session bound to one destination and dataset namespace.
///
/// `load` blocks (in the async sense) until the movement finishes or fails;
/// the runner awaits each call to completion before the next table, so a
/// pipeline sees no concurrent loads.
#[async_trait]
pub trait Pipeline: Send {
    /// Dataset namespace this session writes into.
    fn dataset(&self) -> &str;

    /// Move one table's data. Errors surface as
    /// [`IngestError::Load`](crate::error::IngestError::Load) or
    /// [`IngestError::SourceConstruction`](crate::error::IngestError::SourceConstruction)
    /// and are recorded per table by the runner.
    async fn load(
        &mut self,
        source: &SourceDescriptor,
        table: &str,
        disposition: WriteDisposition,
    ) -> Result<LoadOutcome>;
}
