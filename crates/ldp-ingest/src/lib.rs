//! LDP Ingest Library
//!
//! Configuration-driven batch ingestion of delimited flat files into an
//! analytical dataset. A run walks a registry of [`TableSpec`]s in
//! registration order, builds a source descriptor per table, submits it to
//! a [`Pipeline`] session, and records one [`RunResult`] per table. A
//! failed table is recorded and the batch continues.
//!
//! # Example
//!
//! ```no_run
//! use ldp_ingest::filesystem::{FilesystemConfig, FilesystemPipeline};
//! use ldp_ingest::report::report;
//! use ldp_ingest::runner::{RunConfig, Runner};
//! use ldp_ingest::tpch;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = tpch::registry()?;
//!     let mut pipeline = FilesystemPipeline::acquire(FilesystemConfig::default())?;
//!     let results = Runner::new(RunConfig::default())
//!         .run(&registry, &mut pipeline)
//!         .await;
//!     println!("{}", report(&results));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod filesystem;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod source;
pub mod spec;
pub mod tpch;

// Re-export commonly used types
pub use error::{FailureKind, IngestError, Result};
pub use pipeline::{LoadOutcome, Pipeline};
pub use runner::{RunConfig, RunResult, Runner};
pub use source::{build_source, SourceDescriptor};
pub use spec::{BatchHints, SpecRegistry, TableSpec, WriteDisposition};
