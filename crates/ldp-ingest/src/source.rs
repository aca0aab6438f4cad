//! Source descriptor construction
//!
//! [`build_source`] turns a validated [`TableSpec`] into the descriptor a
//! pipeline consumes. Validation is purely local; no storage is touched
//! here. Whether the glob actually matches files is only observable when
//! the pipeline loads, and surfaces there as a per-table load failure.

use crate::error::{IngestError, Result};
use crate::spec::TableSpec;
use serde::Serialize;

/// Description of where to read bytes and how to parse rows.
///
/// Opaque to the runner: it is produced here and handed unmodified to
/// [`Pipeline::load`](crate::pipeline::Pipeline::load).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDescriptor {
    /// Glob selecting the source files.
    pub file_glob: String,
    /// Single-byte field delimiter.
    pub delimiter: u8,
    /// Header substitute for headerless files, in field order.
    pub columns: Vec<String>,
    /// Rows per read chunk, if the spec asked for chunked reads.
    pub chunk_size: Option<usize>,
    /// Reader parallelism hint, forwarded as-is.
    pub parallel_readers: Option<usize>,
}

/// Validate a spec and produce its source descriptor. No I/O.
pub fn build_source(spec: &TableSpec) -> Result<SourceDescriptor> {
    let invalid = |field: &'static str, reason: String| IngestError::InvalidSpec {
        table: spec.name.clone(),
        field,
        reason,
    };

    if spec.name.trim().is_empty() {
        return Err(invalid("name", "table name is empty".to_string()));
    }
    // Table names become destination identifiers (file names, table names),
    // so they must never carry path separators or other special characters.
    if !spec
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(invalid(
            "name",
            format!(
                "'{}' is not a valid table name (allowed: letters, digits, underscore)",
                spec.name
            ),
        ));
    }

    if spec.file_glob.trim().is_empty() {
        return Err(invalid("file_glob", "glob pattern is empty".to_string()));
    }
    glob::Pattern::new(&spec.file_glob)
        .map_err(|e| invalid("file_glob", format!("malformed glob pattern: {}", e)))?;

    // The CSV reader takes a single-byte delimiter.
    if !spec.delimiter.is_ascii() {
        return Err(invalid(
            "delimiter",
            format!("'{}' is not a single-byte character", spec.delimiter),
        ));
    }

    if spec.columns.is_empty() {
        return Err(invalid("columns", "column list is empty".to_string()));
    }
    if let Some(blank) = spec.columns.iter().position(|c| c.trim().is_empty()) {
        return Err(invalid(
            "columns",
            format!("column {} has an empty name", blank),
        ));
    }

    Ok(SourceDescriptor {
        file_glob: spec.file_glob.clone(),
        delimiter: spec.delimiter as u8,
        columns: spec.columns.clone(),
        chunk_size: spec.batch.chunk_size,
        parallel_readers: spec.batch.parallel_readers,
    })
}
