//! Table specifications and the run registry
//!
//! A [`TableSpec`] is the declarative description of one source-to-destination
//! table load: where the flat files live, how they are delimited, and what the
//! columns are called (the TPC-H `.tbl` files carry no header row). Specs are
//! built once at configuration time and are immutable afterwards.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How loaded rows interact with existing destination data.
///
/// Always explicit on the spec; the runner never assumes a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteDisposition {
    /// Add rows to whatever the destination table already holds.
    Append,
    /// Drop existing rows and load fresh.
    Replace,
}

impl std::fmt::Display for WriteDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteDisposition::Append => write!(f, "append"),
            WriteDisposition::Replace => write!(f, "replace"),
        }
    }
}

/// Optional batching configuration, passed through to the pipeline untouched.
///
/// Whether a given destination honors these is up to the pipeline
/// implementation; the runner itself never parallelizes or chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHints {
    /// Rows per destination batch.
    pub batch_size: Option<usize>,
    /// Rows read per source chunk.
    pub chunk_size: Option<usize>,
    /// Concurrent source readers the pipeline may use.
    pub parallel_readers: Option<usize>,
}

impl BatchHints {
    pub fn is_empty(&self) -> bool {
        *self == BatchHints::default()
    }
}

/// Declarative description of one table load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    /// Logical destination table name, unique within a run.
    pub name: String,

    /// Glob pattern selecting source files, relative to the source root.
    pub file_glob: String,

    /// Field delimiter. TPC-H uses '|'.
    pub delimiter: char,

    /// Ordered column names, used as the header for headerless files.
    pub columns: Vec<String>,

    /// Human-readable description, carried for logging only.
    pub description: Option<String>,

    /// Batching configuration forwarded to the pipeline.
    #[serde(default)]
    pub batch: BatchHints,

    /// Append vs replace at the destination.
    pub write_disposition: WriteDisposition,
}

impl TableSpec {
    pub fn new(
        name: impl Into<String>,
        file_glob: impl Into<String>,
        delimiter: char,
        columns: Vec<String>,
        write_disposition: WriteDisposition,
    ) -> Self {
        Self {
            name: name.into(),
            file_glob: file_glob.into(),
            delimiter,
            columns,
            description: None,
            batch: BatchHints::default(),
            write_disposition,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_batch_hints(mut self, batch: BatchHints) -> Self {
        self.batch = batch;
        self
    }
}

/// Ordered collection of table specs for one run.
///
/// Iteration order is registration order, so runs and their logs are
/// reproducible.
#[derive(Debug, Default)]
pub struct SpecRegistry {
    specs: Vec<TableSpec>,
    names: HashSet<String>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec. Fails with [`IngestError::DuplicateTable`] if the
    /// name is taken; an existing spec is never overwritten.
    pub fn register(&mut self, spec: TableSpec) -> Result<()> {
        if !self.names.insert(spec.name.clone()) {
            return Err(IngestError::DuplicateTable(spec.name));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// All specs, in registration order.
    pub fn all(&self) -> &[TableSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TableSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// A new registry containing only the named tables, original order kept.
    /// Names that match nothing are ignored.
    pub fn filtered(&self, names: &[String]) -> SpecRegistry {
        let mut out = SpecRegistry::new();
        for spec in &self.specs {
            if names.iter().any(|n| *n == spec.name) {
                // Names are unique here by construction.
                let _ = out.register(spec.clone());
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spec(name: &str) -> TableSpec {
        TableSpec::new(
            name,
            format!("h/1/{}*.tbl", name),
            '|',
            vec!["a".to_string(), "b".to_string()],
            WriteDisposition::Replace,
        )
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = SpecRegistry::new();
        registry.register(spec("region")).unwrap();
        registry.register(spec("nation")).unwrap();
        registry.register(spec("customer")).unwrap();

        let names: Vec<&str> = registry.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["region", "nation", "customer"]);
    }

    #[test]
    fn test_duplicate_name_is_rejected_without_overwrite() {
        let mut registry = SpecRegistry::new();
        registry
            .register(spec("region").with_description("first"))
            .unwrap();

        let err = registry
            .register(spec("region").with_description("second"))
            .unwrap_err();
        assert!(matches!(err, IngestError::DuplicateTable(name) if name == "region"));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("region").unwrap().description.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_filtered_keeps_order() {
        let mut registry = SpecRegistry::new();
        registry.register(spec("region")).unwrap();
        registry.register(spec("nation")).unwrap();
        registry.register(spec("customer")).unwrap();

        let filtered =
            registry.filtered(&["customer".to_string(), "region".to_string()]);
        let names: Vec<&str> = filtered.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["region", "customer"]);
    }

    #[test]
    fn test_batch_hints_default_is_empty() {
        assert!(BatchHints::default().is_empty());
        let hints = BatchHints {
            batch_size: Some(10_000),
            ..Default::default()
        };
        assert!(!hints.is_empty());
    }
}
