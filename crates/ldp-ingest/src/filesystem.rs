//! Filesystem destination pipeline
//!
//! Reads delimited flat files matched by a glob under a source root and
//! writes them as JSON-lines tables under `<destination_root>/<dataset>/`.
//! One file per logical table, one JSON object per row, column names taken
//! from the source descriptor.
//!
//! The session holds a lock file inside the dataset directory for its
//! lifetime, so two runs cannot write the same dataset at once. The lock is
//! released on drop, on every exit path.

use crate::error::{IngestError, Result};
use crate::pipeline::{LoadOutcome, Pipeline};
use crate::source::SourceDescriptor;
use crate::spec::WriteDisposition;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

const LOCK_FILE: &str = ".ldp.lock";

/// Configuration for a filesystem destination session.
#[derive(Debug, Clone)]
pub struct FilesystemConfig {
    /// Directory that source glob patterns are resolved against.
    pub source_root: PathBuf,

    /// Directory holding dataset namespaces.
    pub destination_root: PathBuf,

    /// Dataset namespace (a subdirectory of the destination root).
    pub dataset: String,

    /// Rows buffered between explicit flushes when a spec carries no
    /// chunk-size hint.
    pub buffer_max_items: usize,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            destination_root: PathBuf::from("./data/bronze"),
            dataset: "tpch_data".to_string(),
            buffer_max_items: 5_000,
        }
    }
}

/// A live session against a filesystem dataset directory.
#[derive(Debug)]
pub struct FilesystemPipeline {
    config: FilesystemConfig,
    dataset_dir: PathBuf,
    lock_path: PathBuf,
}

impl FilesystemPipeline {
    /// Acquire a session: create the dataset directory and take its lock.
    ///
    /// Fails with [`IngestError::HandleAcquisition`] when the directory
    /// cannot be created or another session holds the lock. Nothing else in
    /// a run can proceed after that, so callers propagate this error.
    pub fn acquire(config: FilesystemConfig) -> Result<Self> {
        if config.dataset.trim().is_empty() {
            return Err(IngestError::HandleAcquisition(
                "dataset name is empty".to_string(),
            ));
        }

        let dataset_dir = config.destination_root.join(&config.dataset);
        std::fs::create_dir_all(&dataset_dir).map_err(|e| {
            IngestError::HandleAcquisition(format!(
                "cannot create dataset directory {}: {}",
                dataset_dir.display(),
                e
            ))
        })?;

        let lock_path = dataset_dir.join(LOCK_FILE);
        let mut lock = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| {
                IngestError::HandleAcquisition(format!(
                    "cannot lock dataset '{}' ({}): {}",
                    config.dataset,
                    lock_path.display(),
                    e
                ))
            })?;

        let session_id = Uuid::new_v4();
        if let Err(e) = writeln!(lock, "{}", session_id) {
            warn!(error = %e, "failed to write session id to lock file");
        }

        debug!(
            dataset = %config.dataset,
            dir = %dataset_dir.display(),
            %session_id,
            "acquired filesystem pipeline"
        );

        Ok(Self {
            config,
            dataset_dir,
            lock_path,
        })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dataset_dir.join(format!("{}.jsonl", table))
    }
}

impl Drop for FilesystemPipeline {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            warn!(
                path = %self.lock_path.display(),
                error = %e,
                "failed to remove dataset lock file"
            );
        }
    }
}

#[async_trait]
impl Pipeline for FilesystemPipeline {
    fn dataset(&self) -> &str {
        &self.config.dataset
    }

    async fn load(
        &mut self,
        source: &SourceDescriptor,
        table: &str,
        disposition: WriteDisposition,
    ) -> Result<LoadOutcome> {
        let load_err = |reason: String| IngestError::Load {
            table: table.to_string(),
            reason,
        };

        // The runner validates names via build_source; this guards direct
        // callers. A name with separators would resolve outside the dataset.
        if table.contains(['/', '\\']) || table.contains("..") {
            return Err(load_err(format!(
                "table name '{}' is not a valid destination identifier",
                table
            )));
        }

        let pattern = self
            .config
            .source_root
            .join(&source.file_glob)
            .to_string_lossy()
            .into_owned();

        // Pattern syntax was validated at build time; a failure here means
        // the joined path produced something the matcher cannot take.
        let matches = glob::glob(&pattern).map_err(|e| IngestError::SourceConstruction {
            table: table.to_string(),
            reason: format!("glob '{}' rejected: {}", pattern, e),
        })?;

        let mut files: Vec<PathBuf> = matches
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| load_err(format!("cannot read source listing: {}", e)))?;
        files.sort();

        if files.is_empty() {
            return Err(load_err(format!("no files match '{}'", pattern)));
        }

        let out_path = self.table_path(table);
        let out_file = match disposition {
            WriteDisposition::Replace => File::create(&out_path),
            WriteDisposition::Append => OpenOptions::new()
                .append(true)
                .create(true)
                .open(&out_path),
        }
        .map_err(|e| load_err(format!("cannot open {}: {}", out_path.display(), e)))?;

        let mut writer = BufWriter::new(out_file);
        let flush_every = source
            .chunk_size
            .unwrap_or(self.config.buffer_max_items)
            .max(1);

        let mut rows: u64 = 0;
        let mut load_ids = Vec::with_capacity(files.len());

        for path in &files {
            debug!(table, file = %path.display(), "reading source file");
            let mut file_rows: u64 = 0;

            let mut reader = csv::ReaderBuilder::new()
                .delimiter(source.delimiter)
                .has_headers(false)
                .flexible(true)
                .from_path(path)
                .map_err(|e| load_err(format!("cannot open {}: {}", path.display(), e)))?;

            for record in reader.records() {
                let record = record.map_err(|e| {
                    load_err(format!("parse failure in {}: {}", path.display(), e))
                })?;

                // TPC-H .tbl rows end with a trailing delimiter, which reads
                // as one extra empty field. Accept and drop it.
                let expected = source.columns.len();
                let actual = if record.len() == expected + 1
                    && record.get(expected).is_some_and(|f| f.is_empty())
                {
                    expected
                } else {
                    record.len()
                };
                if actual != expected {
                    return Err(load_err(format!(
                        "parse failure in {}: expected {} fields, got {} (row {})",
                        path.display(),
                        expected,
                        record.len(),
                        file_rows + 1
                    )));
                }

                let mut row = Map::with_capacity(expected);
                for (column, field) in source.columns.iter().zip(record.iter()) {
                    row.insert(column.clone(), Value::String(field.to_string()));
                }

                serde_json::to_writer(&mut writer, &Value::Object(row))
                    .map_err(|e| load_err(format!("cannot write row: {}", e)))?;
                writer
                    .write_all(b"\n")
                    .map_err(|e| load_err(format!("cannot write row: {}", e)))?;

                rows += 1;
                file_rows += 1;
                if rows % flush_every as u64 == 0 {
                    writer
                        .flush()
                        .map_err(|e| load_err(format!("cannot flush: {}", e)))?;
                }
            }

            load_ids.push(format!("{}.{}", table, Uuid::new_v4()));
        }

        writer
            .flush()
            .map_err(|e| load_err(format!("cannot flush: {}", e)))?;

        debug!(table, rows, files = files.len(), "load finished");

        Ok(LoadOutcome {
            rows_loaded: Some(rows),
            load_ids,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::build_source;
    use crate::spec::TableSpec;
    use std::io::BufRead;

    fn region_spec() -> TableSpec {
        TableSpec::new(
            "tpch_region",
            "region*.tbl",
            '|',
            vec![
                "r_regionkey".to_string(),
                "r_name".to_string(),
                "r_comment".to_string(),
            ],
            WriteDisposition::Replace,
        )
    }

    fn config(root: &std::path::Path) -> FilesystemConfig {
        FilesystemConfig {
            source_root: root.join("src"),
            destination_root: root.join("dst"),
            dataset: "tpch_data".to_string(),
            buffer_max_items: 2,
        }
    }

    fn write_region_file(root: &std::path::Path) {
        let src = root.join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(
            src.join("region_1.tbl"),
            "0|AFRICA|lar deposits|\n1|AMERICA|hs use ironic|\n",
        )
        .unwrap();
    }

    fn read_lines(path: &std::path::Path) -> Vec<String> {
        let file = File::open(path).unwrap();
        std::io::BufReader::new(file)
            .lines()
            .collect::<std::io::Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let dir = tempfile::tempdir().unwrap();
        let first = FilesystemPipeline::acquire(config(dir.path())).unwrap();

        let err = FilesystemPipeline::acquire(config(dir.path())).unwrap_err();
        assert!(matches!(err, IngestError::HandleAcquisition(_)));

        drop(first);
        FilesystemPipeline::acquire(config(dir.path())).unwrap();
    }

    #[tokio::test]
    async fn test_load_writes_jsonl_and_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_region_file(dir.path());

        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let descriptor = build_source(&region_spec()).unwrap();

        let outcome = pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Replace)
            .await
            .unwrap();

        assert_eq!(outcome.rows_loaded, Some(2));
        assert_eq!(outcome.load_ids.len(), 1);

        let lines = read_lines(&pipeline.table_path("tpch_region"));
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["r_regionkey"], "0");
        assert_eq!(first["r_name"], "AFRICA");
    }

    #[tokio::test]
    async fn test_append_vs_replace() {
        let dir = tempfile::tempdir().unwrap();
        write_region_file(dir.path());

        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let descriptor = build_source(&region_spec()).unwrap();

        pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Replace)
            .await
            .unwrap();
        pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Append)
            .await
            .unwrap();
        assert_eq!(read_lines(&pipeline.table_path("tpch_region")).len(), 4);

        pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Replace)
            .await
            .unwrap();
        assert_eq!(read_lines(&pipeline.table_path("tpch_region")).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_glob_match_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();

        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let descriptor = build_source(&region_spec()).unwrap();

        let err = pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Load { .. }));
    }

    #[tokio::test]
    async fn test_table_name_cannot_escape_dataset_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_region_file(dir.path());

        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let descriptor = build_source(&region_spec()).unwrap();

        let err = pipeline
            .load(&descriptor, "../outside", WriteDisposition::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Load { .. }));

        // Nothing was written next to the dataset directory.
        assert!(!dir.path().join("dst/outside.jsonl").exists());
    }

    #[tokio::test]
    async fn test_field_count_mismatch_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("region_1.tbl"), "0|AFRICA\n").unwrap();

        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let descriptor = build_source(&region_spec()).unwrap();

        let err = pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Replace)
            .await
            .unwrap_err();
        match err {
            IngestError::Load { reason, .. } => {
                assert!(reason.contains("expected 3 fields"), "{}", reason)
            },
            other => panic!("expected Load, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mismatch_row_number_is_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        // First file is fine; the second file's first row is short.
        std::fs::write(src.join("region_1.tbl"), "0|AFRICA|a|\n1|AMERICA|b|\n").unwrap();
        std::fs::write(src.join("region_2.tbl"), "2|ASIA\n").unwrap();

        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let descriptor = build_source(&region_spec()).unwrap();

        let err = pipeline
            .load(&descriptor, "tpch_region", WriteDisposition::Replace)
            .await
            .unwrap_err();
        match err {
            IngestError::Load { reason, .. } => {
                assert!(reason.contains("region_2.tbl"), "{}", reason);
                assert!(reason.contains("(row 1)"), "{}", reason);
            },
            other => panic!("expected Load, got {:?}", other),
        }
    }
}
