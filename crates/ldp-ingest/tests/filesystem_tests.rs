//! End-to-end runs against the filesystem pipeline
//!
//! Real files under a temp directory, real glob expansion, real JSONL
//! output. Exercises the full registry -> source -> load -> report path,
//! including the handle-acquisition failure mode.

use ldp_ingest::error::{FailureKind, IngestError};
use ldp_ingest::filesystem::{FilesystemConfig, FilesystemPipeline};
use ldp_ingest::report::{report, RunSummary};
use ldp_ingest::runner::{RunConfig, Runner};
use ldp_ingest::spec::{SpecRegistry, TableSpec, WriteDisposition};
use std::path::Path;

fn tpch_registry() -> SpecRegistry {
    let mut registry = SpecRegistry::new();
    registry
        .register(TableSpec::new(
            "tpch_region",
            "h/1/region*.tbl",
            '|',
            vec![
                "r_regionkey".to_string(),
                "r_name".to_string(),
                "r_comment".to_string(),
            ],
            WriteDisposition::Replace,
        ))
        .unwrap();
    registry
        .register(TableSpec::new(
            "tpch_nation",
            "h/1/nation*.tbl",
            '|',
            vec![
                "n_nationkey".to_string(),
                "n_name".to_string(),
                "n_regionkey".to_string(),
                "n_comment".to_string(),
            ],
            WriteDisposition::Replace,
        ))
        .unwrap();
    registry
}

fn config(root: &Path) -> FilesystemConfig {
    FilesystemConfig {
        source_root: root.to_path_buf(),
        destination_root: root.join("bronze"),
        dataset: "tpch_data".to_string(),
        buffer_max_items: 100,
    }
}

fn write_source_files(root: &Path) {
    let dir = root.join("h/1");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("region_1.tbl"),
        "0|AFRICA|lar deposits|\n\
         1|AMERICA|hs use ironic|\n\
         2|ASIA|ges. thinly even|\n\
         3|EUROPE|ly final courts|\n\
         4|MIDDLE EAST|uickly special|\n",
    )
    .unwrap();
}

#[tokio::test]
async fn partial_failure_still_reports_every_table() {
    let dir = tempfile::tempdir().unwrap();
    // Region files exist; nation files do not, so its load fails.
    write_source_files(dir.path());

    let registry = tpch_registry();
    let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();

    let results = Runner::new(RunConfig::default())
        .run(&registry, &mut pipeline)
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].succeeded());
    assert_eq!(results[0].rows_loaded, Some(5));

    assert!(!results[1].succeeded());
    assert_eq!(
        results[1].failure.as_ref().unwrap().kind,
        FailureKind::Load
    );

    let summary = RunSummary::from_results(&results);
    assert!(!summary.all_succeeded());
    assert!(report(&results).contains("1 succeeded, 1 failed"));

    // The dataset got the successful table anyway.
    let table_file = dir.path().join("bronze/tpch_data/tpch_region.jsonl");
    assert!(table_file.exists());
}

#[tokio::test]
async fn traversal_table_name_is_rejected_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_source_files(dir.path());

    let mut registry = SpecRegistry::new();
    registry
        .register(TableSpec::new(
            "../outside",
            "h/1/region*.tbl",
            '|',
            vec![
                "r_regionkey".to_string(),
                "r_name".to_string(),
                "r_comment".to_string(),
            ],
            WriteDisposition::Replace,
        ))
        .unwrap();

    let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
    let results = Runner::new(RunConfig::default())
        .run(&registry, &mut pipeline)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].failure.as_ref().unwrap().kind,
        FailureKind::InvalidSpec
    );

    // Nothing escaped the dataset directory.
    assert!(!dir.path().join("bronze/outside.jsonl").exists());
}

#[tokio::test]
async fn acquisition_failure_aborts_before_any_table() {
    let dir = tempfile::tempdir().unwrap();
    write_source_files(dir.path());

    let holder = FilesystemPipeline::acquire(config(dir.path())).unwrap();

    // A second session against the same dataset cannot be acquired, so no
    // run starts and no results exist.
    let err = FilesystemPipeline::acquire(config(dir.path())).unwrap_err();
    assert!(matches!(err, IngestError::HandleAcquisition(_)));
    assert!(err.is_fatal());

    drop(holder);
}

#[tokio::test]
async fn lock_is_released_after_a_run_with_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_source_files(dir.path());

    {
        let registry = tpch_registry();
        let mut pipeline = FilesystemPipeline::acquire(config(dir.path())).unwrap();
        let _ = Runner::new(RunConfig::default())
            .run(&registry, &mut pipeline)
            .await;
    }

    // Handle released on scope exit even though a table failed.
    FilesystemPipeline::acquire(config(dir.path())).unwrap();
}
