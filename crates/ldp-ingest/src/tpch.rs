//! Built-in TPC-H table registry
//!
//! The standard run configuration: the TPC-H dimension tables published as
//! pipe-delimited `.tbl` files, region at scale factor 1 and nation and
//! customer at scale factor 100. Compiled in rather than parsed from flags;
//! callers can narrow it with [`SpecRegistry::filtered`].

use crate::error::Result;
use crate::spec::{BatchHints, SpecRegistry, TableSpec, WriteDisposition};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The default TPC-H registry: region, nation, customer, in that order.
pub fn registry() -> Result<SpecRegistry> {
    let mut registry = SpecRegistry::new();

    registry.register(
        TableSpec::new(
            "tpch_region",
            "h/1/region*.tbl",
            '|',
            columns(&["r_regionkey", "r_name", "r_comment"]),
            WriteDisposition::Replace,
        )
        .with_description("TPCH Region dimension table")
        .with_batch_hints(BatchHints {
            batch_size: Some(10_000),
            chunk_size: Some(5_000),
            parallel_readers: None,
        }),
    )?;

    registry.register(
        TableSpec::new(
            "tpch_nation",
            "h/100/nation*.tbl*",
            '|',
            columns(&["n_nationkey", "n_name", "n_regionkey", "n_comment"]),
            WriteDisposition::Replace,
        )
        .with_description("TPCH Nation dimension table")
        .with_batch_hints(BatchHints {
            batch_size: Some(25_000),
            chunk_size: Some(5_000),
            parallel_readers: None,
        }),
    )?;

    registry.register(
        TableSpec::new(
            "tpch_customer",
            "h/100/customer*.tbl*",
            '|',
            columns(&[
                "c_custkey",
                "c_name",
                "c_address",
                "c_nationkey",
                "c_phone",
                "c_acctbal",
                "c_mktsegment",
                "c_comment",
            ]),
            WriteDisposition::Replace,
        )
        .with_description("TPCH Customer dimension table")
        .with_batch_hints(BatchHints {
            batch_size: Some(50_000),
            chunk_size: Some(10_000),
            parallel_readers: Some(4),
        }),
    )?;

    Ok(registry)
}
