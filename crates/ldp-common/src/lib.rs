//! LDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the LDP workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all LDP workspace members:
//!
//! - **Logging**: Centralized `tracing` configuration with console/file
//!   output, text/JSON formats, and environment-based overrides
//! - **Environment**: Typed helpers for reading configuration from process
//!   environment variables
//!
//! # Example
//!
//! ```no_run
//! use ldp_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod env;
pub mod logging;
