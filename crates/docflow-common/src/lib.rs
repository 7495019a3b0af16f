//! Docflow Common Library
//!
//! Shared types and utilities for the docflow workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across docflow workspace members:
//!
//! - **Logging**: Centralized tracing bootstrap with console/file/JSON output
//! - **Types**: Shared domain types (file lifecycle status)
//!
//! # Example
//!
//! ```no_run
//! use docflow_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::FileStatus;
