//! Docflow Server Library
//!
//! HTTP service that accepts file uploads, extracts structured content
//! from them in the background, and serves the extracted content plus
//! lifecycle status through a small query API.
//!
//! # Overview
//!
//! - **API Endpoints**: upload, progress, content, list, delete under `/files`
//! - **Record Store**: SQLite via SQLx, one durable row per uploaded file
//! - **Blob Storage**: local directory of raw uploads keyed by file id
//! - **Progress Tracker**: in-process concurrent map for in-flight files
//! - **Parse Worker**: channel-dispatched background extraction tasks
//!
//! # Architecture
//!
//! Features follow a vertical-slice layout: each operation lives in its
//! own file under `features/files/{commands,queries}/` with its request
//! and response types, a dedicated error enum, and a `handle` function.
//!
//! Writes (upload, delete) are commands; reads (progress, content, list)
//! are queries. Extraction never runs on a request thread: the upload
//! command submits a [`parsing::ParseJob`] and returns immediately, and
//! callers poll `/files/{id}/progress` until a terminal status.
//!
//! ## Lifecycle
//!
//! ```text
//! uploading -> processing -> ready      (success)
//! uploading -> processing -> failed     (extraction failure)
//! uploading -> failed                   (upload failure, no record)
//! ```
//!
//! `ready` and `failed` are terminal. The durable record is
//! authoritative; the progress tracker is a process-lifetime cache that
//! disappears on restart, at which point queries fall back to the record.
//!
//! # Example
//!
//! ```no_run
//! use docflow_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod extract;
pub mod features;
pub mod middleware;
pub mod models;
pub mod parsing;
pub mod progress;
pub mod storage;

// Re-export commonly used types
pub use models::FileRecord;
pub use progress::{ProgressEntry, ProgressTracker};
