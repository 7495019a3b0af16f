//! Feature modules implementing the docflow API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//!
//! - **files**: upload, progress, content, listing, deletion
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (upload, delete)
//! - `queries/` - Read operations (progress, content, list)
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries declare their own request/response types and a
//! `thiserror` error enum, and expose a `handle` function that takes the
//! state it needs explicitly.

pub mod files;

use axum::Router;

use crate::parsing::ParseQueue;
use crate::progress::ProgressTracker;
use crate::storage::Storage;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// SQLite connection pool holding the lifecycle records
    pub db: sqlx::SqlitePool,
    /// Blob storage for raw uploaded bytes
    pub storage: Storage,
    /// Transient per-file progress map
    pub progress: ProgressTracker,
    /// Submission handle for background extraction
    pub parse_queue: ParseQueue,
}

/// Creates the API router with all feature routes mounted.
///
/// - `/files` - upload, listing, per-file content/progress/deletion
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/files", files::files_routes().with_state(state))
}
