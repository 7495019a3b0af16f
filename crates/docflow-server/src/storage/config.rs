use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default directory for raw uploaded blobs.
pub const DEFAULT_STORAGE_ROOT: &str = "uploads";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory that holds one file per stored blob.
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            root: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_ROOT)),
        })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
