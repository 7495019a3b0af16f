//! Blob storage for raw uploaded bytes.
//!
//! Blobs live in a flat directory, one file per blob, keyed
//! `{file_id}_{original_filename}`. The key is an opaque locator stored
//! on the lifecycle record; nothing outside this module assumes it is a
//! path. Writes stream through [`ObjectWriter`] so upload progress can
//! be reported per chunk, and every completed write carries a SHA-256
//! checksum of the stored bytes.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

pub mod config;

#[derive(Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub async fn new(config: config::StorageConfig) -> Result<Self> {
        debug!("Initializing storage with config: {:?}", config);

        fs::create_dir_all(&config.root)
            .await
            .with_context(|| format!("Failed to create storage root {}", config.root.display()))?;

        info!("Blob storage initialized at {}", config.root.display());

        Ok(Self { root: config.root })
    }

    /// Start a streaming write to a fresh blob.
    ///
    /// The blob is visible under `key` as soon as the first chunk lands;
    /// callers that abort must [`Storage::delete`] the partial blob.
    #[instrument(skip(self))]
    pub async fn create(&self, key: &str) -> Result<ObjectWriter> {
        let path = self.blob_path(key);
        let file = fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create blob {}", key))?;

        debug!("Opened blob {} for writing", key);

        Ok(ObjectWriter {
            file,
            hasher: Sha256::new(),
            bytes_written: 0,
            key: key.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(key);
        let data = fs::read(&path)
            .await
            .with_context(|| format!("Failed to read blob {}", key))?;

        debug!("Read {} bytes from blob {}", data.len(), key);

        Ok(data)
    }

    /// Delete a blob. Missing blobs are tolerated so deletion stays
    /// idempotent.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted blob {}", key);
                Ok(())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob {}", key)),
        }
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, key: &str) -> bool {
        fs::try_exists(self.blob_path(key)).await.unwrap_or(false)
    }

    /// Build the storage key for an upload: `{file_id}_{filename}`.
    ///
    /// Any path components in the client-supplied filename are stripped so
    /// a key can never escape the storage root.
    pub fn build_key(&self, file_id: &str, filename: &str) -> String {
        let safe_name = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        format!("{}_{}", file_id, safe_name)
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

/// Incremental writer for one blob.
pub struct ObjectWriter {
    file: fs::File,
    hasher: Sha256,
    bytes_written: u64,
    key: String,
}

impl ObjectWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .with_context(|| format!("Failed to write to blob {}", self.key))?;
        self.hasher.update(chunk);
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and close the blob, returning its key, size, and checksum.
    pub async fn finish(mut self) -> Result<StoredObject> {
        self.file
            .flush()
            .await
            .with_context(|| format!("Failed to flush blob {}", self.key))?;

        let checksum = hex::encode(self.hasher.finalize());

        info!(
            key = %self.key,
            size = self.bytes_written,
            checksum = %checksum,
            "Blob stored"
        );

        Ok(StoredObject {
            key: self.key,
            size: self.bytes_written,
            checksum,
        })
    }
}

/// Metadata for a completed blob write.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub checksum: String,
}
