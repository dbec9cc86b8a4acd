// src/storage/mod.rs
use std::fs;
use std::future::Future;
use std::path::{Component, Path, PathBuf};

use crate::utils::error::StorageError;

/// Blob store the archived records are written to.
pub trait ArchiveStore {
    /// Stores `body` under `key`, replacing any existing object.
    fn put(&self, key: &str, body: Vec<u8>) -> impl Future<Output = Result<(), StorageError>>;
}

/// A bucket laid out as a directory tree: `{root}/{bucket}/{key}`.
pub struct FsArchive {
    bucket_dir: PathBuf,
}

impl FsArchive {
    /// Opens the bucket directory, creating it if it doesn't exist.
    pub fn new<P: AsRef<Path>>(root: P, bucket: &str) -> Result<Self, StorageError> {
        let bucket_dir = root.as_ref().join(checked_relative(bucket)?);

        if !bucket_dir.exists() {
            fs::create_dir_all(&bucket_dir).map_err(StorageError::IoError)?;
        }

        tracing::debug!("Archive bucket at {}", bucket_dir.display());
        Ok(Self { bucket_dir })
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.bucket_dir.join(checked_relative(key)?))
    }
}

// Keys must stay inside the bucket directory.
fn checked_relative(key: &str) -> Result<&Path, StorageError> {
    let path = Path::new(key);
    let plain = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

    if plain {
        Ok(path)
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl ArchiveStore for FsArchive {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        let file_path = self.path_for(key)?;

        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }
        }

        fs::write(&file_path, &body).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} bytes to {}", body.len(), file_path.display());
        Ok(())
    }
}
