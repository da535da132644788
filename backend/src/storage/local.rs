use crate::storage::{BlobStore, StoreError};
use log::{debug, info};
use std::fs;
use std::io::{self, ErrorKind, Read};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Blob store on the local filesystem: `{root}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(&dir)?;
        info!("Using bucket directory {}", dir.display());
        Ok(())
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(StoreError::InvalidKey(bucket.to_string()));
        }
        Ok(self.root.join(bucket))
    }

    /// Maps `key` below the bucket directory. A leading `/` is ignored and
    /// any segment that would climb out of the bucket is rejected.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.bucket_dir(bucket)?;
        let mut segments = 0;
        for component in Path::new(key.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => {
                    path.push(segment);
                    segments += 1;
                }
                Component::CurDir => {}
                _ => return Err(StoreError::InvalidKey(key.to_string())),
            }
        }
        if segments == 0 {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(path)
    }
}

impl BlobStore for LocalBlobStore {
    fn upload(&self, data: &mut dyn Read, bucket: &str, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        fs::create_dir_all(parent)?;

        // Readers never see a half-written object.
        let mut staged = NamedTempFile::new_in(parent)?;
        let written = io::copy(data, staged.as_file_mut())?;
        staged.persist(&path).map_err(|e| e.error)?;

        debug!("Stored {} bytes at {}", written, path.display());
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => StoreError::Io(e),
        })
    }

    fn is_available(&self, bucket: &str) -> bool {
        self.bucket_dir(bucket)
            .and_then(|dir| Ok(fs::metadata(dir)?))
            .is_ok_and(|meta| meta.is_dir() && !meta.permissions().readonly())
    }
}
