//! # Blob Storage
//!
//! Generated documents are uploaded to a bucket and served back from it, so a
//! download always reflects what was stored.
//!
//! - `BlobStore`: the narrow interface handlers depend on.
//! - `local`: filesystem implementation, one directory per bucket.
//! - `keys`: timestamped object keys and download file names.

pub mod keys;
pub mod local;

pub use local::LocalBlobStore;

use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object {key} not found in bucket {bucket}")]
    NotFound { bucket: String, key: String },
    #[error("invalid object key {0:?}")]
    InvalidKey(String),
    #[error("blob store unavailable: {0}")]
    Io(#[from] std::io::Error),
}

pub trait BlobStore: Send + Sync {
    /// Stores everything readable from `data` under `key`, replacing any
    /// existing object.
    fn upload(&self, data: &mut dyn Read, bucket: &str, key: &str) -> Result<(), StoreError>;

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Whether `bucket` can currently be read and written.
    fn is_available(&self, bucket: &str) -> bool;

    /// Copies an object into a temporary file that is deleted when dropped.
    ///
    /// The file keeps the key's extension so it can be handed to tools that
    /// sniff by name.
    fn download_to_temp(&self, bucket: &str, key: &str) -> Result<NamedTempFile, StoreError> {
        let bytes = self.get_object(bucket, key)?;
        let suffix = Path::new(key)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("efiling-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    }
}
