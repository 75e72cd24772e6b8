//! Filesystem object store: each bucket is a directory under a root, each key
//! a relative path inside it.
//!
//! Writes are atomic (temp file + rename) so a reader never sees a partially
//! written image.

use super::{ObjectStore, StoreProvider};
use crate::error::Pdf2JpegError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Hands out a [`LocalStore`] per bucket directory under `root`.
#[derive(Debug, Clone)]
pub struct LocalStores {
    root: PathBuf,
}

impl LocalStores {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StoreProvider for LocalStores {
    fn store_for(&self, bucket: &str) -> Arc<dyn ObjectStore> {
        Arc::new(LocalStore::new(self.root.join(bucket), bucket))
    }
}

/// One bucket directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    bucket: String,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            bucket: bucket.into(),
        }
    }

    /// Resolve `key` inside the bucket directory, refusing keys that would
    /// escape it.
    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let rel = Path::new(key);
        let escapes = rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if key.is_empty() || escapes {
            None
        } else {
            Some(self.dir.join(rel))
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, Pdf2JpegError> {
        let fail = |reason: String| Pdf2JpegError::DownloadFailed {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            reason,
        };
        let path = self
            .path_for(key)
            .ok_or_else(|| fail("key escapes the bucket directory".into()))?;

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| fail(format!("{}: {}", path.display(), e)))?;

        debug!("Read {} ({} bytes)", path.display(), data.len());
        Ok(data)
    }

    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), Pdf2JpegError> {
        let fail = |reason: String| Pdf2JpegError::UploadFailed {
            key: key.to_string(),
            reason,
        };
        let path = self
            .path_for(key)
            .ok_or_else(|| fail("key escapes the bucket directory".into()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fail(format!("{}: {}", parent.display(), e)))?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(|e| fail(format!("{}: {}", tmp_path.display(), e)))?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| fail(format!("{}: {}", path.display(), e)))?;

        debug!("Wrote {} ({} bytes)", path.display(), body.len());
        Ok(())
    }
}
