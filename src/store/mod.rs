//! Object-store sink: bucket-scoped download and upload of named byte buffers.
//!
//! [`ObjectStore`] is the seam the page pipeline writes through and the job
//! driver reads the source document from. [`StoreProvider`] hands out a store
//! per bucket, because one trigger event can reference several buckets while
//! the underlying client (and its credentials) is built once per process.
//!
//! * [`s3::S3Stores`]   : AWS S3 or any S3-compatible endpoint
//! * [`local::LocalStores`]: a directory per bucket on the local filesystem

pub mod local;
pub mod s3;

use crate::error::Pdf2JpegError;
use async_trait::async_trait;
use std::sync::Arc;

pub use local::{LocalStore, LocalStores};
pub use s3::{S3Store, S3Stores};

/// A bucket-scoped object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store reads and writes.
    fn bucket(&self) -> &str;

    /// Fetch the full body of `key`.
    async fn download(&self, key: &str) -> Result<Vec<u8>, Pdf2JpegError>;

    /// Store `body` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str)
        -> Result<(), Pdf2JpegError>;
}

/// Resolves a bucket name to a store.
pub trait StoreProvider: Send + Sync {
    fn store_for(&self, bucket: &str) -> Arc<dyn ObjectStore>;
}
