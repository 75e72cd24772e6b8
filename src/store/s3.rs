//! AWS S3 object store.
//!
//! Credentials and region come from the ambient AWS environment (env vars,
//! profile, or the Lambda execution role). An explicit endpoint switches to
//! path-style addressing for MinIO and other S3-compatible services.

use super::{ObjectStore, StoreProvider};
use crate::error::Pdf2JpegError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::{debug, info};

/// Hands out [`S3Store`]s sharing one client.
#[derive(Clone)]
pub struct S3Stores {
    client: Client,
}

impl S3Stores {
    /// Wrap an already configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration.
    pub async fn from_env(endpoint_url: Option<&str>) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let client = match endpoint_url {
            Some(endpoint) => {
                info!("Using S3-compatible endpoint {}", endpoint);
                let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                Client::from_conf(s3_config)
            }
            None => Client::new(&sdk_config),
        };

        Self { client }
    }
}

impl StoreProvider for S3Stores {
    fn store_for(&self, bucket: &str) -> Arc<dyn ObjectStore> {
        Arc::new(S3Store {
            client: self.client.clone(),
            bucket: bucket.to_string(),
        })
    }
}

/// One S3 bucket.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, Pdf2JpegError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Pdf2JpegError::DownloadFailed {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Pdf2JpegError::DownloadFailed {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                reason: format!("Failed to read object body: {}", e),
            })?
            .into_bytes()
            .to_vec();

        debug!("Downloaded s3://{}/{} ({} bytes)", self.bucket, key, data.len());
        Ok(data)
    }

    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), Pdf2JpegError> {
        let len = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| Pdf2JpegError::UploadFailed {
                key: format!("s3://{}/{}", self.bucket, key),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("Uploaded s3://{}/{} ({} bytes)", self.bucket, key, len);
        Ok(())
    }
}
