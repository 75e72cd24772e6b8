//! S3 event notifications: the trigger that starts a job.
//!
//! Only the fields the job driver needs are modelled; unknown fields are
//! ignored. Object keys arrive URL-encoded (`+` for space, `%XX` escapes)
//! and are decoded by [`S3EventRecord::decoded_key`].

use crate::error::Pdf2JpegError;
use serde::{Deserialize, Serialize};

/// One notification, possibly batching several records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Object {
    /// URL-encoded object key, as delivered.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
}

impl S3Event {
    /// Parse a notification payload.
    pub fn from_json(payload: &str) -> Result<Self, Pdf2JpegError> {
        serde_json::from_str(payload).map_err(|e| Pdf2JpegError::InvalidEvent(e.to_string()))
    }

    /// A single-record event for `bucket`/`key` (raw, not encoded).
    pub fn single(bucket: impl Into<String>, key: &str) -> Self {
        Self {
            records: vec![S3EventRecord {
                event_source: Some("aws:s3".into()),
                event_name: Some("ObjectCreated:Put".into()),
                aws_region: None,
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.into(),
                        arn: None,
                    },
                    object: S3Object {
                        key: urlencoding::encode(key).into_owned(),
                        size: None,
                        e_tag: None,
                    },
                },
            }],
        }
    }
}

impl S3EventRecord {
    pub fn bucket_name(&self) -> &str {
        &self.s3.bucket.name
    }

    /// The object key with S3's URL encoding removed.
    pub fn decoded_key(&self) -> Result<String, Pdf2JpegError> {
        let spaced = self.s3.object.key.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|k| k.into_owned())
            .map_err(|e| {
                Pdf2JpegError::InvalidEvent(format!(
                    "object key '{}' is not valid URL encoding: {}",
                    self.s3.object.key, e
                ))
            })
    }

    /// Whether the record reports a newly stored object. Records without an
    /// event name are treated as creations.
    pub fn is_object_created(&self) -> bool {
        self.event_name
            .as_deref()
            .map_or(true, |name| name.starts_with("ObjectCreated"))
    }
}
