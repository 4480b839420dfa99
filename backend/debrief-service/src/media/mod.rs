//! Media object storage for debrief videos and thumbnails.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::BlobError;

mod memory;
mod s3;

pub use memory::{MemoryBlobStore, StoredObject};
pub use s3::S3BlobStore;

/// Binary payload attached to a new content item
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Thumbnail,
}

/// Object key namespaced by owner and upload time:
/// `{owner}/{millis}_{name}` for videos, `{owner}/thumbnails/{millis}_{name}`
/// for thumbnails.
pub fn object_key(owner: Uuid, kind: MediaKind, file_name: &str, at: DateTime<Utc>) -> String {
    let name = sanitize_file_name(file_name);
    let millis = at.timestamp_millis();
    match kind {
        MediaKind::Video => format!("{}/{}_{}", owner, millis, name),
        MediaKind::Thumbnail => format!("{}/thumbnails/{}_{}", owner, millis, name),
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Object store holding uploaded media
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError>;

    /// Stable public reference for a previously uploaded key
    fn public_url(&self, key: &str) -> String;
}
