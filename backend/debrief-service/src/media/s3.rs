use async_trait::async_trait;
use s3_utils::{S3Client, S3Operations};
use tracing::debug;

use super::BlobStore;
use crate::error::BlobError;

/// Media store backed by the shared S3 client
#[derive(Clone)]
pub struct S3BlobStore {
    operations: S3Operations,
}

impl S3BlobStore {
    pub fn new(client: &S3Client) -> Self {
        Self {
            operations: client.operations(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobError> {
        let url = self
            .operations
            .upload_object(key, bytes, content_type)
            .await?;
        debug!(bucket = self.operations.bucket(), %url, "media stored");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.operations.public_url(key)
    }
}
