/// S3 object operations used by media uploads
use crate::config::S3Config;
use crate::S3Error;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Upload an object and return its public URL
    pub async fn upload_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Request {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!(bucket = %self.config.bucket, key, size, "object uploaded");
        Ok(self.config.public_url(key))
    }

    pub fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }
}
