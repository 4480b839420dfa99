/// S3 configuration for the media bucket
use serde::{Deserialize, Serialize};

/// Bucket holding uploaded debrief videos and thumbnails
pub const DEFAULT_MEDIA_BUCKET: &str = "content-media";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Base URL for public references: a CDN domain, or the S3-compatible
    /// endpoint when `path_style` is set. Empty means the bucket's own
    /// virtual-hosted AWS URL.
    pub base_url: String,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
    /// Custom endpoint for S3-compatible stores (MinIO, localstack)
    pub endpoint: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_MEDIA_BUCKET.to_string(),
            region: "us-east-1".to_string(),
            base_url: String::new(),
            path_style: false,
            endpoint: None,
        }
    }
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bucket: std::env::var("MEDIA_BUCKET").unwrap_or(defaults.bucket),
            region: std::env::var("AWS_REGION").unwrap_or(defaults.region),
            base_url: std::env::var("S3_BASE_URL").unwrap_or(defaults.base_url),
            path_style: std::env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.path_style),
            endpoint: std::env::var("S3_ENDPOINT").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Stable public URL for an object key
    pub fn public_url(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        let base = self.base_url.trim_end_matches('/');
        if self.path_style {
            format!("{}/{}/{}", base, self.bucket, key)
        } else if !base.is_empty() {
            format!("{}/{}", base, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_public_url_virtual_hosted_style() {
        let config = S3Config {
            bucket: "content-media".to_string(),
            region: "eu-west-3".to_string(),
            ..S3Config::default()
        };

        assert_eq!(
            config.public_url("user/1700000000000_clip.mp4"),
            "https://content-media.s3.eu-west-3.amazonaws.com/user/1700000000000_clip.mp4"
        );
    }

    #[test]
    fn test_public_url_uses_cdn_base() {
        let config = S3Config {
            base_url: "https://cdn.example.com/".to_string(),
            ..S3Config::default()
        };

        assert_eq!(
            config.public_url("user/thumbnails/1_cover.png"),
            "https://cdn.example.com/user/thumbnails/1_cover.png"
        );
    }

    #[test]
    fn test_public_url_path_style() {
        let config = S3Config {
            base_url: "http://localhost:9000/".to_string(),
            path_style: true,
            ..S3Config::default()
        };

        assert_eq!(
            config.public_url("/a/b.jpg"),
            "http://localhost:9000/content-media/a/b.jpg"
        );
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("MEDIA_BUCKET");
        std::env::remove_var("S3_BASE_URL");
        std::env::remove_var("S3_PATH_STYLE");
        std::env::remove_var("S3_ENDPOINT");

        let config = S3Config::from_env();
        assert_eq!(config.bucket, DEFAULT_MEDIA_BUCKET);
        assert!(config.base_url.is_empty());
        assert!(!config.path_style);
        assert!(config.endpoint.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("MEDIA_BUCKET", "briefs");
        std::env::set_var("S3_PATH_STYLE", "true");
        std::env::set_var("S3_ENDPOINT", "http://minio:9000");

        let config = S3Config::from_env();
        assert_eq!(config.bucket, "briefs");
        assert!(config.path_style);
        assert_eq!(config.endpoint.as_deref(), Some("http://minio:9000"));

        std::env::remove_var("MEDIA_BUCKET");
        std::env::remove_var("S3_PATH_STYLE");
        std::env::remove_var("S3_ENDPOINT");
    }
}
