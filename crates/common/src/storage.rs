//! Object storage abstraction for ranking photo uploads.
//!
//! Supports both local filesystem and S3-compatible object storage.
//! Uploads are client-direct: the service hands out a time-limited
//! pre-signed upload slot and the client PUTs the bytes itself.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::{AppError, AppResult};

/// A time-limited upload slot.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// URL the client PUTs the file body to.
    pub upload_url: String,
    /// Public URL the file will have once uploaded.
    pub public_url: String,
    /// Seconds until the upload URL expires.
    pub expires_in_secs: u64,
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path or object key).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Issue a pre-signed upload slot for a key.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUpload>;

    /// Validate an upload token issued by [`StorageBackend::presign_put`].
    ///
    /// Only meaningful for backends whose upload slots target this
    /// server; backends with real pre-signed URLs reject it.
    async fn verify_put_token(&self, key: &str, token: &str) -> AppResult<()>;

    /// Store a file body under a key.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
///
/// Upload slots are token-stamped PUT URLs served by this server; tokens
/// are single-use and expire with the slot.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    tokens: RwLock<HashMap<String, IssuedToken>>,
}

struct IssuedToken {
    token: String,
    deadline: Instant,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUpload> {
        let token = uuid::Uuid::new_v4().simple().to_string();

        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, issued| issued.deadline > Instant::now());
        tokens.insert(
            key.to_string(),
            IssuedToken {
                token: token.clone(),
                deadline: Instant::now() + expires_in,
            },
        );

        Ok(PresignedUpload {
            upload_url: format!(
                "{}/{}?token={}",
                self.base_url.trim_end_matches('/'),
                key,
                token
            ),
            public_url: self.public_url(key),
            expires_in_secs: expires_in.as_secs(),
        })
    }

    async fn verify_put_token(&self, key: &str, token: &str) -> AppResult<()> {
        let mut tokens = self.tokens.write().await;
        match tokens.remove(key) {
            Some(issued) if issued.deadline <= Instant::now() => {
                Err(AppError::Forbidden("Upload slot expired".to_string()))
            }
            Some(issued) if issued.token == token => Ok(()),
            Some(issued) => {
                // Wrong token does not burn the slot
                tokens.insert(key.to_string(), issued);
                Err(AppError::Forbidden("Invalid upload token".to_string()))
            }
            None => Err(AppError::Forbidden("Invalid upload token".to_string())),
        }
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Upload(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Upload(format!("Failed to write file: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Upload(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// S3-compatible object storage backend.
#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: Option<String>,
}

#[cfg(feature = "s3")]
impl S3Storage {
    /// Create a new S3 storage backend using ambient AWS credentials.
    pub async fn new(
        endpoint: &str,
        bucket: String,
        region: &str,
        public_url: Option<String>,
    ) -> AppResult<Self> {
        use aws_config::{BehaviorVersion, Region};

        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let config = aws_sdk_s3::config::Builder::from(&base)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
            public_url,
        })
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl StorageBackend for S3Storage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUpload> {
        use aws_sdk_s3::presigning::PresigningConfig;

        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Upload(format!("Invalid presign expiry: {e}")))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Upload(format!("S3 presign failed: {e}")))?;

        Ok(PresignedUpload {
            upload_url: presigned.uri().to_string(),
            public_url: self.public_url(key),
            expires_in_secs: expires_in.as_secs(),
        })
    }

    async fn verify_put_token(&self, _key: &str, _token: &str) -> AppResult<()> {
        // S3 slots are real pre-signed URLs; nothing PUTs through this server.
        Err(AppError::BadRequest(
            "Direct upload is not served by this backend".to_string(),
        ))
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
        use aws_sdk_s3::primitives::ByteStream;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("S3 upload failed: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }
}

/// Map an image content type to its file extension.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Generate a unique storage key for a ranking photo.
#[must_use]
pub fn generate_photo_key(user_id: &str, extension: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();
    let timestamp = now.timestamp_millis();

    format!(
        "rankings/{}/{}/{}_{}.{}",
        date_path,
        user_id,
        timestamp,
        uuid::Uuid::new_v4(),
        extension
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_photo_key() {
        let key = generate_photo_key("user123", "jpg");
        assert!(key.starts_with("rankings/"));
        assert!(key.contains("user123"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/gif"), Some("gif"));
    }

    #[test]
    fn test_extension_for_rejects_unknown() {
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for("text/html"), None);
    }

    #[tokio::test]
    async fn test_local_presign_token_roundtrip() {
        let storage = LocalStorage::new(
            PathBuf::from("/tmp/bellyfed-test"),
            "https://example.com/api/files".to_string(),
        );

        let slot = storage
            .presign_put("rankings/a/b.jpg", "image/jpeg", Duration::from_secs(900))
            .await
            .unwrap();
        assert!(slot.upload_url.contains("token="));
        assert_eq!(
            slot.public_url,
            "https://example.com/api/files/rankings/a/b.jpg"
        );

        let token = slot.upload_url.split("token=").nth(1).unwrap();
        storage
            .verify_put_token("rankings/a/b.jpg", token)
            .await
            .unwrap();

        // Tokens are single-use
        let again = storage.verify_put_token("rankings/a/b.jpg", token).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn test_local_verify_rejects_wrong_token() {
        let storage = LocalStorage::new(
            PathBuf::from("/tmp/bellyfed-test"),
            "https://example.com/api/files".to_string(),
        );

        storage
            .presign_put("k.png", "image/png", Duration::from_secs(900))
            .await
            .unwrap();

        let result = storage.verify_put_token("k.png", "bogus").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
