//! Photo upload helper.
//!
//! Issues pre-signed upload slots for ranking photos. The binary upload
//! goes directly to object storage, decoupled from ranking mutation, so
//! a failed upload can never corrupt ranking state.

use std::sync::Arc;
use std::time::Duration;

use bellyfed_common::{
    AppError, AppResult, PresignedUpload, StorageBackend, storage,
};

/// Content types accepted for ranking photos.
pub const ALLOWED_PHOTO_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// How long an issued upload slot stays valid.
pub const UPLOAD_SLOT_TTL: Duration = Duration::from_secs(15 * 60);

/// Upload service for issuing photo upload slots.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn StorageBackend>,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Request an upload slot for a ranking photo.
    ///
    /// Returns a time-limited upload URL and the public URL the photo
    /// will have once uploaded; the caller includes the latter in
    /// `photo_urls` on create/update.
    pub async fn request_slot(
        &self,
        user_id: &str,
        content_type: &str,
    ) -> AppResult<PresignedUpload> {
        let extension = storage::extension_for(content_type).ok_or_else(|| {
            AppError::Validation(format!(
                "unsupported content type: {content_type} (expected one of {})",
                ALLOWED_PHOTO_TYPES.join(", ")
            ))
        })?;

        let key = storage::generate_photo_key(user_id, extension);
        self.storage
            .presign_put(&key, content_type, UPLOAD_SLOT_TTL)
            .await
    }

    /// The backend serving direct PUTs (local backend only).
    #[must_use]
    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        self.storage.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bellyfed_common::LocalStorage;
    use std::path::PathBuf;

    fn test_service() -> UploadService {
        UploadService::new(Arc::new(LocalStorage::new(
            PathBuf::from("/tmp/bellyfed-test"),
            "https://example.com/api/files".to_string(),
        )))
    }

    #[tokio::test]
    async fn test_request_slot_rejects_unsupported_type() {
        let svc = test_service();
        let result = svc.request_slot("u1", "application/pdf").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_request_slot_issues_urls() {
        let svc = test_service();
        let slot = svc.request_slot("u1", "image/png").await.unwrap();

        assert!(slot.upload_url.contains("token="));
        assert!(slot.public_url.ends_with(".png"));
        assert_eq!(slot.expires_in_secs, UPLOAD_SLOT_TTL.as_secs());
    }
}
