//! Photo upload slot endpoint.

use axum::{Json, Router, extract::State, routing::post};
use bellyfed_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::extractors::AuthUser;
use crate::middleware::AppState;

/// Upload slot request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlotRequest {
    pub content_type: String,
}

/// Upload slot response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlotResponse {
    pub upload_url: String,
    pub photo_url: String,
    pub expires_in_secs: u64,
}

/// Request a pre-signed upload slot for a ranking photo.
///
/// The binary upload goes directly to the returned URL; the resulting
/// public URL is what belongs in `photoUrls` on create/update.
async fn ranking_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UploadSlotRequest>,
) -> AppResult<Json<UploadSlotResponse>> {
    let slot = state
        .upload_service
        .request_slot(&user.id, &req.content_type)
        .await?;

    Ok(Json(UploadSlotResponse {
        upload_url: slot.upload_url,
        photo_url: slot.public_url,
        expires_in_secs: slot.expires_in_secs,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ranking-photo", post(ranking_photo))
}
