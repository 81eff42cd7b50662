//! Direct file PUT target for the local storage backend.
//!
//! S3-backed deployments never hit this route: their upload slots are
//! real pre-signed URLs pointing at the bucket.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::put,
};
use bellyfed_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::middleware::AppState;

/// Upload token query parameter.
#[derive(Debug, Deserialize)]
struct UploadTokenQuery {
    token: String,
}

/// Stored file response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredFileResponse {
    url: String,
}

/// Accept a file body for a previously issued upload slot.
///
/// No bearer auth here: the single-use slot token is the credential,
/// matching how a pre-signed URL works.
async fn put_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<UploadTokenQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<StoredFileResponse>> {
    let backend = state.upload_service.backend();
    backend.verify_put_token(&key, &query.token).await?;

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let stored = backend.put(&key, &body, content_type).await?;
    Ok(Json(StoredFileResponse { url: stored.url }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{*key}", put(put_file))
}
