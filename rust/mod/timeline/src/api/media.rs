use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router};

use chirp_core::ServiceError;

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/media", axum::routing::post(upload))
}

/// Raw-body upload. The original filename, if any, rides in the
/// `x-filename` header; the service sanitizes it before use.
async fn upload(
    State(svc): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let filename = headers
        .get("x-filename")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("upload");

    let media = svc
        .upload_media(filename, &body)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": media.id,
            "blob_key": media.blob_key,
        })),
    ))
}
