use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use chirp_core::{Principal, ServiceError};

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/tweets/{id}/likes",
        get(list_likes).post(like).delete(unlike),
    )
}

async fn like(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.like(&principal.user_id, &id)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::CREATED)
}

async fn unlike(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.unlike(&principal.user_id, &id)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_likes(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let likers = svc.likers_of(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "items": likers,
        "total": likers.len(),
    })))
}
