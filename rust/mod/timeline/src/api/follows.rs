use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use chirp_core::{Principal, ServiceError};

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/follow",
            axum::routing::post(follow).delete(unfollow),
        )
        .route("/users/{id}/profile", get(profile))
}

async fn follow(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.follow(&principal.user_id, &id)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::CREATED)
}

async fn unfollow(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.unfollow(&principal.user_id, &id)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn profile(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profile = svc.profile(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(profile).unwrap_or_default()))
}
