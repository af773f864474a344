//! Axum HTTP handlers for the identity module.
//!
//! Thin wrappers around IdentityService methods, translating axum types
//! (Path, Query, Json) to service method calls.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use chirp_core::{ListParams, Principal, ServiceError};

use crate::model::CreateUser;
use crate::service::IdentityService;

/// Shared application state.
pub type AppState = Arc<IdentityService>;

/// Build the complete identity API router.
///
/// All routes are relative — the caller nests them under `/identity`.
pub fn build_router(svc: Arc<IdentityService>) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/me", get(me))
        .with_state(svc)
}

async fn create_user(
    State(svc): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let provisioned = svc.create_user(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(provisioned).unwrap_or_default()),
    ))
}

async fn list_users(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_users(&params).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(user).unwrap_or_default()))
}

/// The caller's own identity, as resolved by the auth middleware.
async fn me(
    Extension(principal): Extension<Principal>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": principal.user_id,
        "name": principal.name,
    }))
}
