use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use chirp_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::CreateTweet;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tweets", axum::routing::post(create_tweet))
        .route("/tweets/{id}", get(get_tweet).delete(delete_tweet))
}

async fn create_tweet(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<CreateTweet>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let tweet = svc
        .create_tweet(&principal.user_id, input)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(tweet).unwrap_or_default()),
    ))
}

async fn get_tweet(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let detail = svc.get_tweet(&id).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(detail).unwrap_or_default()))
}

async fn delete_tweet(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_tweet(&principal.user_id, &id)
        .map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
