use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};

use chirp_core::{Principal, ServiceError};

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/feed", get(feed))
}

async fn feed(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let tweets = svc
        .build_feed(&principal.user_id)
        .map_err(ServiceError::from)?;
    let total = tweets.len();
    Ok(Json(serde_json::json!({
        "tweets": tweets,
        "total": total,
    })))
}
