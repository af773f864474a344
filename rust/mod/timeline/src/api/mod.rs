mod feed;
mod follows;
mod likes;
mod media;
mod tweets;

use std::sync::Arc;

use axum::Router;

use crate::service::TimelineService;

/// Shared application state.
pub type AppState = Arc<TimelineService>;

/// Build the complete timeline API router.
///
/// All routes are relative — the caller nests them under `/timeline`.
/// Every handler expects a `Principal` in the request extensions, put
/// there by the server's auth middleware.
pub fn build_router(svc: Arc<TimelineService>) -> Router {
    Router::new()
        .merge(tweets::routes())
        .merge(likes::routes())
        .merge(follows::routes())
        .merge(media::routes())
        .merge(feed::routes())
        .with_state(svc)
}
