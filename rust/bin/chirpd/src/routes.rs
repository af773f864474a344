//! Route registration — collects all module routes + system endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use identity::service::IdentityService;

use crate::auth_middleware;

/// Build the complete router with all routes.
pub fn build_router(
    identity: Arc<IdentityService>,
    module_routes: Vec<(&str, Router)>,
) -> Router {
    // System endpoints (public, no state needed).
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    // Mount each module's routes under /{module_name}.
    // Module routes are already Router<()> (they called .with_state() internally).
    for (name, router) in module_routes {
        app = app.nest(&format!("/{name}"), router);
    }

    // Apply API-key auth middleware to all routes.
    app.layer(middleware::from_fn_with_state(
        identity,
        auth_middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "chirpd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
