//! API-key authentication middleware.
//!
//! Extracts the static per-user key from the `api-key` header, resolves
//! it through the identity service, and provides a `Principal` to
//! downstream handlers via request extensions.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use chirp_core::{Principal, ServiceError};
use identity::service::{IdentityError, IdentityService};

/// Middleware that turns the `api-key` header into a `Principal`.
///
/// Public paths pass through untouched; everything else requires a key
/// that resolves to a known user.
pub async fn auth_middleware(
    State(identity): State<Arc<IdentityService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let api_key = request
        .headers()
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthorized("missing api-key header".into()))?;

    let user = identity.authenticate(api_key).map_err(|e| match e {
        IdentityError::NotFound(_) => ServiceError::Unauthorized("invalid API key".into()),
        other => ServiceError::from(other),
    })?;

    request.extensions_mut().insert(Principal {
        user_id: user.id,
        name: user.name,
    });

    Ok(next.run(request).await)
}

/// Check if a request path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version")
}

#[cfg(test)]
mod tests {
    use super::is_public_path;

    #[test]
    fn only_system_endpoints_are_public() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/version"));
        assert!(!is_public_path("/timeline/feed"));
        assert!(!is_public_path("/identity/users"));
    }
}
