//! Authenticated principal, injected per-request by the server binary.
//!
//! Modules never look up credentials themselves. The auth middleware
//! resolves the `api-key` header to a `Principal` and stores it in the
//! request extensions; handlers extract it from there.

use serde::{Deserialize, Serialize};

/// The identity behind an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// User id of the caller.
    pub user_id: String,

    /// Display name, for logging and response payloads.
    pub name: String,
}
