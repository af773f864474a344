//! Identity module — user records and API-key authentication.
//!
//! # Resources
//!
//! - **User** — a principal with a display name and an opaque API key
//!
//! Accounts are provisioned administratively; there is no self-service
//! registration, users are immutable once created, and the core never
//! deletes them.
//!
//! # Usage
//!
//! ```ignore
//! use identity::IdentityModule;
//!
//! let module = IdentityModule::new(sql)?;
//! let router = module.routes(); // Mount under /identity
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use chirp_core::Module;
use chirp_sql::SQLStore;

use crate::service::IdentityService;

/// Identity module implementing the Module trait.
pub struct IdentityModule {
    service: Arc<IdentityService>,
}

impl IdentityModule {
    /// Create a new IdentityModule and initialise its schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, chirp_core::ServiceError> {
        let service = Arc::new(IdentityService::new(sql)?);
        Ok(Self { service })
    }

    /// Get a reference to the underlying IdentityService.
    pub fn service(&self) -> &Arc<IdentityService> {
        &self.service
    }
}

impl Module for IdentityModule {
    fn name(&self) -> &str {
        "identity"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
