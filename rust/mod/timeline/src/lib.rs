//! Timeline module — tweets, follows, likes, and the ranked feed.
//!
//! # Resources
//!
//! - **Tweet** — a content unit with optional attached media
//! - **Follow edge** — directed user→user relation (a set, not a multiset)
//! - **Like edge** — directed user→tweet relation, same set semantics
//! - **Feed** — the viewer's followed-author tweets, popularity-ranked
//!
//! Referential integrity is enforced at the boundary: every mutation
//! validates its user/tweet references before acting. The one cross-store
//! cascade (tweet deletion removing media and likes) runs as a single
//! transaction.
//!
//! # Usage
//!
//! ```ignore
//! use timeline::TimelineModule;
//!
//! let module = TimelineModule::new(sql, blob, identity_service)?;
//! let router = module.routes(); // Mount under /timeline
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use chirp_blob::BlobStore;
use chirp_core::Module;
use chirp_sql::SQLStore;
use identity::service::IdentityService;

use crate::service::TimelineService;

/// Timeline module implementing the Module trait.
pub struct TimelineModule {
    service: Arc<TimelineService>,
}

impl TimelineModule {
    /// Create a new TimelineModule and initialise its schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        identity: Arc<IdentityService>,
    ) -> Result<Self, chirp_core::ServiceError> {
        let service = Arc::new(TimelineService::new(sql, blob, identity)?);
        Ok(Self { service })
    }

    /// Get a reference to the underlying TimelineService.
    pub fn service(&self) -> &Arc<TimelineService> {
        &self.service
    }
}

impl Module for TimelineModule {
    fn name(&self) -> &str {
        "timeline"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
