pub mod feed;
pub mod follow;
pub mod like;
pub mod media;
pub mod schema;
pub mod tweet;

use std::sync::Arc;

use thiserror::Error;

use chirp_blob::BlobStore;
use chirp_sql::{SQLStore, Value};
use identity::service::{IdentityError, IdentityService};

use crate::model::Tweet;

/// Timeline service error type.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl From<TimelineError> for chirp_core::ServiceError {
    fn from(e: TimelineError) -> Self {
        match e {
            TimelineError::NotFound(m) => chirp_core::ServiceError::NotFound(m),
            TimelineError::Forbidden(m) => chirp_core::ServiceError::Forbidden(m),
            TimelineError::Validation(m) => chirp_core::ServiceError::Validation(m),
            TimelineError::Storage(m) => chirp_core::ServiceError::Storage(m),
            TimelineError::Internal(m) => chirp_core::ServiceError::Internal(m),
        }
    }
}

impl From<IdentityError> for TimelineError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotFound(m) => TimelineError::NotFound(m),
            IdentityError::Conflict(m) | IdentityError::Validation(m) => {
                TimelineError::Validation(m)
            }
            IdentityError::Storage(m) => TimelineError::Storage(m),
        }
    }
}

/// Tweets, follow edges, like edges, and feed assembly over the shared
/// SQL store. Holds the identity service for referential checks and the
/// blob store for media bytes.
pub struct TimelineService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) identity: Arc<IdentityService>,
}

impl TimelineService {
    /// Create the service and initialise the timeline tables.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        identity: Arc<IdentityService>,
    ) -> Result<Self, TimelineError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self {
            sql,
            blob,
            identity,
        })
    }

    /// Fetch a tweet row or fail with NotFound.
    pub(crate) fn tweet_or_not_found(&self, tweet_id: &str) -> Result<Tweet, TimelineError> {
        let rows = self
            .sql
            .query(
                "SELECT id, author_id, content, created_at FROM tweets WHERE id = ?1",
                &[Value::Text(tweet_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        rows.first()
            .map(row_to_tweet)
            .ok_or_else(|| TimelineError::NotFound(format!("tweet '{tweet_id}' not found")))
    }

    /// Fail with NotFound unless the user is known to the identity store.
    pub(crate) fn require_user(&self, user_id: &str) -> Result<(), TimelineError> {
        if self.identity.user_exists(user_id)? {
            Ok(())
        } else {
            Err(TimelineError::NotFound(format!("user '{user_id}' not found")))
        }
    }
}

pub(crate) fn row_to_tweet(row: &chirp_sql::Row) -> Tweet {
    Tweet {
        id: row.get_str("id").unwrap_or_default().to_string(),
        author_id: row.get_str("author_id").unwrap_or_default().to_string(),
        content: row.get_str("content").unwrap_or_default().to_string(),
        created_at: row.get_str("created_at").unwrap_or_default().to_string(),
    }
}
