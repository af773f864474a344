use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use chirp_core::{ListParams, ListResult, new_id, now_rfc3339};
use chirp_sql::{SQLStore, Value};

use crate::model::{CreateUser, ProvisionedUser, User, UserSummary};

/// Identity service error type.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(String),
}

impl From<IdentityError> for chirp_core::ServiceError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotFound(m) => chirp_core::ServiceError::NotFound(m),
            IdentityError::Conflict(m) => chirp_core::ServiceError::Conflict(m),
            IdentityError::Validation(m) => chirp_core::ServiceError::Validation(m),
            IdentityError::Storage(m) => chirp_core::ServiceError::Storage(m),
        }
    }
}

/// User records and API-key lookup over the shared SQL store.
pub struct IdentityService {
    sql: Arc<dyn SQLStore>,
}

impl IdentityService {
    /// Create the service and initialise the users table.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, IdentityError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                api_key TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_users_name ON users(name)",
        ];
        for stmt in &statements {
            sql.exec(stmt, &[])
                .map_err(|e| IdentityError::Storage(format!("identity schema init: {e}")))?;
        }
        Ok(Self { sql })
    }

    /// Provision a new user. Administrative — not reachable without a key
    /// belonging to an existing principal.
    pub fn create_user(&self, input: CreateUser) -> Result<ProvisionedUser, IdentityError> {
        if input.name.trim().is_empty() {
            return Err(IdentityError::Validation("user name must not be empty".into()));
        }

        let api_key = input.api_key.unwrap_or_else(new_id);
        if api_key.is_empty() {
            return Err(IdentityError::Validation("api_key must not be empty".into()));
        }

        // Check, then act; the UNIQUE constraint backstops concurrent races.
        let existing = self
            .sql
            .query(
                "SELECT id FROM users WHERE api_key = ?1",
                &[Value::Text(api_key.clone())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        if !existing.is_empty() {
            return Err(IdentityError::Conflict("api_key already in use".into()));
        }

        let user = User {
            id: new_id(),
            name: input.name,
            created_at: now_rfc3339(),
        };

        self.sql
            .exec(
                "INSERT INTO users (id, name, api_key, created_at) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(user.id.clone()),
                    Value::Text(user.name.clone()),
                    Value::Text(api_key.clone()),
                    Value::Text(user.created_at.clone()),
                ],
            )
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE") {
                    IdentityError::Conflict("api_key already in use".into())
                } else {
                    IdentityError::Storage(msg)
                }
            })?;

        info!(user_id = %user.id, "provisioned user");
        Ok(ProvisionedUser { user, api_key })
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT id, name, created_at FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;

        rows.first()
            .map(row_to_user)
            .ok_or_else(|| IdentityError::NotFound(format!("user '{id}' not found")))
    }

    /// List users with pagination, newest first.
    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<User>, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT id, name, created_at FROM users
                 ORDER BY created_at DESC, id ASC LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;

        let total = self
            .sql
            .query("SELECT COUNT(*) AS n FROM users", &[])
            .map_err(|e| IdentityError::Storage(e.to_string()))?
            .first()
            .and_then(|r| r.get_i64("n"))
            .unwrap_or(0) as usize;

        Ok(ListResult {
            items: rows.iter().map(row_to_user).collect(),
            total,
        })
    }

    /// Resolve an API key to its user. The credential lookup behind every
    /// authenticated request.
    pub fn authenticate(&self, api_key: &str) -> Result<User, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT id, name, created_at FROM users WHERE api_key = ?1",
                &[Value::Text(api_key.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;

        rows.first()
            .map(row_to_user)
            .ok_or_else(|| IdentityError::NotFound("unknown API key".into()))
    }

    /// Referential check used by other modules before inserting edges.
    pub fn user_exists(&self, id: &str) -> Result<bool, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT 1 FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    /// Batch lookup of user summaries for embedding in tweets and feeds.
    /// Ids that don't resolve are silently absent from the map.
    pub fn user_summaries(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, UserSummary>, IdentityError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> =
            (1..=ids.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT id, name FROM users WHERE id IN ({})",
            placeholders.join(", ")
        );
        let params: Vec<Value> = ids.iter().map(|id| Value::Text(id.clone())).collect();

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| IdentityError::Storage(e.to_string()))?;

        let mut map = HashMap::new();
        for row in &rows {
            if let (Some(id), Some(name)) = (row.get_str("id"), row.get_str("name")) {
                map.insert(
                    id.to_string(),
                    UserSummary {
                        id: id.to_string(),
                        name: name.to_string(),
                    },
                );
            }
        }
        Ok(map)
    }
}

fn row_to_user(row: &chirp_sql::Row) -> User {
    User {
        id: row.get_str("id").unwrap_or_default().to_string(),
        name: row.get_str("name").unwrap_or_default().to_string(),
        created_at: row.get_str("created_at").unwrap_or_default().to_string(),
    }
}
