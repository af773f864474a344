use serde::{Deserialize, Serialize};

/// A user identity.
///
/// The API key lives only in the `users.api_key` column — it is never part
/// of this struct, so it can never leak through a serialized response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Display name.
    pub name: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A compact user reference embedded in tweets, likes, and profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

/// Input for administrative user provisioning.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,

    /// Explicit API key; generated when absent.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Result of provisioning: the user plus the one-time echo of its API key.
///
/// This is the only place the key is ever returned.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedUser {
    pub user: User,
    pub api_key: String,
}
