use serde::{Deserialize, Serialize};

use identity::model::{User, UserSummary};

/// Maximum tweet content length in characters.
pub const MAX_CONTENT_LEN: usize = 280;

/// A tweet as stored. Exactly one owner; the owner existed when it was
/// created and tweets never change hands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Owning user id. Non-owning reference into the identity store.
    pub author_id: String,

    /// Text body, possibly empty when media is attached.
    pub content: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A media reference: a stored blob attached to (at most) one tweet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: String,

    /// Owning tweet id; None while uploaded but not yet attached.
    pub tweet_id: Option<String>,

    /// Key into the blob store. The service never reads the bytes back.
    pub blob_key: String,

    /// Attachment order within the owning tweet.
    pub position: i64,
}

/// Input for creating a tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTweet {
    #[serde(default)]
    pub content: String,

    /// Previously uploaded media ids, in display order.
    #[serde(default)]
    pub media_ids: Vec<String>,
}

/// A tweet expanded for detail display.
#[derive(Debug, Clone, Serialize)]
pub struct TweetDetail {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub author: UserSummary,
    /// Blob keys of attached media, in attachment order.
    pub attachments: Vec<String>,
    pub likes: Vec<UserSummary>,
    pub like_count: u64,
}

/// A tweet as it appears in the ranked feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedTweet {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub author: UserSummary,
    pub attachments: Vec<String>,
    pub like_count: u64,
}

/// A user profile: the user plus both sides of the follow graph.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub follower_count: usize,
    pub following_count: usize,
}
