use chirp_sql::SQLStore;

use crate::service::TimelineError;

/// Initialize the SQLite schema for all timeline resources.
///
/// The follow and like relations are edge sets: composite primary keys
/// make a duplicate edge impossible even under concurrent inserts, which
/// is what lets the mutation paths use `INSERT OR IGNORE`.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), TimelineError> {
    let statements = [
        // Tweets: one owner, immutable content
        "CREATE TABLE IF NOT EXISTS tweets (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_tweets_author ON tweets(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_tweets_created ON tweets(created_at)",

        // Media references: owned by at most one tweet, never shared
        "CREATE TABLE IF NOT EXISTS media (
            id TEXT PRIMARY KEY,
            tweet_id TEXT,
            blob_key TEXT NOT NULL UNIQUE,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_media_tweet ON media(tweet_id)",

        // Follow edges: follower → followee, set semantics
        "CREATE TABLE IF NOT EXISTS follows (
            follower_id TEXT NOT NULL,
            followee_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (follower_id, followee_id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id)",

        // Like edges: user → tweet, set semantics
        "CREATE TABLE IF NOT EXISTS likes (
            user_id TEXT NOT NULL,
            tweet_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, tweet_id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_likes_tweet ON likes(tweet_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| TimelineError::Storage(format!("timeline schema init: {e}")))?;
    }

    Ok(())
}
