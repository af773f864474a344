use tracing::info;

use chirp_core::now_rfc3339;
use chirp_sql::Value;

use crate::service::{TimelineError, TimelineService};
use identity::model::UserSummary;

impl TimelineService {
    /// Like a tweet. Liking a tweet twice is a successful no-op.
    ///
    /// Existence check and insert are one statement: the edge only lands
    /// if the tweet row is still there, so a concurrent `delete_tweet`
    /// cascade cannot strand an orphan like edge.
    pub fn like(&self, user_id: &str, tweet_id: &str) -> Result<(), TimelineError> {
        self.require_user(user_id)?;

        let affected = self
            .sql
            .exec(
                "INSERT OR IGNORE INTO likes (user_id, tweet_id, created_at)
                 SELECT ?1, ?2, ?3
                 WHERE EXISTS (SELECT 1 FROM tweets WHERE id = ?2)",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(tweet_id.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        if affected == 0 {
            // Zero rows means either the tweet is gone or the edge already
            // existed. Only the former is an error.
            self.tweet_or_not_found(tweet_id)?;
        }

        info!(user_id = %user_id, tweet_id = %tweet_id, "like");
        Ok(())
    }

    /// Remove a like. Removing an absent like is a successful no-op.
    pub fn unlike(&self, user_id: &str, tweet_id: &str) -> Result<(), TimelineError> {
        self.require_user(user_id)?;

        self.sql
            .exec(
                "DELETE FROM likes WHERE user_id = ?1 AND tweet_id = ?2",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(tweet_id.to_string()),
                ],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        info!(user_id = %user_id, tweet_id = %tweet_id, "unlike");
        Ok(())
    }

    /// Count of distinct liking users. Set semantics mean a user can never
    /// be counted twice.
    pub fn like_count(&self, tweet_id: &str) -> Result<u64, TimelineError> {
        let rows = self
            .sql
            .query(
                "SELECT COUNT(*) AS n FROM likes WHERE tweet_id = ?1",
                &[Value::Text(tweet_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        Ok(rows.first().and_then(|r| r.get_i64("n")).unwrap_or(0) as u64)
    }

    /// The users who liked a tweet, for detail display. Sorted by id for
    /// a stable response shape.
    pub fn likers_of(&self, tweet_id: &str) -> Result<Vec<UserSummary>, TimelineError> {
        let ids: Vec<String> = self
            .sql
            .query(
                "SELECT user_id FROM likes WHERE tweet_id = ?1 ORDER BY user_id ASC",
                &[Value::Text(tweet_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?
            .iter()
            .filter_map(|r| r.get_str("user_id").map(str::to_string))
            .collect();

        let summaries = self.identity.user_summaries(&ids)?;
        Ok(ids
            .iter()
            .filter_map(|id| summaries.get(id).cloned())
            .collect())
    }
}
