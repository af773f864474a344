use tracing::info;

use chirp_core::{new_id, now_rfc3339};
use chirp_sql::Value;

use crate::model::Media;
use crate::service::{TimelineError, TimelineService};

impl TimelineService {
    /// Store uploaded image bytes and record an unattached media reference.
    ///
    /// The returned id is what clients pass in `CreateTweet::media_ids`;
    /// the row stays unattached until a tweet claims it. The service never
    /// inspects the bytes — content validation is the uploader's problem.
    pub fn upload_media(&self, filename: &str, data: &[u8]) -> Result<Media, TimelineError> {
        if data.is_empty() {
            return Err(TimelineError::Validation("empty upload".into()));
        }

        let id = new_id();
        let safe_name = sanitize_filename(filename);
        let blob_key = format!("media/{id}/{safe_name}");

        self.blob
            .put(&blob_key, data)
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        let media = Media {
            id,
            tweet_id: None,
            blob_key,
            position: 0,
        };

        self.sql
            .exec(
                "INSERT INTO media (id, tweet_id, blob_key, position, created_at)
                 VALUES (?1, NULL, ?2, 0, ?3)",
                &[
                    Value::Text(media.id.clone()),
                    Value::Text(media.blob_key.clone()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        info!(media_id = %media.id, size = data.len(), "uploaded media");
        Ok(media)
    }

    /// Fetch a media row or fail with NotFound.
    pub(crate) fn media_or_not_found(&self, media_id: &str) -> Result<Media, TimelineError> {
        let rows = self
            .sql
            .query(
                "SELECT id, tweet_id, blob_key, position FROM media WHERE id = ?1",
                &[Value::Text(media_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        rows.first()
            .map(|row| Media {
                id: row.get_str("id").unwrap_or_default().to_string(),
                tweet_id: row.get_str("tweet_id").map(str::to_string),
                blob_key: row.get_str("blob_key").unwrap_or_default().to_string(),
                position: row.get_i64("position").unwrap_or(0),
            })
            .ok_or_else(|| TimelineError::NotFound(format!("media '{media_id}' not found")))
    }

    /// Blob keys of a tweet's attachments, in attachment order.
    pub(crate) fn attachment_keys(&self, tweet_id: &str) -> Result<Vec<String>, TimelineError> {
        let rows = self
            .sql
            .query(
                "SELECT blob_key FROM media WHERE tweet_id = ?1
                 ORDER BY position ASC, id ASC",
                &[Value::Text(tweet_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("blob_key").map(str::to_string))
            .collect())
    }
}

/// Keep only a safe basename: path separators and parent-dir hops in a
/// client-supplied filename must never reach the blob key.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .replace("..", "");
    if base.is_empty() {
        "upload".to_string()
    } else {
        base
    }
}
