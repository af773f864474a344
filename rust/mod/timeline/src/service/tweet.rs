use tracing::{info, warn};

use chirp_core::{new_id, now_rfc3339};
use chirp_sql::{Statement, Value};

use crate::model::{CreateTweet, Tweet, TweetDetail, MAX_CONTENT_LEN};
use crate::service::{row_to_tweet, TimelineError, TimelineService};

impl TimelineService {
    /// Create a tweet, binding any previously uploaded media to it.
    ///
    /// A tweet must carry content: empty text with no media is rejected.
    /// Every referenced media id must exist and be unattached.
    pub fn create_tweet(
        &self,
        author_id: &str,
        input: CreateTweet,
    ) -> Result<Tweet, TimelineError> {
        self.require_user(author_id)?;

        if input.content.trim().is_empty() && input.media_ids.is_empty() {
            return Err(TimelineError::Validation(
                "a tweet must have text or media".into(),
            ));
        }
        if input.content.chars().count() > MAX_CONTENT_LEN {
            return Err(TimelineError::Validation(format!(
                "tweet content exceeds {MAX_CONTENT_LEN} characters"
            )));
        }

        // Validate all media references before touching anything.
        for media_id in &input.media_ids {
            let media = self.media_or_not_found(media_id)?;
            if media.tweet_id.is_some() {
                return Err(TimelineError::Validation(format!(
                    "media '{media_id}' is already attached to a tweet"
                )));
            }
        }

        let tweet = Tweet {
            id: new_id(),
            author_id: author_id.to_string(),
            content: input.content,
            created_at: now_rfc3339(),
        };

        // Insert the tweet and claim its media in one transaction so no
        // reader sees a tweet with half its attachments.
        let mut statements: Vec<Statement> = vec![(
            "INSERT INTO tweets (id, author_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4)"
                .into(),
            vec![
                Value::Text(tweet.id.clone()),
                Value::Text(tweet.author_id.clone()),
                Value::Text(tweet.content.clone()),
                Value::Text(tweet.created_at.clone()),
            ],
        )];
        for (position, media_id) in input.media_ids.iter().enumerate() {
            statements.push((
                "UPDATE media SET tweet_id = ?1, position = ?2
                 WHERE id = ?3 AND tweet_id IS NULL"
                    .into(),
                vec![
                    Value::Text(tweet.id.clone()),
                    Value::Integer(position as i64),
                    Value::Text(media_id.clone()),
                ],
            ));
        }

        let affected = self
            .sql
            .exec_batch(&statements)
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        // One row for the tweet plus one per claimed media. A shortfall
        // means another tweet claimed a media row between validation and
        // the batch; undo the creation rather than publish a tweet with
        // missing attachments.
        let expected = 1 + input.media_ids.len() as u64;
        if affected != expected {
            self.sql
                .exec_batch(&[
                    (
                        "UPDATE media SET tweet_id = NULL, position = 0
                         WHERE tweet_id = ?1"
                            .into(),
                        vec![Value::Text(tweet.id.clone())],
                    ),
                    (
                        "DELETE FROM tweets WHERE id = ?1".into(),
                        vec![Value::Text(tweet.id.clone())],
                    ),
                ])
                .map_err(|e| TimelineError::Storage(e.to_string()))?;
            return Err(TimelineError::Validation(
                "media is already attached to a tweet".into(),
            ));
        }

        info!(tweet_id = %tweet.id, author_id = %author_id, "created tweet");
        Ok(tweet)
    }

    /// Delete a tweet. Only the author may do this.
    ///
    /// The tweet row, its media rows, and every like edge pointing at it
    /// are removed in a single transaction — no observer can see the tweet
    /// gone while its likes survive, or the reverse. Blob bytes are
    /// removed after commit; a failure there leaves only unreferenced
    /// files behind.
    pub fn delete_tweet(&self, requester_id: &str, tweet_id: &str) -> Result<(), TimelineError> {
        let tweet = self.tweet_or_not_found(tweet_id)?;

        if tweet.author_id != requester_id {
            return Err(TimelineError::Forbidden(
                "only the author can delete a tweet".into(),
            ));
        }

        let blob_keys = self.attachment_keys(tweet_id)?;

        let id = Value::Text(tweet_id.to_string());
        self.sql
            .exec_batch(&[
                ("DELETE FROM likes WHERE tweet_id = ?1".into(), vec![id.clone()]),
                ("DELETE FROM media WHERE tweet_id = ?1".into(), vec![id.clone()]),
                ("DELETE FROM tweets WHERE id = ?1".into(), vec![id]),
            ])
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        for key in &blob_keys {
            if let Err(e) = self.blob.delete(key) {
                warn!(blob_key = %key, error = %e, "failed to delete media blob");
            }
        }

        info!(tweet_id = %tweet_id, requester_id = %requester_id, "deleted tweet");
        Ok(())
    }

    /// Get a tweet expanded with author, attachments, and likes.
    pub fn get_tweet(&self, tweet_id: &str) -> Result<TweetDetail, TimelineError> {
        let tweet = self.tweet_or_not_found(tweet_id)?;

        let author = self
            .identity
            .user_summaries(std::slice::from_ref(&tweet.author_id))?
            .remove(&tweet.author_id)
            .ok_or_else(|| {
                TimelineError::Internal(format!(
                    "tweet '{tweet_id}' references unknown author"
                ))
            })?;

        let likes = self.likers_of(tweet_id)?;
        let like_count = likes.len() as u64;

        Ok(TweetDetail {
            id: tweet.id,
            content: tweet.content,
            created_at: tweet.created_at,
            author,
            attachments: self.attachment_keys(tweet_id)?,
            likes,
            like_count,
        })
    }

    /// A single author's tweets, newest first; equal timestamps break by
    /// id ascending so repeated reads always agree.
    pub fn tweets_by_author(&self, author_id: &str) -> Result<Vec<Tweet>, TimelineError> {
        let rows = self
            .sql
            .query(
                "SELECT id, author_id, content, created_at FROM tweets
                 WHERE author_id = ?1 ORDER BY created_at DESC, id ASC",
                &[Value::Text(author_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        Ok(rows.iter().map(row_to_tweet).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::CreateTweet;
    use crate::service::testutil::{test_service, user};
    use crate::service::TimelineError;

    fn text_tweet(content: &str) -> CreateTweet {
        CreateTweet {
            content: content.into(),
            media_ids: vec![],
        }
    }

    #[test]
    fn create_and_get_tweet() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");

        let tweet = svc.create_tweet(&a, text_tweet("hello")).unwrap();
        let detail = svc.get_tweet(&tweet.id).unwrap();
        assert_eq!(detail.content, "hello");
        assert_eq!(detail.author.id, a);
        assert_eq!(detail.like_count, 0);
        assert!(detail.attachments.is_empty());
    }

    #[test]
    fn empty_tweet_rejected() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");

        let err = svc.create_tweet(&a, text_tweet("")).unwrap_err();
        assert!(matches!(err, TimelineError::Validation(_)));

        // Whitespace-only is empty too.
        let err = svc.create_tweet(&a, text_tweet("   ")).unwrap_err();
        assert!(matches!(err, TimelineError::Validation(_)));
    }

    #[test]
    fn oversized_tweet_rejected() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let long = "x".repeat(281);
        assert!(matches!(
            svc.create_tweet(&a, text_tweet(&long)),
            Err(TimelineError::Validation(_))
        ));
        // 280 exactly is fine.
        svc.create_tweet(&a, text_tweet(&"x".repeat(280))).unwrap();
    }

    #[test]
    fn unknown_author_rejected() {
        let (_dir, svc) = test_service();
        assert!(matches!(
            svc.create_tweet("ghost", text_tweet("hi")),
            Err(TimelineError::NotFound(_))
        ));
    }

    #[test]
    fn media_only_tweet_allowed() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let media = svc.upload_media("cat.png", b"png-bytes").unwrap();

        let tweet = svc
            .create_tweet(
                &a,
                CreateTweet {
                    content: "".into(),
                    media_ids: vec![media.id],
                },
            )
            .unwrap();

        let detail = svc.get_tweet(&tweet.id).unwrap();
        assert_eq!(detail.attachments.len(), 1);
    }

    #[test]
    fn media_attachment_order_preserved() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let m1 = svc.upload_media("one.png", b"1").unwrap();
        let m2 = svc.upload_media("two.png", b"2").unwrap();

        let tweet = svc
            .create_tweet(
                &a,
                CreateTweet {
                    content: "pics".into(),
                    media_ids: vec![m2.id.clone(), m1.id.clone()],
                },
            )
            .unwrap();

        let detail = svc.get_tweet(&tweet.id).unwrap();
        assert_eq!(detail.attachments, vec![m2.blob_key, m1.blob_key]);
    }

    #[test]
    fn media_cannot_be_attached_twice() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let media = svc.upload_media("cat.png", b"x").unwrap();

        svc.create_tweet(
            &a,
            CreateTweet {
                content: "first".into(),
                media_ids: vec![media.id.clone()],
            },
        )
        .unwrap();

        let err = svc
            .create_tweet(
                &a,
                CreateTweet {
                    content: "second".into(),
                    media_ids: vec![media.id],
                },
            )
            .unwrap_err();
        assert!(matches!(err, TimelineError::Validation(_)));
    }

    #[test]
    fn concurrent_media_claims_yield_one_owner() {
        let (_dir, svc) = test_service();
        let svc = std::sync::Arc::new(svc);
        let a = user(&svc, "a");
        let b = user(&svc, "b");
        let mut wins = 0;

        for _ in 0..20 {
            let media = svc.upload_media("cat.png", b"x").unwrap();

            let spawn = |author: String| {
                let svc = std::sync::Arc::clone(&svc);
                let media_id = media.id.clone();
                std::thread::spawn(move || {
                    svc.create_tweet(
                        &author,
                        CreateTweet {
                            content: "claim".into(),
                            media_ids: vec![media_id],
                        },
                    )
                })
            };
            let h1 = spawn(a.clone());
            let h2 = spawn(b.clone());
            let r1 = h1.join().unwrap();
            let r2 = h2.join().unwrap();

            assert!(
                r1.is_ok() != r2.is_ok(),
                "exactly one claim must win the media"
            );
            let winner = r1.or(r2).unwrap();
            let detail = svc.get_tweet(&winner.id).unwrap();
            assert_eq!(detail.attachments.len(), 1);
            wins += 1;
        }

        // Losing attempts must not leave half-created tweets behind.
        let total = svc.tweets_by_author(&a).unwrap().len()
            + svc.tweets_by_author(&b).unwrap().len();
        assert_eq!(total, wins);
    }

    #[test]
    fn unknown_media_id_is_not_found() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        assert!(matches!(
            svc.create_tweet(
                &a,
                CreateTweet {
                    content: "hi".into(),
                    media_ids: vec!["nope".into()],
                },
            ),
            Err(TimelineError::NotFound(_))
        ));
    }

    #[test]
    fn delete_by_non_author_is_forbidden() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        let tweet = svc.create_tweet(&b, text_tweet("mine")).unwrap();
        let err = svc.delete_tweet(&a, &tweet.id).unwrap_err();
        assert!(matches!(err, TimelineError::Forbidden(_)));

        // Still retrievable afterwards.
        assert!(svc.get_tweet(&tweet.id).is_ok());
    }

    #[test]
    fn delete_unknown_tweet_is_not_found() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        assert!(matches!(
            svc.delete_tweet(&a, "nope"),
            Err(TimelineError::NotFound(_))
        ));
    }

    #[test]
    fn delete_cascades_to_likes_media_and_blobs() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");
        let media = svc.upload_media("cat.png", b"bytes").unwrap();

        let tweet = svc
            .create_tweet(
                &a,
                CreateTweet {
                    content: "look".into(),
                    media_ids: vec![media.id],
                },
            )
            .unwrap();
        svc.like(&b, &tweet.id).unwrap();

        svc.delete_tweet(&a, &tweet.id).unwrap();

        assert!(matches!(
            svc.get_tweet(&tweet.id),
            Err(TimelineError::NotFound(_))
        ));
        assert!(svc.likers_of(&tweet.id).unwrap().is_empty());
        assert_eq!(svc.like_count(&tweet.id).unwrap(), 0);
        assert!(!svc.blob.exists(&media.blob_key).unwrap());
    }

    #[test]
    fn tweets_by_author_newest_first() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");

        let t1 = svc.create_tweet(&a, text_tweet("first")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let t2 = svc.create_tweet(&a, text_tweet("second")).unwrap();

        let tweets = svc.tweets_by_author(&a).unwrap();
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].id, t2.id);
        assert_eq!(tweets[1].id, t1.id);
    }
}
