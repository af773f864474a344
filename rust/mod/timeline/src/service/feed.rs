use tracing::debug;

use chirp_sql::Value;

use crate::model::FeedTweet;
use crate::service::{TimelineError, TimelineService};

impl TimelineService {
    /// Assemble the viewer's feed: every tweet by a followed author, ranked
    /// by popularity.
    ///
    /// The ordering key is total — `(like_count DESC, created_at DESC,
    /// id ASC)` — so two tweets with identical likes and timestamps still
    /// sort the same way on every call. Following nobody yields an empty
    /// feed, not an error.
    ///
    /// This is a pure read path. Each statement sees a committed state, but
    /// the feed as a whole is not a linearizable snapshot: likes and
    /// follows may move underneath between statements.
    pub fn build_feed(&self, viewer_id: &str) -> Result<Vec<FeedTweet>, TimelineError> {
        self.require_user(viewer_id)?;

        let authors = self.following_ids(viewer_id)?;
        if authors.is_empty() {
            debug!(viewer_id = %viewer_id, "feed requested with no follows");
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> =
            (1..=authors.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT t.id, t.author_id, t.content, t.created_at,
                    COALESCE(lc.like_count, 0) AS like_count
             FROM tweets t
             LEFT JOIN (
                 SELECT tweet_id, COUNT(user_id) AS like_count
                 FROM likes GROUP BY tweet_id
             ) lc ON lc.tweet_id = t.id
             WHERE t.author_id IN ({})
             ORDER BY like_count DESC, t.created_at DESC, t.id ASC",
            placeholders.join(", ")
        );
        let params: Vec<Value> = authors.iter().map(|a| Value::Text(a.clone())).collect();

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        let author_summaries = self.identity.user_summaries(&authors)?;

        let mut feed = Vec::with_capacity(rows.len());
        for row in &rows {
            let tweet_id = row.get_str("id").unwrap_or_default().to_string();
            let author_id = row.get_str("author_id").unwrap_or_default();
            // An author missing from the identity store would be a broken
            // reference; skip rather than fabricate.
            let Some(author) = author_summaries.get(author_id).cloned() else {
                continue;
            };
            feed.push(FeedTweet {
                content: row.get_str("content").unwrap_or_default().to_string(),
                created_at: row.get_str("created_at").unwrap_or_default().to_string(),
                attachments: self.attachment_keys(&tweet_id)?,
                like_count: row.get_i64("like_count").unwrap_or(0) as u64,
                id: tweet_id,
                author,
            });
        }

        debug!(viewer_id = %viewer_id, tweets = feed.len(), "feed assembled");
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::CreateTweet;
    use crate::service::testutil::{test_service, user};
    use crate::service::{TimelineError, TimelineService};

    fn tweet(svc: &TimelineService, author: &str, text: &str) -> String {
        svc.create_tweet(
            author,
            CreateTweet {
                content: text.into(),
                media_ids: vec![],
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn unknown_viewer_is_not_found() {
        let (_dir, svc) = test_service();
        assert!(matches!(
            svc.build_feed("ghost"),
            Err(TimelineError::NotFound(_))
        ));
    }

    #[test]
    fn no_follows_means_empty_feed() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");
        tweet(&svc, &b, "unseen");

        assert!(svc.build_feed(&a).unwrap().is_empty());
    }

    #[test]
    fn feed_contains_only_followed_authors() {
        let (_dir, svc) = test_service();
        let viewer = user(&svc, "viewer");
        let followed = user(&svc, "followed");
        let stranger = user(&svc, "stranger");

        svc.follow(&viewer, &followed).unwrap();
        let t = tweet(&svc, &followed, "in feed");
        tweet(&svc, &stranger, "not in feed");
        // Own tweets are not part of the feed either.
        tweet(&svc, &viewer, "mine");

        let feed = svc.build_feed(&viewer).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, t);
        assert_eq!(feed[0].author.id, followed);
    }

    #[test]
    fn popularity_outranks_recency() {
        // A follows B and C. B posts T1 (0 likes). C posted T2 earlier but
        // it has 3 likes. The feed must be [T2, T1].
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");
        let c = user(&svc, "c");
        let l1 = user(&svc, "l1");
        let l2 = user(&svc, "l2");

        svc.follow(&a, &b).unwrap();
        svc.follow(&a, &c).unwrap();

        let t2 = tweet(&svc, &c, "older but popular");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let t1 = tweet(&svc, &b, "fresh, no likes");

        svc.like(&b, &t2).unwrap();
        svc.like(&l1, &t2).unwrap();
        svc.like(&l2, &t2).unwrap();

        let feed = svc.build_feed(&a).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, t2);
        assert_eq!(feed[0].like_count, 3);
        assert_eq!(feed[1].id, t1);
        assert_eq!(feed[1].like_count, 0);
    }

    #[test]
    fn equal_likes_fall_back_to_recency() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");
        svc.follow(&a, &b).unwrap();

        let older = tweet(&svc, &b, "older");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = tweet(&svc, &b, "newer");

        let feed = svc.build_feed(&a).unwrap();
        assert_eq!(feed[0].id, newer);
        assert_eq!(feed[1].id, older);
    }

    #[test]
    fn feed_ordering_is_a_total_order() {
        let (_dir, svc) = test_service();
        let viewer = user(&svc, "viewer");
        let mut likers = Vec::new();
        for i in 0..4 {
            likers.push(user(&svc, &format!("liker{i}")));
        }

        let author = user(&svc, "author");
        svc.follow(&viewer, &author).unwrap();

        let mut ids = Vec::new();
        for i in 0..6 {
            let t = tweet(&svc, &author, &format!("tweet {i}"));
            for liker in likers.iter().take(i % 4) {
                svc.like(liker, &t).unwrap();
            }
            ids.push(t);
        }

        let feed = svc.build_feed(&viewer).unwrap();
        assert_eq!(feed.len(), ids.len());
        for pair in feed.windows(2) {
            let (x, y) = (&pair[0], &pair[1]);
            let ordered = x.like_count > y.like_count
                || (x.like_count == y.like_count && x.created_at > y.created_at)
                || (x.like_count == y.like_count
                    && x.created_at == y.created_at
                    && x.id < y.id);
            assert!(ordered, "feed out of order: {} before {}", x.id, y.id);
        }

        // Deterministic across repeated calls.
        let again = svc.build_feed(&viewer).unwrap();
        let first: Vec<_> = feed.iter().map(|t| t.id.clone()).collect();
        let second: Vec<_> = again.iter().map(|t| t.id.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn unfollow_drops_author_from_feed() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        svc.follow(&a, &b).unwrap();
        tweet(&svc, &b, "hello");
        assert_eq!(svc.build_feed(&a).unwrap().len(), 1);

        svc.unfollow(&a, &b).unwrap();
        assert!(svc.build_feed(&a).unwrap().is_empty());
    }

    #[test]
    fn deleted_tweet_leaves_the_feed() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        svc.follow(&a, &b).unwrap();
        let t = tweet(&svc, &b, "going away");
        svc.like(&a, &t).unwrap();

        svc.delete_tweet(&b, &t).unwrap();
        assert!(svc.build_feed(&a).unwrap().is_empty());
    }
}
