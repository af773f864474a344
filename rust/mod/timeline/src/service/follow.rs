use tracing::info;

use chirp_core::now_rfc3339;
use chirp_sql::Value;

use crate::model::Profile;
use crate::service::{TimelineError, TimelineService};

impl TimelineService {
    /// Follow another user.
    ///
    /// Self-follow is a validation error; both users must exist. Following
    /// someone already followed is a successful no-op, so client retries
    /// are always safe.
    pub fn follow(&self, follower_id: &str, followee_id: &str) -> Result<(), TimelineError> {
        self.validate_follow_pair(follower_id, followee_id)?;

        self.sql
            .exec(
                "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
                 VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(follower_id.to_string()),
                    Value::Text(followee_id.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        info!(follower = %follower_id, followee = %followee_id, "follow");
        Ok(())
    }

    /// Unfollow a user. Removing an absent edge is a successful no-op.
    pub fn unfollow(&self, follower_id: &str, followee_id: &str) -> Result<(), TimelineError> {
        self.validate_follow_pair(follower_id, followee_id)?;

        self.sql
            .exec(
                "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
                &[
                    Value::Text(follower_id.to_string()),
                    Value::Text(followee_id.to_string()),
                ],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        info!(follower = %follower_id, followee = %followee_id, "unfollow");
        Ok(())
    }

    /// The set of user ids this user follows. No defined order — the feed
    /// imposes its own ordering downstream.
    pub fn following_ids(&self, user_id: &str) -> Result<Vec<String>, TimelineError> {
        let rows = self
            .sql
            .query(
                "SELECT followee_id FROM follows WHERE follower_id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("followee_id").map(str::to_string))
            .collect())
    }

    /// A user's profile: the user record plus both sides of the follow graph.
    pub fn profile(&self, user_id: &str) -> Result<Profile, TimelineError> {
        let user = self.identity.get_user(user_id)?;

        let follower_ids: Vec<String> = self
            .sql
            .query(
                "SELECT follower_id FROM follows WHERE followee_id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| TimelineError::Storage(e.to_string()))?
            .iter()
            .filter_map(|r| r.get_str("follower_id").map(str::to_string))
            .collect();

        let following_ids = self.following_ids(user_id)?;

        let mut all_ids = follower_ids.clone();
        all_ids.extend(following_ids.iter().cloned());
        let summaries = self.identity.user_summaries(&all_ids)?;

        let mut followers: Vec<_> = follower_ids
            .iter()
            .filter_map(|id| summaries.get(id).cloned())
            .collect();
        let mut following: Vec<_> = following_ids
            .iter()
            .filter_map(|id| summaries.get(id).cloned())
            .collect();
        followers.sort_by(|a, b| a.id.cmp(&b.id));
        following.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Profile {
            follower_count: followers.len(),
            following_count: following.len(),
            user,
            followers,
            following,
        })
    }

    /// Shared validation for follow/unfollow: no self-edges, both ends known.
    fn validate_follow_pair(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<(), TimelineError> {
        if follower_id == followee_id {
            return Err(TimelineError::Validation(
                "cannot follow yourself".into(),
            ));
        }
        self.require_user(follower_id)?;
        self.require_user(followee_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::service::testutil::{test_service, user};
    use crate::service::TimelineError;

    #[test]
    fn follow_and_unfollow() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        svc.follow(&a, &b).unwrap();
        assert_eq!(svc.following_ids(&a).unwrap(), vec![b.clone()]);

        svc.unfollow(&a, &b).unwrap();
        assert!(svc.following_ids(&a).unwrap().is_empty());
    }

    #[test]
    fn self_follow_rejected_and_leaves_no_edge() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");

        let err = svc.follow(&a, &a).unwrap_err();
        assert!(matches!(err, TimelineError::Validation(_)));
        assert!(svc.following_ids(&a).unwrap().is_empty());

        // Same rule on the removal path.
        assert!(matches!(
            svc.unfollow(&a, &a),
            Err(TimelineError::Validation(_))
        ));
    }

    #[test]
    fn follow_unknown_user_is_not_found() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        assert!(matches!(
            svc.follow(&a, "ghost"),
            Err(TimelineError::NotFound(_))
        ));
        assert!(matches!(
            svc.follow("ghost", &a),
            Err(TimelineError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_follow_is_idempotent() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        svc.follow(&a, &b).unwrap();
        svc.follow(&a, &b).unwrap();
        assert_eq!(svc.following_ids(&a).unwrap().len(), 1);
    }

    #[test]
    fn unfollow_absent_edge_is_idempotent() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        svc.unfollow(&a, &b).unwrap();
        svc.unfollow(&a, &b).unwrap();
    }

    #[test]
    fn profile_reflects_both_directions() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");
        let c = user(&svc, "c");

        svc.follow(&a, &b).unwrap();
        svc.follow(&c, &a).unwrap();

        let profile = svc.profile(&a).unwrap();
        assert_eq!(profile.following_count, 1);
        assert_eq!(profile.following[0].id, b);
        assert_eq!(profile.follower_count, 1);
        assert_eq!(profile.followers[0].id, c);
    }

    #[test]
    fn profile_counts_after_churn() {
        let (_dir, svc) = test_service();
        let a = user(&svc, "a");
        let b = user(&svc, "b");

        svc.follow(&a, &b).unwrap();
        svc.unfollow(&a, &b).unwrap();
        svc.follow(&a, &b).unwrap();

        let profile = svc.profile(&b).unwrap();
        assert_eq!(profile.follower_count, 1);
        assert_eq!(svc.profile(&a).unwrap().following_count, 1);
    }

    #[test]
    fn profile_of_unknown_user_is_not_found() {
        let (_dir, svc) = test_service();
        assert!(matches!(
            svc.profile("ghost"),
            Err(TimelineError::NotFound(_))
        ));
    }
}
