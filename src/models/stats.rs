//! Per-group activity summaries stored on the user record.
//!
//! These are recomputed from the post store after every post lifecycle
//! event, so the leaderboard never has to scan a user's posts to show
//! their group activity count.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::Post;

/// Activity of one user inside one group.
///
/// Stored at: `users/{user_id}.group_streaks.{group_id}`
///
/// `streak` is the number of distinct days with a post in the group. It is
/// not a consecutive run, unlike the personal streak on the user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupActivitySummary {
    /// Distinct UTC days with at least one post in the group
    #[serde(default)]
    pub streak: u32,
    /// Total posts in the group
    #[serde(default)]
    pub total_posts: u32,
    /// Most recent post time in the group
    #[serde(default)]
    pub last_post_date: Option<DateTime<Utc>>,
}

impl GroupActivitySummary {
    /// Build the summary from every post of one (user, group) pair.
    pub fn from_posts(posts: &[Post]) -> Self {
        let active_days: HashSet<NaiveDate> = posts.iter().map(Post::date).collect();

        Self {
            streak: active_days.len() as u32,
            total_posts: posts.len() as u32,
            last_post_date: posts.iter().map(|p| p.created_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_post(id: &str, ts: DateTime<Utc>) -> Post {
        Post {
            post_id: id.to_string(),
            group_id: "g1".to_string(),
            user_id: "u1".to_string(),
            created_at: ts,
            duration: 30,
        }
    }

    #[test]
    fn test_empty_posts() {
        let summary = GroupActivitySummary::from_posts(&[]);
        assert_eq!(summary, GroupActivitySummary::default());
    }

    #[test]
    fn test_same_day_counts_once() {
        let posts = vec![
            make_post("1", Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()),
            make_post("2", Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()),
            make_post("3", Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap()),
        ];

        let summary = GroupActivitySummary::from_posts(&posts);

        assert_eq!(summary.streak, 1);
        assert_eq!(summary.total_posts, 3);
        assert_eq!(
            summary.last_post_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_gaps_do_not_reset_count() {
        let posts = vec![
            make_post("1", Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
            make_post("2", Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()),
            make_post("3", Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()),
        ];

        let summary = GroupActivitySummary::from_posts(&posts);

        assert_eq!(summary.streak, 3);
        assert_eq!(summary.total_posts, 3);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let posts = vec![
            make_post("1", Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
            make_post("2", Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()),
        ];

        let first = GroupActivitySummary::from_posts(&posts);
        let second = GroupActivitySummary::from_posts(&posts);

        assert_eq!(first, second);
    }
}
