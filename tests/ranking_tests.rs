// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group leaderboard tests against the in-memory store.

use chrono::NaiveDate;
use std::time::Duration;
use study_streak::config::Config;
use study_streak::db::{GroupStore, MemoryDb, PostStore, UserStore};
use study_streak::error::{AppError, Result};
use study_streak::models::{Group, Post, PostDuration, UserActivity};
use study_streak::ActivityEngine;

mod common;
use common::TestEnv;

fn ids(members: &[&str]) -> Vec<String> {
    members.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_leaderboard_minutes_posts_and_streaks() {
    let env = TestEnv::new("2024-01-02");
    for user in ["a", "b", "c"] {
        env.add_user(user);
    }
    env.add_group("g1", &["a", "b", "c"]);

    env.create_post("p1", "a", "g1", "2024-01-01T09:00:00Z", 120)
        .await
        .unwrap();
    env.create_post("p2", "a", "g1", "2024-01-02T09:00:00Z", 180)
        .await
        .unwrap();
    env.create_post("p3", "b", "g1", "2024-01-02T10:00:00Z", 150)
        .await
        .unwrap();
    // Other group's minutes never leak in
    env.create_post("p4", "c", "g2", "2024-01-02T10:00:00Z", 999)
        .await
        .unwrap();

    let rows = env
        .engine
        .compute_ranking("g1", &ids(&["c", "b", "a"]))
        .await
        .unwrap();

    let order: Vec<_> = rows.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);

    assert_eq!(rows[0].total_minutes, 300);
    assert_eq!(rows[0].post_count, 2);
    assert_eq!(rows[0].group_streak, 2);
    assert_eq!(rows[0].study_hours, 5);
    assert_eq!(rows[0].study_minutes_remainder, 0);

    assert_eq!(rows[1].total_minutes, 150);
    assert_eq!(rows[1].post_count, 1);
    assert_eq!(rows[1].study_hours, 2);
    assert_eq!(rows[1].study_minutes_remainder, 30);

    assert_eq!(rows[2].total_minutes, 0);
    assert_eq!(rows[2].post_count, 0);
    assert_eq!(rows[2].group_streak, 0);
}

#[tokio::test]
async fn test_ranking_reflects_deletes() {
    let env = TestEnv::new("2024-01-02");
    env.add_user("a");
    env.add_user("b");
    env.add_group("g1", &["a", "b"]);

    env.create_post("p1", "a", "g1", "2024-01-02T09:00:00Z", 100)
        .await
        .unwrap();
    env.create_post("p2", "b", "g1", "2024-01-02T09:00:00Z", 60)
        .await
        .unwrap();
    env.delete_post("p1").await.unwrap();

    let rows = env
        .engine
        .compute_ranking("g1", &ids(&["a", "b"]))
        .await
        .unwrap();

    assert_eq!(rows[0].user_id, "b");
    assert_eq!(rows[1].user_id, "a");
    assert_eq!(rows[1].total_minutes, 0);
    assert_eq!(rows[1].group_streak, 0);
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let env = TestEnv::new("2024-01-02");

    let err = env
        .engine
        .compute_ranking("missing", &ids(&["a"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_group_without_members_is_empty() {
    let env = TestEnv::new("2024-01-02");
    env.add_group("g1", &[]);

    let rows = env.engine.compute_ranking("g1", &[]).await.unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_member_without_record_ranks_with_zero_streak() {
    let env = TestEnv::new("2024-01-02");
    env.add_user("a");
    env.add_group("g1", &["a", "newcomer"]);
    env.create_post("p1", "a", "g1", "2024-01-02T09:00:00Z", 45)
        .await
        .unwrap();

    let rows = env
        .engine
        .compute_ranking("g1", &ids(&["newcomer", "a"]))
        .await
        .unwrap();

    assert_eq!(rows[0].user_id, "a");
    assert_eq!(rows[1].user_id, "newcomer");
    assert_eq!(rows[1].group_streak, 0);
}

#[tokio::test]
async fn test_ranking_sorted_with_many_members() {
    let config = Config {
        ranking_concurrency: 3,
        ranking_timeout: Duration::from_secs(5),
        ..Config::default()
    };
    let env = TestEnv::with_config("2024-01-10", &config);

    let members: Vec<String> = (0..12).map(|i| format!("u{}", i)).collect();
    let member_refs: Vec<&str> = members.iter().map(String::as_str).collect();
    for m in &member_refs {
        env.add_user(m);
    }
    env.add_group("g1", &member_refs);

    for i in 0..30u32 {
        let user = &members[(i as usize * 5) % members.len()];
        let ts = format!("2024-01-{:02}T09:00:00Z", 1 + (i % 10));
        env.create_post(&format!("p{}", i), user, "g1", &ts, (i * 17) % 75)
            .await
            .unwrap();
    }

    let rows = env.engine.compute_ranking("g1", &members).await.unwrap();

    assert_eq!(rows.len(), members.len());
    for pair in rows.windows(2) {
        assert!(pair[0].total_minutes >= pair[1].total_minutes);
    }
}

#[tokio::test]
async fn test_ranking_storage_failure_surfaces() {
    let env = TestEnv::new("2024-01-02");
    env.add_group("g1", &["a"]);
    env.db.set_offline(true);

    let err = env
        .engine
        .compute_ranking("g1", &ids(&["a"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StorageUnavailable(_)));
}

/// Memory store whose group post query stalls, as a slow backend would.
#[derive(Clone)]
struct StalledGroupQueryDb {
    inner: MemoryDb,
    delay: Duration,
}

impl PostStore for StalledGroupQueryDb {
    async fn find_posts_by_user_and_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<Vec<Post>> {
        self.inner
            .find_posts_by_user_and_group(user_id, group_id)
            .await
    }

    async fn find_posts_by_group(&self, group_id: &str) -> Result<Vec<PostDuration>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_posts_by_group(group_id).await
    }

    async fn find_posts_by_user_on_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Post>> {
        self.inner.find_posts_by_user_on_date(user_id, date).await
    }

    async fn find_posts_by_user(&self, user_id: &str) -> Result<Vec<Post>> {
        self.inner.find_posts_by_user(user_id).await
    }
}

impl UserStore for StalledGroupQueryDb {
    async fn load_user(&self, user_id: &str) -> Result<Option<UserActivity>> {
        self.inner.load_user(user_id).await
    }

    async fn save_user(&self, user: &UserActivity) -> Result<u64> {
        self.inner.save_user(user).await
    }
}

impl GroupStore for StalledGroupQueryDb {
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        self.inner.get_group(group_id).await
    }
}

#[tokio::test]
async fn test_ranking_timeout_is_storage_unavailable() {
    let inner = MemoryDb::new();
    inner.upsert_user(UserActivity::new("a"));
    inner.upsert_group(Group {
        group_id: "g1".to_string(),
        name: "Slow group".to_string(),
        member_ids: ids(&["a"]),
    });
    let config = Config {
        ranking_timeout: Duration::from_millis(20),
        ..Config::default()
    };
    let engine = ActivityEngine::new(
        StalledGroupQueryDb {
            inner: inner.clone(),
            delay: Duration::from_secs(5),
        },
        &config,
    );

    let started = std::time::Instant::now();
    let err = engine
        .compute_ranking("g1", &ids(&["a"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StorageUnavailable(ref msg) if msg.contains("timed out")));
    assert!(started.elapsed() < Duration::from_secs(5));
    // Read path only: the user record is untouched
    assert_eq!(inner.load_user("a").await.unwrap().unwrap().version, 0);
}
