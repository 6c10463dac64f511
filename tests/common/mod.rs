// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use study_streak::clock::FixedClock;
use study_streak::config::Config;
use study_streak::db::{FirestoreDb, MemoryDb};
use study_streak::models::{Group, Post, PostCreated, PostDeleted, UserActivity};
use study_streak::ActivityEngine;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Parse a `YYYY-MM-DD` date.
#[allow(dead_code)]
pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Parse an RFC3339 timestamp.
#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid test timestamp")
        .with_timezone(&Utc)
}

/// In-memory engine with a clock pinned to `today` and the given users/group.
#[allow(dead_code)]
pub struct TestEnv {
    pub db: MemoryDb,
    pub clock: Arc<FixedClock>,
    pub engine: ActivityEngine<MemoryDb>,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new(today: &str) -> Self {
        Self::with_config(today, &Config::default())
    }

    pub fn with_config(today: &str, config: &Config) -> Self {
        let db = MemoryDb::new();
        let clock = Arc::new(FixedClock::at_date(day(today)));
        let engine = ActivityEngine::new(db.clone(), config).with_clock(clock.clone());
        Self { db, clock, engine }
    }

    pub fn add_user(&self, user_id: &str) {
        self.db.upsert_user(UserActivity::new(user_id));
    }

    pub fn add_group(&self, group_id: &str, member_ids: &[&str]) {
        self.db.upsert_group(Group {
            group_id: group_id.to_string(),
            name: format!("Group {}", group_id),
            member_ids: member_ids.iter().map(|s| s.to_string()).collect(),
        });
    }

    pub fn set_today(&self, today: &str) {
        self.clock.set_date(day(today));
    }

    /// Commit a post and run the create hook, as the post service would.
    pub async fn create_post(
        &self,
        post_id: &str,
        user_id: &str,
        group_id: &str,
        created_at: &str,
        minutes: u32,
    ) -> study_streak::error::Result<UserActivity> {
        let post = Post {
            post_id: post_id.to_string(),
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            created_at: parse_time(created_at),
            duration: minutes,
        };
        self.db.insert_post(post);

        self.engine
            .on_post_created(&PostCreated {
                user_id: user_id.to_string(),
                group_id: group_id.to_string(),
                post_date: created_at.to_string(),
                duration_minutes: i64::from(minutes),
            })
            .await
    }

    /// Remove a post and run the delete hook.
    pub async fn delete_post(&self, post_id: &str) -> study_streak::error::Result<UserActivity> {
        let post = self.db.remove_post(post_id).expect("post exists");

        self.engine
            .on_post_deleted(&PostDeleted {
                user_id: post.user_id.clone(),
                group_id: post.group_id.clone(),
                post_date: post.created_at.to_rfc3339(),
            })
            .await
    }
}
