// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity engine: keeps the derived streak state on user records in step
//! with the post store.
//!
//! Handles the core workflow after a post is created or deleted:
//! 1. Validate the event
//! 2. Take the per-user lock
//! 3. Load the user record and apply the change to the activity ledger
//! 4. Recompute the personal streak and the group summary from the post store
//! 5. Save with a version check, re-applying on conflict
//!
//! The post store is never written here. If a recompute fails after the post
//! was committed, the cached fields drift until `reconcile_user` rebuilds
//! them from posts alone.

use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::{GroupStore, PostStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{
    ActivityCalendar, ActivityLedger, GroupActivitySummary, Post, PostCreated, PostDeleted,
    RankingRow, UserActivity,
};
use crate::services::ranking;
use crate::services::streak::current_streak;
use crate::time_utils::format_utc_rfc3339;

/// Shared per-user locks serializing read-modify-write of user records.
pub type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// What happened to a post on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityChange {
    Created(NaiveDate),
    Deleted(NaiveDate),
}

/// Streak and ranking engine over a store implementing all three store traits.
#[derive(Clone)]
pub struct ActivityEngine<S> {
    store: S,
    clock: Arc<dyn Clock>,
    user_locks: UserLocks,
    max_attempts: u32,
    ranking_timeout: Duration,
    ranking_concurrency: usize,
}

impl<S> ActivityEngine<S>
where
    S: PostStore + UserStore + GroupStore,
{
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            user_locks: Arc::new(DashMap::new()),
            max_attempts: config.recompute_max_attempts.max(1),
            ranking_timeout: config.ranking_timeout,
            ranking_concurrency: config.ranking_concurrency,
        }
    }

    /// Replace the time source used for "today".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─── Post Lifecycle ──────────────────────────────────────────

    /// Update derived state after a post was committed.
    pub async fn on_post_created(&self, event: &PostCreated) -> Result<UserActivity> {
        let date = event.validated_date()?;
        self.recompute_or_log(
            &event.user_id,
            &event.group_id,
            ActivityChange::Created(date),
        )
        .await
    }

    /// Update derived state after a post was removed.
    pub async fn on_post_deleted(&self, event: &PostDeleted) -> Result<UserActivity> {
        let date = event.validated_date()?;
        self.recompute_or_log(
            &event.user_id,
            &event.group_id,
            ActivityChange::Deleted(date),
        )
        .await
    }

    async fn recompute_or_log(
        &self,
        user_id: &str,
        group_id: &str,
        change: ActivityChange,
    ) -> Result<UserActivity> {
        let result = self.recompute_activity(user_id, group_id, change).await;
        if let Err(e) = &result {
            tracing::error!(
                user_id,
                group_id,
                change = ?change,
                error = %e,
                code = e.code(),
                "Activity recompute failed, cached streak may drift until reconciled"
            );
        }
        result
    }

    /// The only code path that mutates a user's ledger, streak and group
    /// summaries in response to a post lifecycle event.
    pub async fn recompute_activity(
        &self,
        user_id: &str,
        group_id: &str,
        change: ActivityChange,
    ) -> Result<UserActivity> {
        let updated = self
            .update_user(user_id, |user| self.apply_change(user, group_id, change))
            .await?;

        tracing::info!(
            user_id,
            group_id,
            change = ?change,
            streak = updated.streak,
            active_days = updated.activity.len(),
            "Activity recomputed"
        );

        Ok(updated)
    }

    async fn apply_change(
        &self,
        mut user: UserActivity,
        group_id: &str,
        change: ActivityChange,
    ) -> Result<UserActivity> {
        let now = self.clock.now();
        let today = self.clock.today();

        match change {
            ActivityChange::Created(date) => {
                user.activity.mark(date);
                user.last_post_date = Some(today);
            }
            ActivityChange::Deleted(date) => {
                let remaining = self
                    .store
                    .find_posts_by_user_on_date(&user.user_id, date)
                    .await?;
                if remaining.is_empty() {
                    user.activity.unmark(date);
                } else {
                    // The day stays active; re-mark it in case the ledger had drifted
                    user.activity.mark(date);
                    tracing::debug!(
                        user_id = %user.user_id,
                        %date,
                        remaining = remaining.len(),
                        "Other posts remain on date, day kept active"
                    );
                }
                user.last_post_date = user.activity.latest();
            }
        }

        user.streak = current_streak(&user.activity, today);

        let group_posts = self
            .store
            .find_posts_by_user_and_group(&user.user_id, group_id)
            .await?;
        user.group_streaks.insert(
            group_id.to_string(),
            GroupActivitySummary::from_posts(&group_posts),
        );

        user.updated_at = format_utc_rfc3339(now);
        Ok(user)
    }

    // ─── Reconciliation ──────────────────────────────────────────

    /// Rebuild all derived state for a user from their posts alone.
    ///
    /// Idempotent: running it twice against the same posts yields the same record.
    pub async fn reconcile_user(&self, user_id: &str) -> Result<UserActivity> {
        let updated = self
            .update_user(user_id, |user| self.rebuild_from_posts(user))
            .await?;

        tracing::info!(
            user_id,
            streak = updated.streak,
            active_days = updated.activity.len(),
            groups = updated.group_streaks.len(),
            "User activity reconciled"
        );

        Ok(updated)
    }

    async fn rebuild_from_posts(&self, mut user: UserActivity) -> Result<UserActivity> {
        let posts = self.store.find_posts_by_user(&user.user_id).await?;
        let today = self.clock.today();

        let mut by_group: HashMap<&str, Vec<Post>> = HashMap::new();
        for post in &posts {
            by_group
                .entry(post.group_id.as_str())
                .or_default()
                .push(post.clone());
        }

        user.activity = posts.iter().map(Post::date).collect::<ActivityLedger>();
        user.streak = current_streak(&user.activity, today);
        user.last_post_date = user.activity.latest();
        user.group_streaks = by_group
            .into_iter()
            .map(|(group_id, posts)| {
                (
                    group_id.to_string(),
                    GroupActivitySummary::from_posts(&posts),
                )
            })
            .collect();
        user.updated_at = format_utc_rfc3339(self.clock.now());

        Ok(user)
    }

    // ─── Read Paths ──────────────────────────────────────────────

    /// Group leaderboard, bounded by the configured timeout.
    pub async fn compute_ranking(
        &self,
        group_id: &str,
        member_ids: &[String],
    ) -> Result<Vec<RankingRow>> {
        tokio::time::timeout(
            self.ranking_timeout,
            ranking::compute_ranking(
                &self.store,
                group_id,
                member_ids,
                self.ranking_concurrency,
            ),
        )
        .await
        .map_err(|_| {
            tracing::warn!(group_id, timeout = ?self.ranking_timeout, "Ranking timed out");
            AppError::StorageUnavailable(format!("Ranking for group {} timed out", group_id))
        })?
    }

    /// Active days and current streak for calendar rendering.
    ///
    /// The streak is evaluated against today rather than read from the
    /// cache, so a run that lapsed since the last post shows as broken.
    pub async fn activity_calendar(&self, user_id: &str) -> Result<ActivityCalendar> {
        let user = self
            .store
            .load_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(ActivityCalendar {
            dates: user.activity.dates_ascending().collect(),
            streak: current_streak(&user.activity, self.clock.today()),
        })
    }

    // ─── Helper Methods ──────────────────────────────────────────

    /// Read-modify-write of one user record under the per-user lock.
    ///
    /// `build` gets a freshly loaded record on every attempt; conflicting
    /// saves are retried up to `max_attempts` times.
    async fn update_user<F, Fut>(&self, user_id: &str, build: F) -> Result<UserActivity>
    where
        F: Fn(UserActivity) -> Fut,
        Fut: Future<Output = Result<UserActivity>>,
    {
        let lock = self
            .user_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().await;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let Some(user) = self.store.load_user(user_id).await? else {
                tracing::warn!(user_id, "User not found, skipping activity update");
                return Err(AppError::NotFound(format!("User {} not found", user_id)));
            };

            let mut updated = build(user).await?;

            match self.store.save_user(&updated).await {
                Ok(version) => {
                    updated.version = version;
                    return Ok(updated);
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        user_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Write conflict on user record, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
