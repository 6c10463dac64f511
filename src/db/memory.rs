// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store backed by `DashMap`.
//!
//! Implements the same contracts as the Firestore store, including
//! versioned saves, so the engine can run in tests and local tooling
//! without an emulator. Two fault switches mirror what Firestore does
//! under load: going offline and rejecting saves with a write conflict.

use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::db::{GroupStore, PostStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{Group, Post, PostDuration, UserActivity};

#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<String, UserActivity>>,
    posts: Arc<DashMap<String, Post>>,
    groups: Arc<DashMap<String, Group>>,
    offline: Arc<AtomicBool>,
    pending_conflicts: Arc<AtomicU32>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a user record, bypassing the version check.
    pub fn upsert_user(&self, user: UserActivity) {
        self.users.insert(user.user_id.clone(), user);
    }

    pub fn delete_user(&self, user_id: &str) -> Option<UserActivity> {
        self.users.remove(user_id).map(|(_, user)| user)
    }

    pub fn upsert_group(&self, group: Group) {
        self.groups.insert(group.group_id.clone(), group);
    }

    /// Commit a post, as the post service would before notifying the engine.
    pub fn insert_post(&self, post: Post) {
        self.posts.insert(post.post_id.clone(), post);
    }

    pub fn remove_post(&self, post_id: &str) -> Option<Post> {
        self.posts.remove(post_id).map(|(_, post)| post)
    }

    /// While offline every operation fails with `StorageUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reject the next `count` saves as if another writer got there first.
    pub fn inject_save_conflicts(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::StorageUnavailable(
                "Database not connected (offline mode)".to_string(),
            ));
        }
        Ok(())
    }

    fn take_injected_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn collect_posts<F>(&self, predicate: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        // DashMap iteration order is arbitrary
        posts.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.post_id.cmp(&b.post_id))
        });
        posts
    }
}

impl PostStore for MemoryDb {
    async fn find_posts_by_user_and_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<Vec<Post>> {
        self.check_online()?;
        Ok(self.collect_posts(|p| p.user_id == user_id && p.group_id == group_id))
    }

    async fn find_posts_by_group(&self, group_id: &str) -> Result<Vec<PostDuration>> {
        self.check_online()?;
        Ok(self
            .collect_posts(|p| p.group_id == group_id)
            .iter()
            .map(PostDuration::from)
            .collect())
    }

    async fn find_posts_by_user_on_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Post>> {
        self.check_online()?;
        Ok(self.collect_posts(|p| p.user_id == user_id && p.date() == date))
    }

    async fn find_posts_by_user(&self, user_id: &str) -> Result<Vec<Post>> {
        self.check_online()?;
        Ok(self.collect_posts(|p| p.user_id == user_id))
    }
}

impl UserStore for MemoryDb {
    async fn load_user(&self, user_id: &str) -> Result<Option<UserActivity>> {
        self.check_online()?;
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn save_user(&self, user: &UserActivity) -> Result<u64> {
        self.check_online()?;

        if self.take_injected_conflict() {
            return Err(AppError::ConcurrentModification(format!(
                "User {} was modified concurrently",
                user.user_id
            )));
        }

        let mut stored = self
            .users
            .get_mut(&user.user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

        if stored.version != user.version {
            return Err(AppError::ConcurrentModification(format!(
                "User {} is at version {}, expected {}",
                user.user_id, stored.version, user.version
            )));
        }

        let mut next = user.clone();
        next.version = user.version + 1;
        *stored = next;

        Ok(user.version + 1)
    }
}

impl GroupStore for MemoryDb {
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        self.check_online()?;
        Ok(self.groups.get(group_id).map(|g| g.value().clone()))
    }
}
