//! Storage layer: store traits consumed by the engine, plus Firestore and
//! in-memory implementations.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use chrono::NaiveDate;
use std::future::Future;

use crate::error::Result;
use crate::models::{Group, Post, PostDuration, UserActivity};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
    pub const GROUPS: &str = "groups";
}

/// Read access to the post store (source of truth).
pub trait PostStore: Send + Sync {
    fn find_posts_by_user_and_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> impl Future<Output = Result<Vec<Post>>> + Send;

    /// Author and duration of every post in `group_id`.
    fn find_posts_by_group(
        &self,
        group_id: &str,
    ) -> impl Future<Output = Result<Vec<PostDuration>>> + Send;

    /// Posts by `user_id` whose UTC day is `date`, in any group.
    fn find_posts_by_user_on_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Post>>> + Send;

    fn find_posts_by_user(&self, user_id: &str)
        -> impl Future<Output = Result<Vec<Post>>> + Send;
}

/// Read/write access to user activity records.
pub trait UserStore: Send + Sync {
    fn load_user(&self, user_id: &str)
        -> impl Future<Output = Result<Option<UserActivity>>> + Send;

    /// Persist `user` if the stored version still equals `user.version`.
    ///
    /// Returns the new version. Fails with `ConcurrentModification` if the
    /// record changed since it was loaded and `NotFound` if it was deleted.
    fn save_user(&self, user: &UserActivity) -> impl Future<Output = Result<u64>> + Send;
}

/// Read access to group records.
pub trait GroupStore: Send + Sync {
    fn get_group(&self, group_id: &str) -> impl Future<Output = Result<Option<Group>>> + Send;
}
