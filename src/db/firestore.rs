// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (activity ledger, cached streaks, group summaries)
//! - Posts (read-only to the engine; written here only by tooling and tests)
//! - Groups (membership lookups for rankings and reconciliation)

use chrono::NaiveDate;

use crate::db::{collections, GroupStore, PostStore, UserStore};
use crate::error::AppError;
use crate::models::{Group, Post, PostDuration, UserActivity};
use crate::time_utils::format_utc_rfc3339;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!(
                "Failed to connect to Firestore Emulator: {}",
                e
            ))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::StorageUnavailable("Database not connected (offline mode)".to_string())
        })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user activity record by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserActivity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    /// Create or replace a user record without a version check.
    pub async fn upsert_user(&self, user: &UserActivity) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Delete a user record.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Versioned write of a user record inside a transaction.
    ///
    /// The user document is read through the transaction, so Firestore
    /// tracks it and aborts the commit if another writer changes it before
    /// we commit. An aborted commit or a stale `user.version` surfaces as
    /// `ConcurrentModification`.
    async fn save_user_versioned(&self, user: &UserActivity) -> Result<u64, AppError> {
        let client = self.get_client()?;

        let mut transaction = client.begin_transaction().await.map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to begin transaction: {}", e))
        })?;

        // Reads must carry the transaction ID to register for conflict detection
        let tx_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let current: Option<UserActivity> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user.user_id)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!("Failed to read user in transaction: {}", e))
            })?;

        let current = match current {
            Some(current) => current,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!("User {} not found", user.user_id)));
            }
        };

        if current.version != user.version {
            let _ = transaction.rollback().await;
            return Err(AppError::ConcurrentModification(format!(
                "User {} is at version {}, expected {}",
                user.user_id, current.version, user.version
            )));
        }

        let mut next = user.clone();
        next.version = user.version + 1;
        next.updated_at = format_utc_rfc3339(chrono::Utc::now());

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(&next)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::StorageUnavailable(format!("Failed to add user to transaction: {}", e))
            })?;

        transaction.commit().await.map_err(map_commit_error)?;

        Ok(next.version)
    }

    // ─── Group Operations ────────────────────────────────────────

    /// Get a group by ID.
    pub async fn get_group(&self, group_id: &str) -> Result<Option<Group>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GROUPS)
            .obj()
            .one(group_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    /// Create or replace a group.
    pub async fn upsert_group(&self, group: &Group) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GROUPS)
            .document_id(&group.group_id)
            .object(group)
            .execute()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    // ─── Post Operations ─────────────────────────────────────────

    /// Store a post.
    pub async fn set_post(&self, post: &Post) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::POSTS)
            .document_id(&post.post_id)
            .object(post)
            .execute()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Delete a post.
    pub async fn delete_post(&self, post_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::POSTS)
            .document_id(post_id)
            .execute()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn query_posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::POSTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }
}

/// Firestore reports optimistic-lock failures as aborted commits.
fn map_commit_error(e: impl std::fmt::Display) -> AppError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("aborted") || lower.contains("contention") {
        AppError::ConcurrentModification(format!("Transaction aborted: {}", msg))
    } else {
        AppError::StorageUnavailable(format!("Transaction commit failed: {}", msg))
    }
}

fn sort_posts(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.post_id.cmp(&b.post_id))
    });
    posts
}

impl PostStore for FirestoreDb {
    async fn find_posts_by_user_and_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<Vec<Post>, AppError> {
        let posts: Vec<Post> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::POSTS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("group_id").eq(group_id),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(sort_posts(posts))
    }

    async fn find_posts_by_group(&self, group_id: &str) -> Result<Vec<PostDuration>, AppError> {
        // Only the fields the leaderboard sums are fetched
        self.get_client()?
            .fluent()
            .select()
            .fields(firestore::paths!(PostDuration::{user_id, duration}))
            .from(collections::POSTS)
            .filter(|q| q.for_all([q.field("group_id").eq(group_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn find_posts_by_user_on_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Post>, AppError> {
        // created_at is stored as a string, so the day filter runs client-side
        let posts = self.query_posts_by_user(user_id).await?;
        Ok(sort_posts(
            posts.into_iter().filter(|p| p.date() == date).collect(),
        ))
    }

    async fn find_posts_by_user(&self, user_id: &str) -> Result<Vec<Post>, AppError> {
        Ok(sort_posts(self.query_posts_by_user(user_id).await?))
    }
}

impl UserStore for FirestoreDb {
    async fn load_user(&self, user_id: &str) -> Result<Option<UserActivity>, AppError> {
        self.get_user(user_id).await
    }

    async fn save_user(&self, user: &UserActivity) -> Result<u64, AppError> {
        self.save_user_versioned(user).await
    }
}

impl GroupStore for FirestoreDb {
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, AppError> {
        FirestoreDb::get_group(self, group_id).await
    }
}
