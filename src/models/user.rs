//! User activity record and group model for storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{ActivityLedger, GroupActivitySummary};

/// Derived activity state stored on the user document.
///
/// Every field except `user_id` is a cache over the post store and is only
/// written by the engine's recompute path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    /// User ID (also used as document ID)
    pub user_id: String,
    /// Days with at least one post, in any group
    #[serde(default)]
    pub activity: ActivityLedger,
    /// Current consecutive-day streak
    #[serde(default)]
    pub streak: u32,
    /// Most recent day with a post, in any group
    #[serde(default)]
    pub last_post_date: Option<NaiveDate>,
    /// Activity summary per group ID
    #[serde(default)]
    pub group_streaks: HashMap<String, GroupActivitySummary>,
    /// Optimistic concurrency counter, bumped by every successful save
    #[serde(default)]
    pub version: u64,
    /// Last recompute timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl UserActivity {
    /// Fresh record for a user who has never posted.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            activity: ActivityLedger::new(),
            streak: 0,
            last_post_date: None,
            group_streaks: HashMap::new(),
            version: 0,
            updated_at: String::new(),
        }
    }

    /// Summary for `group_id`, or an empty one if the user never posted there.
    pub fn group_summary(&self, group_id: &str) -> GroupActivitySummary {
        self.group_streaks.get(group_id).cloned().unwrap_or_default()
    }
}

/// Study group (owned by the membership service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID (also used as document ID)
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}
