// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Study post model and post lifecycle events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::time_utils::{activity_date, parse_activity_date};

/// Stored post record. Owned by the post store; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID (also used as document ID)
    pub post_id: String,
    /// Group the post was made in
    pub group_id: String,
    /// Author
    pub user_id: String,
    /// Creation time (UTC)
    pub created_at: DateTime<Utc>,
    /// Study time in minutes
    #[serde(default)]
    pub duration: u32,
}

impl Post {
    /// UTC calendar day the post counts towards.
    pub fn date(&self) -> NaiveDate {
        activity_date(self.created_at)
    }
}

/// The two post fields a leaderboard needs.
///
/// Ranking queries select only these fields so a large group does not
/// pull every full post document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDuration {
    pub user_id: String,
    #[serde(default)]
    pub duration: u32,
}

impl From<&Post> for PostDuration {
    fn from(post: &Post) -> Self {
        Self {
            user_id: post.user_id.clone(),
            duration: post.duration,
        }
    }
}

/// Notification that a post was committed to the post store.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostCreated {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "group_id must not be empty"))]
    pub group_id: String,
    /// `YYYY-MM-DD` or RFC3339 timestamp
    pub post_date: String,
    #[validate(range(min = 0, message = "duration must not be negative"))]
    #[serde(default)]
    pub duration_minutes: i64,
}

impl PostCreated {
    /// Validate the event and return the calendar day it applies to.
    pub fn validated_date(&self) -> Result<NaiveDate> {
        self.validate()?;
        parse_activity_date(&self.post_date)
    }
}

/// Notification that a post was removed from the post store.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostDeleted {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "group_id must not be empty"))]
    pub group_id: String,
    /// `YYYY-MM-DD` or RFC3339 timestamp of the deleted post
    pub post_date: String,
}

impl PostDeleted {
    pub fn validated_date(&self) -> Result<NaiveDate> {
        self.validate()?;
        parse_activity_date(&self.post_date)
    }
}
