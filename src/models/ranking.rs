// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only views: leaderboard rows and the activity calendar.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One member's line on a group leaderboard. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RankingRow {
    pub user_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_minutes: u64,
    pub post_count: u32,
    /// Distinct days with a post in this group (shown as "streak")
    pub group_streak: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub study_hours: u64,
    pub study_minutes_remainder: u32,
}

impl RankingRow {
    pub fn new(user_id: String, total_minutes: u64, post_count: u32, group_streak: u32) -> Self {
        Self {
            user_id,
            total_minutes,
            post_count,
            group_streak,
            study_hours: total_minutes / 60,
            study_minutes_remainder: (total_minutes % 60) as u32,
        }
    }
}

/// Activity calendar for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityCalendar {
    /// Active days, oldest first
    pub dates: Vec<NaiveDate>,
    pub streak: u32,
}

impl ActivityCalendar {
    /// Active days within one month, for month-grid rendering.
    pub fn dates_in_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        self.dates
            .iter()
            .filter(|d| d.year() == year && d.month() == month)
            .copied()
            .collect()
    }
}
