// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group leaderboard aggregation.
//!
//! Handles the read path:
//! 1. Check the group exists
//! 2. Sum study minutes and count posts per member from the post store
//! 3. Attach each member's group activity count from their user record
//! 4. Sort by total minutes (stable, so ties keep member order)

use futures_util::{stream, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};

use crate::db::{GroupStore, PostStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{GroupActivitySummary, PostDuration, RankingRow};

/// Per-user totals from a group's posts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PostTotals {
    total_minutes: u64,
    post_count: u32,
}

fn totals_by_user(posts: &[PostDuration]) -> HashMap<&str, PostTotals> {
    let mut totals: HashMap<&str, PostTotals> = HashMap::new();
    for post in posts {
        let entry = totals.entry(post.user_id.as_str()).or_default();
        entry.total_minutes += u64::from(post.duration);
        entry.post_count += 1;
    }
    totals
}

/// Build the sorted leaderboard from already-fetched data.
///
/// Posts by non-members are ignored. Members without posts or without a
/// stored summary get zeros. Duplicate member IDs keep their first position.
pub fn build_ranking(
    member_ids: &[String],
    posts: &[PostDuration],
    summaries: &HashMap<String, GroupActivitySummary>,
) -> Vec<RankingRow> {
    let totals = totals_by_user(posts);
    let mut seen = HashSet::new();

    let mut rows: Vec<RankingRow> = member_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .map(|id| {
            let t = totals.get(id.as_str()).copied().unwrap_or_default();
            let group_streak = summaries.get(id).map(|s| s.streak).unwrap_or(0);
            RankingRow::new(id.clone(), t.total_minutes, t.post_count, group_streak)
        })
        .collect();

    // sort_by is stable
    rows.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
    rows
}

/// Compute the leaderboard for `group_id`.
///
/// `concurrency` bounds how many user records are loaded at once.
pub async fn compute_ranking<S>(
    store: &S,
    group_id: &str,
    member_ids: &[String],
    concurrency: usize,
) -> Result<Vec<RankingRow>>
where
    S: PostStore + UserStore + GroupStore,
{
    if store.get_group(group_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Group {} not found", group_id)));
    }

    if member_ids.is_empty() {
        tracing::debug!(group_id, "Group has no members, empty ranking");
        return Ok(Vec::new());
    }

    let posts = store.find_posts_by_group(group_id).await?;

    let summaries: HashMap<String, GroupActivitySummary> = stream::iter(member_ids)
        .map(|member_id| async move {
            let summary = match store.load_user(member_id).await? {
                Some(user) => user.group_summary(group_id),
                None => {
                    tracing::warn!(
                        group_id,
                        user_id = %member_id,
                        "Member has no activity record, ranking with zero streak"
                    );
                    GroupActivitySummary::default()
                }
            };
            Ok::<_, AppError>((member_id.clone(), summary))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    let rows = build_ranking(member_ids, &posts, &summaries);

    tracing::debug!(
        group_id,
        members = rows.len(),
        posts = posts.len(),
        "Ranking computed"
    );

    Ok(rows)
}
