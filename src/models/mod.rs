// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the engine.

pub mod ledger;
pub mod post;
pub mod ranking;
pub mod stats;
pub mod user;

pub use ledger::ActivityLedger;
pub use post::{Post, PostCreated, PostDeleted, PostDuration};
pub use ranking::{ActivityCalendar, RankingRow};
pub use stats::GroupActivitySummary;
pub use user::{Group, UserActivity};
