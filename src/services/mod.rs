// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod ranking;
pub mod streak;

pub use activity::{ActivityChange, ActivityEngine, UserLocks};
pub use ranking::{build_ranking, compute_ranking};
pub use streak::current_streak;
