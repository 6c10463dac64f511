// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Study-streak: daily study activity, streaks and group leaderboards
//!
//! This crate provides the engine that turns study posts into a per-user
//! activity ledger, a personal consecutive-day streak, per-group activity
//! counts and a per-group leaderboard.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use services::ActivityEngine;
