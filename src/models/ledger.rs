// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user activity ledger: the set of UTC calendar days with at least one post.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::AppError;
use crate::time_utils::{format_activity_date, parse_activity_date};

/// Set of active calendar days.
///
/// Stored as a map of `YYYY-MM-DD` → `true` so the document shape stays
/// a plain map in Firestore. Keys are validated on deserialization and
/// `false` entries are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, bool>",
    into = "BTreeMap<String, bool>"
)]
pub struct ActivityLedger {
    dates: BTreeSet<NaiveDate>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `date` as active. Returns `true` if it was not already present.
    pub fn mark(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    /// Remove `date`. No-op if absent; returns whether anything was removed.
    pub fn unmark(&mut self, date: NaiveDate) -> bool {
        self.dates.remove(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Active dates, most recent first. Call again to restart.
    pub fn dates_descending(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().rev().copied()
    }

    /// Active dates, oldest first.
    pub fn dates_ascending(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// Most recent active date.
    pub fn latest(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<NaiveDate> for ActivityLedger {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, bool>> for ActivityLedger {
    type Error = AppError;

    fn try_from(map: BTreeMap<String, bool>) -> Result<Self, Self::Error> {
        let mut ledger = ActivityLedger::new();
        for (key, present) in map {
            // Only exact YYYY-MM-DD keys are canonical
            let date = parse_activity_date(&key)?;
            if format_activity_date(date) != key {
                return Err(AppError::InvalidInput(format!(
                    "Ledger key '{}' is not a canonical YYYY-MM-DD date",
                    key
                )));
            }
            if present {
                ledger.mark(date);
            }
        }
        Ok(ledger)
    }
}

impl From<ActivityLedger> for BTreeMap<String, bool> {
    fn from(ledger: ActivityLedger) -> Self {
        ledger
            .dates
            .into_iter()
            .map(|date| (format_activity_date(date), true))
            .collect()
    }
}
