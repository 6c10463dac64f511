// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal streak calculation.

use chrono::NaiveDate;

use crate::models::ActivityLedger;
use crate::time_utils::previous_day;

/// Length of the consecutive-day run ending at the most recent active day.
///
/// The run only counts while it is still alive: if the user posted neither
/// `today` nor the day before, the streak is 0 regardless of history.
pub fn current_streak(ledger: &ActivityLedger, today: NaiveDate) -> u32 {
    let Some(latest) = ledger.latest() else {
        return 0;
    };

    let yesterday = previous_day(today);
    let alive = ledger.contains(today) || yesterday.is_some_and(|d| ledger.contains(d));
    if !alive {
        return 0;
    }

    let mut expected = Some(latest);
    let mut streak = 0;
    for date in ledger.dates_descending() {
        if Some(date) != expected {
            break;
        }
        streak += 1;
        expected = previous_day(date);
    }
    streak
}
