//! Pure calendar-date resolution of membership status.
//!
//! # Responsibility
//! - Map a membership's date range and a reference day to exactly one
//!   [`PackageStatus`].
//!
//! # Invariants
//! - Resolution is total: every input lands in exactly one status.
//! - Comparisons are whole-day only; callers pass `NaiveDate` so sub-day
//!   precision cannot leak in.
//! - The reference day is an explicit parameter, never an ambient clock.

use crate::model::package::PackageStatus;
use chrono::NaiveDate;

/// Days before `end_date` during which a membership reads as expiring.
pub const DEFAULT_WARNING_DAYS: i64 = 3;

/// Resolves a membership's status for the given reference day.
///
/// Precedence, first match wins:
/// 1. `today` before `start_date` -> `Upcoming`.
/// 2. `today` after `end_date` -> `Expired`.
/// 3. at most `warning_days` whole days left until `end_date` ->
///    `ExpiringSoon`.
/// 4. otherwise -> `Active`.
///
/// The start day itself is not upcoming, and the end day itself is not
/// expired; with a non-negative warning window the end day resolves as
/// `ExpiringSoon`.
pub fn resolve_status(
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
    warning_days: i64,
) -> PackageStatus {
    if today < start_date {
        return PackageStatus::Upcoming;
    }
    if today > end_date {
        return PackageStatus::Expired;
    }

    let days_left = (end_date - today).num_days();
    if days_left <= warning_days {
        return PackageStatus::ExpiringSoon;
    }

    PackageStatus::Active
}
