//! Calendar-month arithmetic for rollback cadence.
//!
//! # Invariants
//! - `add_one_month` always returns a strictly later date (or `None` at the
//!   end of the representable range).
//! - `MonthRule::Clamp` never changes the month by more than one.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Rule applied when the source day-of-month does not exist in the next month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthRule {
    /// Clamp to the last day of the target month (Jan 31 -> Feb 28/29).
    #[default]
    Clamp,
    /// Spill excess days into the following month (Jan 31 -> Mar 2/3).
    Overflow,
}

/// Adds one calendar month to `date` under `rule`.
pub fn add_one_month(date: NaiveDate, rule: MonthRule) -> Option<NaiveDate> {
    match rule {
        MonthRule::Clamp => date.checked_add_months(Months::new(1)),
        MonthRule::Overflow => {
            let first_of_next = date.with_day(1)?.checked_add_months(Months::new(1))?;
            first_of_next.checked_add_days(Days::new(u64::from(date.day() - 1)))
        }
    }
}

/// Counts month steps chained from `start` that fall strictly before `end`.
///
/// This is the maximum number of rollbacks a gap between two notes can
/// produce before the balance runs out.
pub fn month_steps_before(start: NaiveDate, end: NaiveDate, rule: MonthRule) -> usize {
    let mut count = 0;
    let mut cursor = start;
    while let Some(next) = add_one_month(cursor, rule) {
        if next >= end {
            break;
        }
        count += 1;
        cursor = next;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::{add_one_month, month_steps_before, MonthRule};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn clamp_keeps_day_when_it_exists() {
        assert_eq!(
            add_one_month(date(2024, 1, 10), MonthRule::Clamp),
            Some(date(2024, 2, 10))
        );
        assert_eq!(
            add_one_month(date(2024, 12, 15), MonthRule::Clamp),
            Some(date(2025, 1, 15))
        );
    }

    #[test]
    fn clamp_uses_last_day_of_short_months() {
        assert_eq!(
            add_one_month(date(2024, 1, 31), MonthRule::Clamp),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            add_one_month(date(2023, 1, 31), MonthRule::Clamp),
            Some(date(2023, 2, 28))
        );
        assert_eq!(
            add_one_month(date(2024, 3, 31), MonthRule::Clamp),
            Some(date(2024, 4, 30))
        );
    }

    #[test]
    fn overflow_spills_into_following_month() {
        assert_eq!(
            add_one_month(date(2023, 1, 31), MonthRule::Overflow),
            Some(date(2023, 3, 3))
        );
        assert_eq!(
            add_one_month(date(2024, 1, 31), MonthRule::Overflow),
            Some(date(2024, 3, 2))
        );
        assert_eq!(
            add_one_month(date(2024, 1, 10), MonthRule::Overflow),
            Some(date(2024, 2, 10))
        );
    }

    #[test]
    fn month_steps_exclude_candidate_on_end_date() {
        assert_eq!(
            month_steps_before(date(2024, 1, 10), date(2024, 4, 10), MonthRule::Clamp),
            2
        );
        assert_eq!(
            month_steps_before(date(2024, 1, 10), date(2024, 4, 11), MonthRule::Clamp),
            3
        );
        assert_eq!(
            month_steps_before(date(2024, 1, 10), date(2024, 2, 1), MonthRule::Clamp),
            0
        );
    }

    #[test]
    fn clamp_chain_drifts_after_short_month() {
        let feb = add_one_month(date(2023, 1, 31), MonthRule::Clamp).unwrap();
        let mar = add_one_month(feb, MonthRule::Clamp).unwrap();
        assert_eq!(mar, date(2023, 3, 28));
    }
}
