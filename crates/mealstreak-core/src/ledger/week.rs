//! Calendar-week keying for idempotent completion bookkeeping.
//!
//! Week keys have the form `{year}-W{week}` where `week` is the
//! Jan-1-anchored week number: `ceil((day_of_year + offset) / 7)` with
//! `offset` the weekday index of January 1st (0 = Sunday). This is not
//! ISO-8601 week numbering; it is the app's own scheme and it must be
//! applied uniformly -- the meal and day completion paths share these
//! functions so their keys can never desynchronize.

use chrono::{Datelike, NaiveDate, Utc};

use super::slots::{DayOfWeek, MealSlot};

/// Derive the week key for a date, e.g. `"2023-W30"`.
///
/// Pure and total: two dates in the same week block always produce
/// the same key.
pub fn week_key(date: NaiveDate) -> String {
    let jan1 = date.with_ordinal(1).unwrap_or(date);
    let offset = jan1.weekday().num_days_from_sunday();
    let week = (date.ordinal() + offset).div_ceil(7);
    format!("{}-W{}", date.year(), week)
}

/// Week key for today (UTC calendar).
pub fn current_week_key() -> String {
    week_key(Utc::now().date_naive())
}

/// Day-level completion key, e.g. `"2023-W30-Monday"`.
pub fn day_key(week: &str, day: DayOfWeek) -> String {
    format!("{}-{}", week, day.as_str())
}

/// Meal-level completion key, e.g. `"2023-W30-Monday-breakfast"`.
pub fn meal_key(week: &str, day: DayOfWeek, meal: MealSlot) -> String {
    format!("{}-{}-{}", week, day.as_str(), meal.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn jan_first_is_week_one() {
        // 2023-01-01 was a Sunday, so offset = 0 and week 1 covers
        // ordinals 1..=7.
        assert_eq!(week_key(date(2023, 1, 1)), "2023-W1");
        assert_eq!(week_key(date(2023, 1, 7)), "2023-W1");
        assert_eq!(week_key(date(2023, 1, 8)), "2023-W2");
    }

    #[test]
    fn mid_year_week_matches_known_value() {
        // Ordinal of 2023-07-26 is 207; ceil(207 / 7) = 30.
        assert_eq!(week_key(date(2023, 7, 26)), "2023-W30");
    }

    #[test]
    fn same_week_block_shares_a_key() {
        // 2023 weeks run Sunday..Saturday (offset 0).
        let sunday = date(2023, 7, 23);
        let saturday = date(2023, 7, 29);
        assert_eq!(week_key(sunday), week_key(saturday));
        assert_ne!(week_key(saturday), week_key(date(2023, 7, 30)));
    }

    #[test]
    fn jan1_offset_shifts_week_boundaries() {
        // 2025-01-01 was a Wednesday, offset = 3, so week 1 only
        // covers Jan 1..4 and Jan 5 starts week 2.
        assert_eq!(week_key(date(2025, 1, 4)), "2025-W1");
        assert_eq!(week_key(date(2025, 1, 5)), "2025-W2");
    }

    #[test]
    fn december_dates_stay_in_their_own_year() {
        assert!(week_key(date(2024, 12, 31)).starts_with("2024-W"));
        assert!(week_key(date(2025, 1, 1)).starts_with("2025-W"));
    }

    #[test]
    fn completion_keys_compose() {
        let week = week_key(date(2023, 7, 26));
        assert_eq!(day_key(&week, DayOfWeek::Monday), "2023-W30-Monday");
        assert_eq!(
            meal_key(&week, DayOfWeek::Monday, MealSlot::MorningSnack),
            "2023-W30-Monday-morningSnack"
        );
    }

    proptest! {
        #[test]
        fn week_key_is_deterministic(year in 2000i32..2100, ordinal in 1u32..=365) {
            let d = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            prop_assert_eq!(week_key(d), week_key(d));
        }

        #[test]
        fn week_key_format_and_range(year in 2000i32..2100, ordinal in 1u32..=365) {
            let d = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let key = week_key(d);
            let (y, w) = key.split_once("-W").unwrap();
            prop_assert_eq!(y.parse::<i32>().unwrap(), year);
            let num = w.parse::<u32>().unwrap();
            prop_assert!((1..=54).contains(&num));
        }

        #[test]
        fn week_keys_are_monotonic_within_a_year(year in 2000i32..2100, ordinal in 1u32..365) {
            let a = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let b = NaiveDate::from_yo_opt(year, ordinal + 1).unwrap();
            let wa = week_key(a).split_once("-W").unwrap().1.parse::<u32>().unwrap();
            let wb = week_key(b).split_once("-W").unwrap().1.parse::<u32>().unwrap();
            prop_assert!(wb == wa || wb == wa + 1);
        }
    }
}
