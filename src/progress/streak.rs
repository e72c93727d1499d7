use std::collections::HashSet;

use time::Date;

/// Consecutive active days ending today (UTC), walking backwards.
///
/// Today has to be active for the chain to start: with no activity yet today
/// the streak is 0 even if yesterday was logged.
pub fn streak_days<I>(active_days: I, today: Date) -> u32
where
    I: IntoIterator<Item = Date>,
{
    let days: HashSet<Date> = active_days.into_iter().collect();
    let mut streak = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.previous_day();
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 12);

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(streak_days([], TODAY), 0);
    }

    #[test]
    fn today_counts_when_present() {
        assert_eq!(streak_days([TODAY], TODAY), 1);
        assert_eq!(streak_days([TODAY, date!(2024 - 06 - 11)], TODAY), 2);
    }

    #[test]
    fn three_day_chain_stops_at_first_gap() {
        let days = [
            date!(2024 - 06 - 12),
            date!(2024 - 06 - 11),
            date!(2024 - 06 - 10),
            date!(2024 - 06 - 08),
            date!(2024 - 06 - 07),
        ];
        assert_eq!(streak_days(days, TODAY), 3);
    }

    #[test]
    fn unlogged_today_resets_streak() {
        let days = [date!(2024 - 06 - 11), date!(2024 - 06 - 10), date!(2024 - 06 - 09)];
        assert_eq!(streak_days(days, TODAY), 0);
    }

    #[test]
    fn logging_today_extends_yesterdays_chain() {
        let mut days = vec![date!(2024 - 06 - 11), date!(2024 - 06 - 10)];
        let before = streak_days(days.clone(), date!(2024 - 06 - 11));
        days.push(TODAY);
        assert_eq!(streak_days(days, TODAY), before + 1);
    }

    #[test]
    fn duplicates_and_future_days_do_not_inflate() {
        let days = [TODAY, TODAY, date!(2024 - 06 - 13), date!(2024 - 06 - 11)];
        assert_eq!(streak_days(days, TODAY), 2);
    }

    #[test]
    fn chain_crosses_month_and_year_boundaries() {
        let days = [date!(2024 - 01 - 01), date!(2023 - 12 - 31), date!(2023 - 12 - 30)];
        assert_eq!(streak_days(days, date!(2024 - 01 - 01)), 3);
    }
}
