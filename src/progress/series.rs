use std::collections::HashMap;

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::{
    api::day_key,
    store::{MealLog, PlanWithWorkout, WorkoutLog},
};

pub const SERIES_DAYS: u8 = 7;

/// Calendar day of a timestamp, in UTC.
pub fn utc_day(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

/// `n` consecutive days ending with `today`, oldest first.
pub fn trailing_days(today: Date, n: u8) -> Vec<Date> {
    (0..i64::from(n))
        .rev()
        .filter_map(|back| today.checked_sub(Duration::days(back)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBalance {
    pub date: String,
    pub calories_in: f64,
    pub calories_out: f64,
    pub net_calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyWorkouts {
    pub date: String,
    pub workouts: u32,
    pub calories: f64,
}

/// Calories in (meals) and out (workout logs) per day for the week ending `today`.
/// Days without logs are zero.
pub fn weekly_balance(meals: &[MealLog], workouts: &[WorkoutLog], today: Date) -> Vec<DailyBalance> {
    let mut intake: HashMap<Date, f64> = HashMap::new();
    for m in meals {
        *intake.entry(utc_day(m.logged_at)).or_default() += m.calories;
    }
    let mut burned: HashMap<Date, f64> = HashMap::new();
    for w in workouts {
        *burned.entry(utc_day(w.logged_at)).or_default() += w.calories_burned;
    }

    trailing_days(today, SERIES_DAYS)
        .into_iter()
        .map(|day| {
            let calories_in = intake.get(&day).copied().unwrap_or(0.0);
            let calories_out = burned.get(&day).copied().unwrap_or(0.0);
            DailyBalance {
                date: day_key(day),
                calories_in,
                calories_out,
                net_calories: calories_in - calories_out,
            }
        })
        .collect()
}

/// Completed plans and their calories per day for the week ending `today`.
pub fn weekly_plan_counts(plans: &[PlanWithWorkout], today: Date) -> Vec<DailyWorkouts> {
    let mut by_day: HashMap<Date, (u32, f64)> = HashMap::new();
    for p in plans {
        let slot = by_day.entry(utc_day(p.plan.date)).or_default();
        slot.0 += 1;
        slot.1 += p.plan.calories_burned.unwrap_or(0.0);
    }

    trailing_days(today, SERIES_DAYS)
        .into_iter()
        .map(|day| {
            let (workouts, calories) = by_day.get(&day).copied().unwrap_or_default();
            DailyWorkouts {
                date: day_key(day),
                workouts,
                calories,
            }
        })
        .collect()
}
