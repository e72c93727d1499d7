use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::{
    dto::{DetailedProgress, ProgressOverview, WindowStats},
    series::{utc_day, weekly_balance, weekly_plan_counts},
    streak::streak_days,
};
use crate::{
    error::AppError,
    store::{FitnessStore, MealLog, TimeRange, WorkoutLog},
};

const WEEK: Duration = Duration::days(7);
const MONTH: Duration = Duration::days(30);

/// Mean rounded to the nearest integer; 0 for an empty set.
pub fn rounded_mean(sum: f64, count: usize) -> i64 {
    if count == 0 {
        0
    } else {
        (sum / count as f64).round() as i64
    }
}

fn mean_of(sum: f64, count: i64) -> i64 {
    rounded_mean(sum, usize::try_from(count).unwrap_or(0))
}

fn window_stats(workouts: &[WorkoutLog], meals: &[MealLog], since: OffsetDateTime) -> WindowStats {
    let range = TimeRange::since(since);
    let recent: Vec<&WorkoutLog> = workouts.iter().filter(|w| range.contains(w.logged_at)).collect();
    WindowStats {
        workouts: recent.len(),
        calories_burned: recent.iter().map(|w| w.calories_burned).sum(),
        calories_consumed: meals
            .iter()
            .filter(|m| range.contains(m.logged_at))
            .map(|m| m.calories)
            .sum(),
    }
}

/// Completed-plan totals, pose accuracy, XP and the last seven days of plans.
///
/// Totals come from store-side aggregates; only the seven-day series reads rows.
pub async fn overview(
    store: &dyn FitnessStore,
    user_id: Uuid,
    now: OffsetDateTime,
    limit: i64,
) -> Result<ProgressOverview, AppError> {
    let today = utc_day(now);
    let week_start = today
        .checked_sub(Duration::days(6))
        .map(|d| d.midnight().assume_utc());
    let (user, totals, recent_plans) = tokio::try_join!(
        store.find_user(user_id),
        store.user_totals(user_id),
        store.completed_plans(user_id, week_start, limit),
    )?;
    let user = user.ok_or_else(|| AppError::not_found("User not found"))?;
    debug!(%user_id, plans = totals.completed_plans, poses = totals.pose_logs, "progress overview");

    Ok(ProgressOverview {
        workouts_completed: totals.completed_plans,
        avg_calories_burned: mean_of(totals.plan_calories, totals.completed_plans),
        avg_pose_accuracy: mean_of(totals.pose_accuracy_sum, totals.pose_logs),
        xp: user.xp,
        last7_days: weekly_plan_counts(&recent_plans, today),
        total_workouts: totals.completed_plans,
        total_calories_burned: totals.plan_calories,
    })
}

/// Log-based totals, streak and the weekly calorie balance.
///
/// All reads run concurrently; any failed read fails the whole summary.
/// Totals are aggregated by the store, while the streak, graph and windows
/// work from the newest `limit` rows.
pub async fn detailed(
    store: &dyn FitnessStore,
    user_id: Uuid,
    now: OffsetDateTime,
    limit: i64,
) -> Result<DetailedProgress, AppError> {
    let (user, totals, workouts, meals) = tokio::try_join!(
        store.find_user(user_id),
        store.user_totals(user_id),
        store.workout_logs(user_id, TimeRange::all(), limit),
        store.meal_logs(user_id, TimeRange::all(), None, limit),
    )?;
    if user.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let today = utc_day(now);
    let active_days = workouts
        .iter()
        .map(|w| utc_day(w.logged_at))
        .chain(meals.iter().map(|m| utc_day(m.logged_at)));
    let streak = streak_days(active_days, today);
    debug!(%user_id, workouts = totals.workout_logs, meals = totals.meal_logs, streak, "detailed progress");

    Ok(DetailedProgress {
        total_workouts: totals.workout_logs,
        total_calories_burned: totals.workout_calories,
        total_calories_consumed: totals.meal_calories,
        avg_protein_intake: mean_of(totals.meal_protein_g, totals.meal_logs),
        avg_pose_accuracy: mean_of(totals.pose_accuracy_sum, totals.pose_logs),
        streak_days: streak,
        weekly_graph: weekly_balance(&meals, &workouts, today),
        weekly_stats: window_stats(&workouts, &meals, now - WEEK),
        monthly_stats: window_stats(&workouts, &meals, now - MONTH),
    })
}
