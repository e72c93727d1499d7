use std::collections::BTreeMap;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    body_parts::{self, BodyPart},
    dto::{BodyPartStat, TrackerReport, TrackerSummary, WorkoutEntry},
    period::Period,
};
use crate::{
    error::AppError,
    store::{FitnessStore, PlanWithWorkout},
};

const RECENT_WORKOUTS_PER_PART: usize = 10;
const DEFAULT_DURATION_MIN: i32 = 30;

/// `min(100, round(100 * workouts / target))`.
pub fn progress_percentage(workouts: u32, target: u32) -> u32 {
    if target == 0 {
        return 0;
    }
    let pct = (100.0 * f64::from(workouts) / f64::from(target)).round();
    pct.min(100.0) as u32
}

/// Buckets completed plans (newest first) into per-body-part stats.
pub fn aggregate(plans: &[PlanWithWorkout], period: Period) -> TrackerReport {
    let target = period.target_workouts();
    let mut stats: BTreeMap<BodyPart, BodyPartStat> = BodyPart::ALL
        .into_iter()
        .map(|p| (p, BodyPartStat::empty(p, target)))
        .collect();

    for PlanWithWorkout { plan, workout } in plans {
        // Dangling template: counted in the totals only.
        let Some(workout) = workout else { continue };

        let duration = i64::from(
            plan.duration_min
                .filter(|d| *d > 0)
                .or(Some(workout.duration_min).filter(|d| *d > 0))
                .unwrap_or(DEFAULT_DURATION_MIN),
        );
        let calories = plan.calories_burned.unwrap_or(0.0);

        for part in body_parts::resolve(plan, workout) {
            let Some(stat) = stats.get_mut(&part) else { continue };
            stat.workouts += 1;
            stat.total_duration += duration;
            stat.total_calories += calories;
            if stat.last_workout.map_or(true, |last| plan.date > last) {
                stat.last_workout = Some(plan.date);
            }
            if stat.workouts_list.len() < RECENT_WORKOUTS_PER_PART {
                stat.workouts_list.push(WorkoutEntry {
                    date: plan.date,
                    workout_title: workout.title.clone(),
                    duration,
                    calories,
                });
            }
        }
    }

    let body_part_stats = BodyPart::ALL
        .into_iter()
        .filter_map(|p| stats.remove(&p))
        .map(|mut s| {
            s.progress_percentage = progress_percentage(s.workouts, target);
            s
        })
        .collect();

    let total_workouts = plans.len();
    let total_duration: i64 = plans
        .iter()
        .map(|p| i64::from(p.plan.duration_min.unwrap_or(0)))
        .sum();
    let total_calories: f64 = plans
        .iter()
        .map(|p| p.plan.calories_burned.unwrap_or(0.0))
        .sum();
    let average_duration = if total_workouts > 0 {
        (total_duration as f64 / total_workouts as f64).round() as i64
    } else {
        0
    };

    TrackerReport {
        period,
        total_workouts,
        body_part_stats,
        summary: TrackerSummary {
            total_duration,
            total_calories,
            average_duration,
        },
    }
}

pub async fn tracker_report(
    store: &dyn FitnessStore,
    user_id: Uuid,
    period: Period,
    now: OffsetDateTime,
    limit: i64,
) -> Result<TrackerReport, AppError> {
    let plans = store
        .completed_plans(user_id, period.floor(now), limit)
        .await?;
    debug!(%user_id, period = period.as_str(), plans = plans.len(), "aggregating tracker stats");
    Ok(aggregate(&plans, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PlanStatus, WorkoutPlan, WorkoutTemplate};
    use time::{macros::datetime, Duration};

    fn template(title: &str) -> WorkoutTemplate {
        WorkoutTemplate {
            id: Uuid::new_v4(),
            title: title.into(),
            kind: "strength".into(),
            duration_min: 30,
            difficulty: "medium".into(),
            body_parts: vec![],
            calories_per_min: 5.0,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn completed(
        user_id: Uuid,
        workout: &WorkoutTemplate,
        date: OffsetDateTime,
        duration_min: Option<i32>,
        calories: Option<f64>,
    ) -> WorkoutPlan {
        WorkoutPlan {
            id: Uuid::new_v4(),
            user_id,
            workout_id: workout.id,
            date,
            status: PlanStatus::Completed,
            notes: None,
            calories_burned: calories,
            duration_min,
            body_parts: vec![],
            created_at: date,
        }
    }

    #[test]
    fn percentage_rounds_and_caps() {
        assert_eq!(progress_percentage(0, 3), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(3, 3), 100);
        assert_eq!(progress_percentage(40, 3), 100);
        assert_eq!(progress_percentage(1, 8), 13);
    }

    #[test]
    fn percentage_is_always_within_bounds() {
        for period in [Period::Weekly, Period::Monthly, Period::Total] {
            for n in 0..100 {
                let pct = progress_percentage(n, period.target_workouts());
                assert!(pct <= 100, "{pct} for {n} in {period:?}");
            }
        }
    }

    #[test]
    fn zero_plans_yield_all_zero_stats() {
        let report = aggregate(&[], Period::Weekly);
        assert_eq!(report.total_workouts, 0);
        assert_eq!(report.body_part_stats.len(), 12);
        for stat in &report.body_part_stats {
            assert_eq!(stat.workouts, 0);
            assert_eq!(stat.total_duration, 0);
            assert_eq!(stat.total_calories, 0.0);
            assert!(stat.last_workout.is_none());
            assert_eq!(stat.progress_percentage, 0);
        }
        assert_eq!(report.summary.average_duration, 0);
    }

    #[tokio::test]
    async fn leg_day_scenario() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = datetime!(2024-06-12 18:00 UTC);
        let legs = template("Leg Day Strength");
        store.insert_workout(legs.clone()).await;
        store
            .put_plan(completed(user, &legs, now - Duration::hours(2), Some(45), Some(300.0)))
            .await;

        let report = tracker_report(&store, user, Period::Weekly, now, 1000)
            .await
            .unwrap();

        assert_eq!(report.total_workouts, 1);
        for part in [BodyPart::Legs, BodyPart::LowerBody] {
            let stat = report.stat(part).unwrap();
            assert_eq!(stat.workouts, 1);
            assert_eq!(stat.total_duration, 45);
            assert_eq!(stat.total_calories, 300.0);
            assert_eq!(stat.progress_percentage, 33);
            assert_eq!(stat.last_workout, Some(now - Duration::hours(2)));
            assert_eq!(stat.workouts_list[0].workout_title, "Leg Day Strength");
        }
        for stat in report
            .body_part_stats
            .iter()
            .filter(|s| !matches!(s.name, BodyPart::Legs | BodyPart::LowerBody))
        {
            assert_eq!(stat.workouts, 0, "{} should be empty", stat.name);
            assert_eq!(stat.progress_percentage, 0);
        }
        assert_eq!(report.summary.total_duration, 45);
        assert_eq!(report.summary.total_calories, 300.0);
        assert_eq!(report.summary.average_duration, 45);
    }

    #[tokio::test]
    async fn weekly_window_excludes_older_plans() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = datetime!(2024-06-12 18:00 UTC);
        let chest = template("Chest Press");
        store.insert_workout(chest.clone()).await;
        store
            .put_plan(completed(user, &chest, now - Duration::days(2), Some(30), None))
            .await;
        store
            .put_plan(completed(user, &chest, now - Duration::days(20), Some(30), None))
            .await;

        let weekly = tracker_report(&store, user, Period::Weekly, now, 1000).await.unwrap();
        let monthly = tracker_report(&store, user, Period::Monthly, now, 1000).await.unwrap();
        let total = tracker_report(&store, user, Period::Total, now, 1000).await.unwrap();

        assert_eq!(weekly.stat(BodyPart::Chest).unwrap().workouts, 1);
        assert_eq!(monthly.stat(BodyPart::Chest).unwrap().workouts, 2);
        assert_eq!(monthly.stat(BodyPart::Chest).unwrap().progress_percentage, 25);
        assert_eq!(total.stat(BodyPart::Chest).unwrap().progress_percentage, 20);
    }

    #[tokio::test]
    async fn uneven_training_is_not_normalized() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = datetime!(2024-06-12 18:00 UTC);
        let legs = template("Squat Session");
        store.insert_workout(legs.clone()).await;
        for day in 0..4 {
            store
                .put_plan(completed(user, &legs, now - Duration::days(day), None, Some(100.0)))
                .await;
        }

        let report = tracker_report(&store, user, Period::Weekly, now, 1000).await.unwrap();
        let legs_stat = report.stat(BodyPart::Legs).unwrap();
        assert_eq!(legs_stat.workouts, 4);
        assert_eq!(legs_stat.progress_percentage, 100);
        assert_eq!(legs_stat.total_duration, 120, "falls back to template duration");
        assert_eq!(legs_stat.last_workout, Some(now));
        assert_eq!(report.stat(BodyPart::Arms).unwrap().progress_percentage, 0);
        // Summary sums only durations recorded on the plans themselves.
        assert_eq!(report.summary.total_duration, 0);
        assert_eq!(report.summary.total_calories, 400.0);
    }

    #[tokio::test]
    async fn dangling_templates_count_only_toward_totals() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = datetime!(2024-06-12 18:00 UTC);
        let ghost = template("Deleted Workout");
        store
            .put_plan(completed(user, &ghost, now, Some(20), Some(150.0)))
            .await;

        let report = tracker_report(&store, user, Period::Total, now, 1000).await.unwrap();
        assert_eq!(report.total_workouts, 1);
        assert!(report.body_part_stats.iter().all(|s| s.workouts == 0));
        assert_eq!(report.summary.total_calories, 150.0);
    }

    #[tokio::test]
    async fn planned_and_missed_plans_are_ignored() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = datetime!(2024-06-12 18:00 UTC);
        let legs = template("Leg Day");
        store.insert_workout(legs.clone()).await;
        let mut planned = completed(user, &legs, now, Some(30), None);
        planned.status = PlanStatus::Planned;
        let mut missed = completed(user, &legs, now, Some(30), None);
        missed.status = PlanStatus::Missed;
        store.put_plan(planned).await;
        store.put_plan(missed).await;

        let report = tracker_report(&store, user, Period::Total, now, 1000).await.unwrap();
        assert_eq!(report.total_workouts, 0);
    }

    #[test]
    fn workouts_list_keeps_ten_most_recent() {
        let user = Uuid::new_v4();
        let legs = template("Leg Day");
        let start = datetime!(2024-06-30 12:00 UTC);
        let plans: Vec<PlanWithWorkout> = (0..15)
            .map(|i| PlanWithWorkout {
                plan: completed(user, &legs, start - Duration::days(i), Some(30), None),
                workout: Some(legs.clone()),
            })
            .collect();

        let report = aggregate(&plans, Period::Total);
        let stat = report.stat(BodyPart::Legs).unwrap();
        assert_eq!(stat.workouts, 15);
        assert_eq!(stat.workouts_list.len(), 10);
        assert_eq!(stat.workouts_list[0].date, start);
    }
}
