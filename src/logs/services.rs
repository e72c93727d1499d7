use std::collections::BTreeMap;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    calories::{calories_burned, DEFAULT_WEIGHT_KG},
    dto::{
        DayTotals, LogRangeQuery, MealLogList, MealLogRequest, MealLogSummary, PoseLogList,
        PoseLogRequest, WorkoutLogList, WorkoutLogRequest, WorkoutLogSummary,
    },
};
use crate::{
    api::{day_key, parse_id, parse_instant},
    error::AppError,
    progress::{series::utc_day, services::rounded_mean},
    store::{
        FitnessStore, Intensity, MealLog, MealType, NewMealLog, NewPoseLog, NewWorkoutLog,
        PoseLog, TimeRange, User, WorkoutLog,
    },
};

pub const WORKOUT_LOG_CAP: i64 = 100;
pub const MEAL_LOG_CAP: i64 = 200;
pub const POSE_LOG_CAP: i64 = 100;

fn missing() -> AppError {
    AppError::invalid("Missing required fields")
}

fn required_text(value: Option<String>) -> Result<String, AppError> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(missing)
}

async fn existing_user(store: &dyn FitnessStore, raw: Option<String>) -> Result<User, AppError> {
    let user_id = parse_id(&required_text(raw)?, "userId")?;
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Inclusive `[startDate, endDate]` filter; either bound may be absent.
pub fn range_from_query(q: &LogRangeQuery) -> Result<TimeRange, AppError> {
    let from = q
        .start_date
        .as_deref()
        .map(|raw| parse_instant(raw, "startDate"))
        .transpose()?;
    let to = q
        .end_date
        .as_deref()
        .map(|raw| parse_instant(raw, "endDate"))
        .transpose()?;
    Ok(TimeRange { from, to })
}

pub async fn log_workout(
    store: &dyn FitnessStore,
    req: WorkoutLogRequest,
    now: OffsetDateTime,
) -> Result<WorkoutLog, AppError> {
    let workout_type = required_text(req.workout_type)?;
    let duration_min = req.duration_min.ok_or_else(missing)?;
    if duration_min <= 0 {
        return Err(AppError::invalid("durationMin must be greater than 0"));
    }
    let intensity = match req.intensity.as_deref() {
        None | Some("") => Intensity::default(),
        Some(raw) => raw
            .parse::<Intensity>()
            .map_err(|_| AppError::invalid("Invalid intensity"))?,
    };
    let user = existing_user(store, req.user_id).await?;

    let weight_kg = req
        .user_weight
        .filter(|w| *w > 0.0)
        .or(user.weight_kg.filter(|w| *w > 0.0))
        .unwrap_or(DEFAULT_WEIGHT_KG);
    let calories = calories_burned(&workout_type, duration_min, weight_kg);
    debug!(user_id = %user.id, %workout_type, duration_min, weight_kg, calories, "logging workout");

    let log = store
        .insert_workout_log(NewWorkoutLog {
            user_id: user.id,
            workout_type,
            duration_min,
            calories_burned: calories,
            intensity,
            notes: req.notes,
            logged_at: now,
        })
        .await?;
    Ok(log)
}

pub fn summarize_workouts(logs: &[WorkoutLog]) -> WorkoutLogSummary {
    let total_calories_burned: f64 = logs.iter().map(|l| l.calories_burned).sum();
    WorkoutLogSummary {
        total_workouts: logs.len(),
        total_calories_burned,
        total_duration: logs.iter().map(|l| i64::from(l.duration_min)).sum(),
        average_calories_per_workout: rounded_mean(total_calories_burned, logs.len()),
    }
}

pub async fn workout_history(
    store: &dyn FitnessStore,
    user_id: Uuid,
    q: &LogRangeQuery,
) -> Result<WorkoutLogList, AppError> {
    let range = range_from_query(q)?;
    let logs = store.workout_logs(user_id, range, WORKOUT_LOG_CAP).await?;
    let summary = summarize_workouts(&logs);
    Ok(WorkoutLogList { logs, summary })
}

pub async fn log_meal(
    store: &dyn FitnessStore,
    req: MealLogRequest,
    now: OffsetDateTime,
) -> Result<MealLog, AppError> {
    let food_name = required_text(req.food_name)?;
    let calories = req.calories.ok_or_else(missing)?;
    if calories <= 0.0 {
        return Err(AppError::invalid("calories must be greater than 0"));
    }
    let meal_type = required_text(req.meal_type)?
        .parse::<MealType>()
        .map_err(|_| AppError::invalid("Invalid mealType"))?;
    let macro_g = |v: Option<f64>| v.filter(|g| *g > 0.0).unwrap_or(0.0);
    let user = existing_user(store, req.user_id).await?;

    let log = store
        .insert_meal_log(NewMealLog {
            user_id: user.id,
            food_name,
            calories,
            protein_g: macro_g(req.protein),
            carbs_g: macro_g(req.carbs),
            fat_g: macro_g(req.fat),
            meal_type,
            notes: req.notes,
            logged_at: now,
        })
        .await?;
    Ok(log)
}

/// Per-day sums keyed by UTC `YYYY-MM-DD`.
pub fn daily_totals(logs: &[MealLog]) -> BTreeMap<String, DayTotals> {
    let mut days: BTreeMap<String, DayTotals> = BTreeMap::new();
    for log in logs {
        let day = days.entry(day_key(utc_day(log.logged_at))).or_default();
        day.calories += log.calories;
        day.protein += log.protein_g;
        day.carbs += log.carbs_g;
        day.fat += log.fat_g;
        day.meals += 1;
    }
    days
}

pub fn summarize_meals(logs: &[MealLog]) -> MealLogSummary {
    let total_calories: f64 = logs.iter().map(|l| l.calories).sum();
    let total_protein: f64 = logs.iter().map(|l| l.protein_g).sum();
    let total_carbs: f64 = logs.iter().map(|l| l.carbs_g).sum();
    let total_fat: f64 = logs.iter().map(|l| l.fat_g).sum();
    MealLogSummary {
        total_meals: logs.len(),
        total_calories,
        total_protein: total_protein.round(),
        total_carbs: total_carbs.round(),
        total_fat: total_fat.round(),
        average_calories_per_meal: rounded_mean(total_calories, logs.len()),
        avg_protein_intake: rounded_mean(total_protein, logs.len()),
    }
}

pub async fn meal_history(
    store: &dyn FitnessStore,
    user_id: Uuid,
    q: &LogRangeQuery,
) -> Result<MealLogList, AppError> {
    let range = range_from_query(q)?;
    let meal_type = match q.meal_type.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<MealType>()
                .map_err(|_| AppError::invalid("Invalid mealType"))?,
        ),
    };
    let logs = store.meal_logs(user_id, range, meal_type, MEAL_LOG_CAP).await?;
    Ok(MealLogList {
        summary: summarize_meals(&logs),
        daily_totals: daily_totals(&logs),
        logs,
    })
}

pub async fn log_pose(
    store: &dyn FitnessStore,
    req: PoseLogRequest,
    now: OffsetDateTime,
) -> Result<PoseLog, AppError> {
    let exercise = required_text(req.exercise)?;
    let accuracy = req.accuracy.ok_or_else(missing)?;
    if !(0.0..=100.0).contains(&accuracy) {
        return Err(AppError::invalid("Accuracy must be between 0 and 100"));
    }
    let user = existing_user(store, req.user_id).await?;

    let log = store
        .insert_pose_log(NewPoseLog {
            user_id: user.id,
            exercise,
            accuracy,
            duration_sec: req.duration,
            keypoints: req.keypoints,
            logged_at: now,
        })
        .await?;
    Ok(log)
}

pub async fn pose_history(store: &dyn FitnessStore, user_id: Uuid) -> Result<PoseLogList, AppError> {
    let logs = store.pose_logs(user_id, POSE_LOG_CAP).await?;
    Ok(PoseLogList { logs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, User};
    use time::{macros::datetime, Duration};

    const NOW: OffsetDateTime = datetime!(2024-06-12 20:00 UTC);

    async fn store_with_user(weight_kg: Option<f64>) -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert_user(User {
                id,
                name: None,
                email: "lifter@example.com".into(),
                age: None,
                height_cm: None,
                weight_kg,
                goal: "Muscle Gain".into(),
                xp: 0,
                role: "user".into(),
                created_at: datetime!(2024-01-01 00:00 UTC),
            })
            .await;
        (store, id)
    }

    fn workout_req(user_id: Uuid, kind: &str, minutes: i32) -> WorkoutLogRequest {
        WorkoutLogRequest {
            user_id: Some(user_id.to_string()),
            workout_type: Some(kind.into()),
            duration_min: Some(minutes),
            notes: None,
            intensity: None,
            user_weight: None,
        }
    }

    fn meal_req(user_id: Uuid, calories: f64, meal_type: &str) -> MealLogRequest {
        MealLogRequest {
            user_id: Some(user_id.to_string()),
            food_name: Some("Chicken Salad".into()),
            calories: Some(calories),
            protein: Some(30.4),
            carbs: None,
            fat: Some(12.0),
            meal_type: Some(meal_type.into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn workout_weight_falls_back_to_profile_then_default() {
        let (store, id) = store_with_user(Some(80.0)).await;
        let log = log_workout(&store, workout_req(id, "cycling", 45), NOW).await.unwrap();
        assert_eq!(log.calories_burned, 450.0);
        assert_eq!(log.intensity, Intensity::Medium);

        let mut req = workout_req(id, "cycling", 45);
        req.user_weight = Some(60.0);
        let log = log_workout(&store, req, NOW).await.unwrap();
        assert_eq!(log.calories_burned, 338.0);

        let (store, id) = store_with_user(None).await;
        let log = log_workout(&store, workout_req(id, "Running", 30), NOW).await.unwrap();
        assert_eq!(log.calories_burned, 343.0);
    }

    #[tokio::test]
    async fn workout_rejects_bad_input() {
        let (store, id) = store_with_user(None).await;
        let err = log_workout(&store, workout_req(id, "yoga", 0), NOW).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let mut req = workout_req(id, "yoga", 20);
        req.intensity = Some("extreme".into());
        assert!(matches!(
            log_workout(&store, req, NOW).await.unwrap_err(),
            AppError::InvalidArgument(_)
        ));

        let mut req = workout_req(id, "yoga", 20);
        req.workout_type = None;
        assert_eq!(
            log_workout(&store, req, NOW).await.unwrap_err().to_string(),
            "Missing required fields"
        );

        let err = log_workout(&store, workout_req(Uuid::new_v4(), "yoga", 20), NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn workout_history_summarizes_filtered_logs() {
        let (store, id) = store_with_user(Some(70.0)).await;
        log_workout(&store, workout_req(id, "running", 30), NOW - Duration::days(10))
            .await
            .unwrap();
        log_workout(&store, workout_req(id, "walking", 60), NOW - Duration::days(1))
            .await
            .unwrap();
        log_workout(&store, workout_req(id, "strength", 40), NOW).await.unwrap();

        let q = LogRangeQuery {
            start_date: Some("2024-06-05".into()),
            ..Default::default()
        };
        let list = workout_history(&store, id, &q).await.unwrap();
        assert_eq!(list.logs.len(), 2);
        assert_eq!(list.logs[0].workout_type, "strength");
        // walking 245 + strength 233
        assert_eq!(list.summary.total_calories_burned, 478.0);
        assert_eq!(list.summary.total_duration, 100);
        assert_eq!(list.summary.average_calories_per_workout, 239);
    }

    #[test]
    fn bad_date_filter_is_rejected() {
        let q = LogRangeQuery {
            end_date: Some("yesterday".into()),
            ..Default::default()
        };
        assert_eq!(range_from_query(&q).unwrap_err().to_string(), "Invalid endDate");
    }

    #[tokio::test]
    async fn meal_history_has_daily_totals_and_type_filter() {
        let (store, id) = store_with_user(None).await;
        log_meal(&store, meal_req(id, 450.0, "Lunch"), NOW - Duration::days(1))
            .await
            .unwrap();
        log_meal(&store, meal_req(id, 350.0, "Dinner"), NOW - Duration::days(1))
            .await
            .unwrap();
        log_meal(&store, meal_req(id, 200.0, "Snack"), NOW).await.unwrap();

        let list = meal_history(&store, id, &LogRangeQuery::default()).await.unwrap();
        assert_eq!(list.summary.total_meals, 3);
        assert_eq!(list.summary.total_calories, 1000.0);
        assert_eq!(list.summary.average_calories_per_meal, 333);
        assert_eq!(list.summary.total_protein, 91.0);
        assert_eq!(list.summary.avg_protein_intake, 30);
        assert_eq!(list.daily_totals.len(), 2);
        let yesterday = &list.daily_totals["2024-06-11"];
        assert_eq!(yesterday.meals, 2);
        assert_eq!(yesterday.calories, 800.0);

        let q = LogRangeQuery {
            meal_type: Some("Snack".into()),
            ..Default::default()
        };
        let snacks = meal_history(&store, id, &q).await.unwrap();
        assert_eq!(snacks.logs.len(), 1);
        assert_eq!(snacks.logs[0].calories, 200.0);
    }

    #[tokio::test]
    async fn meal_rejects_unknown_type_and_non_positive_calories() {
        let (store, id) = store_with_user(None).await;
        assert!(log_meal(&store, meal_req(id, 300.0, "Brunch"), NOW).await.is_err());
        assert!(log_meal(&store, meal_req(id, 0.0, "Lunch"), NOW).await.is_err());
        let log = log_meal(&store, meal_req(id, 300.0, "Lunch"), NOW).await.unwrap();
        assert_eq!(log.carbs_g, 0.0);
    }

    #[tokio::test]
    async fn pose_accuracy_must_be_a_percentage() {
        let (store, id) = store_with_user(None).await;
        let req = |accuracy| PoseLogRequest {
            user_id: Some(id.to_string()),
            exercise: Some("plank".into()),
            accuracy: Some(accuracy),
            duration: Some(45),
            keypoints: None,
        };
        assert_eq!(
            log_pose(&store, req(101.0), NOW).await.unwrap_err().to_string(),
            "Accuracy must be between 0 and 100"
        );
        assert!(log_pose(&store, req(-1.0), NOW).await.is_err());
        log_pose(&store, req(0.0), NOW).await.unwrap();
        log_pose(&store, req(100.0), NOW + Duration::minutes(1)).await.unwrap();

        let list = pose_history(&store, id).await.unwrap();
        assert_eq!(list.logs.len(), 2);
        assert_eq!(list.logs[0].accuracy, 100.0);
    }
}
