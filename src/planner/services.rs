use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{CompletePlanRequest, PlanList, PlanView, SchedulePlanRequest, WorkoutList};
use crate::{
    api::{parse_id, parse_instant},
    error::AppError,
    store::{FitnessStore, NewWorkoutPlan, PlanStatus, PlanTransition, PlanUpdate, WorkoutPlan},
    tracker::body_parts::BodyPart,
};

pub const WORKOUT_LIST_CAP: i64 = 100;
pub const PLAN_LIST_CAP: i64 = 200;

pub async fn list_workouts(store: &dyn FitnessStore) -> Result<WorkoutList, AppError> {
    let workouts = store.list_workouts(WORKOUT_LIST_CAP).await?;
    Ok(WorkoutList { workouts })
}

/// Keeps only recognised labels, lowercased and deduplicated.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut parts: Vec<BodyPart> = tags.iter().filter_map(|t| t.parse().ok()).collect();
    parts.sort();
    parts.dedup();
    parts.into_iter().map(|p| p.as_str().to_owned()).collect()
}

pub async fn schedule(store: &dyn FitnessStore, req: SchedulePlanRequest) -> Result<WorkoutPlan, AppError> {
    let (Some(raw_user), Some(raw_workout)) = (req.user_id.as_deref(), req.workout_id.as_deref()) else {
        return Err(AppError::invalid("Invalid userId or workoutId"));
    };
    let user_id = parse_id(raw_user, "userId")?;
    let workout_id = parse_id(raw_workout, "workoutId")?;
    let raw_date = req
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::invalid("date is required"))?;
    let date = parse_instant(raw_date, "date")?;
    if matches!(req.duration_min, Some(d) if d < 0) {
        return Err(AppError::invalid("durationMin must not be negative"));
    }

    let (user, workout) = tokio::try_join!(store.find_user(user_id), store.find_workout(workout_id))?;
    if user.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    if workout.is_none() {
        return Err(AppError::not_found("Workout not found"));
    }

    let plan = store
        .insert_plan(NewWorkoutPlan {
            user_id,
            workout_id,
            date,
            notes: req.notes,
            duration_min: req.duration_min,
            body_parts: normalize_tags(req.body_parts),
        })
        .await?;
    debug!(plan_id = %plan.id, %user_id, %workout_id, "workout scheduled");
    Ok(plan)
}

pub async fn user_plans(store: &dyn FitnessStore, user_id: Uuid) -> Result<PlanList, AppError> {
    let plans = store.list_plans(user_id, PLAN_LIST_CAP).await?;
    Ok(PlanList {
        plans: plans.into_iter().map(PlanView::from).collect(),
    })
}

/// Moves a plan to `completed` (default) or `missed`, recording metrics.
///
/// Finished plans never return to `planned`; re-sending the current status
/// only amends the metrics.
pub async fn complete(
    store: &dyn FitnessStore,
    plan_id: Uuid,
    req: CompletePlanRequest,
) -> Result<WorkoutPlan, AppError> {
    let next = match req.status.as_deref() {
        None => PlanStatus::Completed,
        Some(raw) => raw
            .parse::<PlanStatus>()
            .map_err(|_| AppError::invalid("Invalid status"))?,
    };
    if req.calories_burned.is_some_and(|c| c < 0.0) || req.duration_min.is_some_and(|d| d < 0) {
        return Err(AppError::invalid("caloriesBurned and durationMin must not be negative"));
    }

    let update = PlanUpdate {
        status: next,
        calories_burned: req.calories_burned,
        duration_min: req.duration_min,
    };
    match store.transition_plan(plan_id, update).await? {
        PlanTransition::Applied(plan) => Ok(plan),
        PlanTransition::Missing => Err(AppError::not_found("Plan not found")),
        PlanTransition::Rejected(current) => {
            warn!(%plan_id, from = %current, to = %next, "rejected plan status change");
            Err(AppError::Conflict(format!("Plan is already {current}")))
        }
    }
}

pub async fn remove(store: &dyn FitnessStore, plan_id: Uuid) -> Result<(), AppError> {
    if store.delete_plan(plan_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Plan not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, User, WorkoutTemplate};
    use time::macros::datetime;

    async fn fixture() -> (MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let workout_id = Uuid::new_v4();
        store
            .insert_user(User {
                id: user_id,
                name: Some("Sam".into()),
                email: "sam@example.com".into(),
                age: None,
                height_cm: None,
                weight_kg: None,
                goal: "Weight Loss".into(),
                xp: 0,
                role: "user".into(),
                created_at: datetime!(2024-01-01 00:00 UTC),
            })
            .await;
        store
            .insert_workout(WorkoutTemplate {
                id: workout_id,
                title: "Push Day".into(),
                kind: "strength".into(),
                duration_min: 45,
                difficulty: "medium".into(),
                body_parts: vec!["chest".into(), "arms".into()],
                calories_per_min: 6.0,
                created_at: datetime!(2024-01-01 00:00 UTC),
            })
            .await;
        (store, user_id, workout_id)
    }

    fn request(user_id: Uuid, workout_id: Uuid, date: &str) -> SchedulePlanRequest {
        SchedulePlanRequest {
            user_id: Some(user_id.to_string()),
            workout_id: Some(workout_id.to_string()),
            date: Some(date.into()),
            notes: None,
            duration_min: None,
            body_parts: vec!["Chest".into(), "wings".into(), "chest".into()],
        }
    }

    #[tokio::test]
    async fn scheduled_plans_list_in_date_order_with_titles() {
        let (store, user_id, workout_id) = fixture().await;
        schedule(&store, request(user_id, workout_id, "2024-06-14")).await.unwrap();
        let first = schedule(&store, request(user_id, workout_id, "2024-06-10T07:00:00Z"))
            .await
            .unwrap();
        assert_eq!(first.status, PlanStatus::Planned);
        assert_eq!(first.body_parts, vec!["chest".to_string()]);

        let list = user_plans(&store, user_id).await.unwrap();
        assert_eq!(list.plans.len(), 2);
        assert_eq!(list.plans[0].id, first.id);
        assert_eq!(list.plans[0].workout_title.as_deref(), Some("Push Day"));
    }

    #[tokio::test]
    async fn plan_list_stops_at_the_cap() {
        let (store, user_id, workout_id) = fixture().await;
        for n in 0..PLAN_LIST_CAP + 5 {
            let date = format!("2024-06-10T{:02}:{:02}:00Z", n / 60, n % 60);
            schedule(&store, request(user_id, workout_id, &date)).await.unwrap();
        }
        let list = user_plans(&store, user_id).await.unwrap();
        assert_eq!(list.plans.len() as i64, PLAN_LIST_CAP);
    }

    #[tokio::test]
    async fn scheduling_needs_existing_template_and_valid_date() {
        let (store, user_id, workout_id) = fixture().await;
        let err = schedule(&store, request(user_id, Uuid::new_v4(), "2024-06-10"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Workout not found");

        let err = schedule(&store, request(user_id, workout_id, "next week"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let mut req = request(user_id, workout_id, "2024-06-10");
        req.date = None;
        assert_eq!(
            schedule(&store, req).await.unwrap_err().to_string(),
            "date is required"
        );
    }

    #[tokio::test]
    async fn completion_is_one_way() {
        let (store, user_id, workout_id) = fixture().await;
        let plan = schedule(&store, request(user_id, workout_id, "2024-06-10")).await.unwrap();

        let done = complete(
            &store,
            plan.id,
            CompletePlanRequest {
                calories_burned: Some(320.0),
                duration_min: Some(50),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(done.status, PlanStatus::Completed);
        assert_eq!(done.calories_burned, Some(320.0));

        // Re-asserting completed amends metrics.
        let amended = complete(
            &store,
            plan.id,
            CompletePlanRequest {
                calories_burned: Some(340.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(amended.calories_burned, Some(340.0));
        assert_eq!(amended.duration_min, Some(50));

        for status in ["planned", "missed"] {
            let err = complete(
                &store,
                plan.id,
                CompletePlanRequest {
                    status: Some(status.into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }
    }

    #[tokio::test]
    async fn concurrent_completed_and_missed_cannot_both_win() {
        let (store, user_id, workout_id) = fixture().await;
        let plan = schedule(&store, request(user_id, workout_id, "2024-06-10")).await.unwrap();
        let ask = |status: &str| CompletePlanRequest {
            status: Some(status.into()),
            ..Default::default()
        };

        let (done, missed) = tokio::join!(
            complete(&store, plan.id, ask("completed")),
            complete(&store, plan.id, ask("missed")),
        );
        let winners = [done.is_ok(), missed.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1);
        let loser = done.err().or(missed.err());
        assert!(matches!(loser, Some(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn unknown_status_and_missing_plan() {
        let (store, _, _) = fixture().await;
        let err = complete(
            &store,
            Uuid::new_v4(),
            CompletePlanRequest {
                status: Some("skipped".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");

        let err = complete(&store, Uuid::new_v4(), CompletePlanRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(remove(&store, Uuid::new_v4()).await, Err(AppError::NotFound(_))));
    }
}
