use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{PlanStatus, PlanWithWorkout, WorkoutPlan, WorkoutTemplate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlanRequest {
    pub user_id: Option<String>,
    pub workout_id: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub duration_min: Option<i32>,
    #[serde(default)]
    pub body_parts: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePlanRequest {
    pub status: Option<String>,
    pub calories_burned: Option<f64>,
    pub duration_min: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PlanChanged {
    pub message: &'static str,
    pub plan: WorkoutPlan,
}

#[derive(Debug, Serialize)]
pub struct PlanDeleted {
    pub message: &'static str,
}

/// Plan row as listed in a user's schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub workout_id: Uuid,
    pub workout_title: Option<String>,
    pub status: PlanStatus,
    pub notes: Option<String>,
    pub calories_burned: Option<f64>,
    pub duration_min: Option<i32>,
    pub body_parts: Vec<String>,
}

impl From<PlanWithWorkout> for PlanView {
    fn from(p: PlanWithWorkout) -> Self {
        let PlanWithWorkout { plan, workout } = p;
        Self {
            id: plan.id,
            date: plan.date,
            workout_id: plan.workout_id,
            workout_title: workout.map(|w| w.title),
            status: plan.status,
            notes: plan.notes,
            calories_burned: plan.calories_burned,
            duration_min: plan.duration_min,
            body_parts: plan.body_parts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanList {
    pub plans: Vec<PlanView>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutList {
    pub workouts: Vec<WorkoutTemplate>,
}
