use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a scheduled workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Planned,
    Completed,
    Missed,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Planned => "planned",
            PlanStatus::Completed => "completed",
            PlanStatus::Missed => "missed",
        }
    }

    /// Only planned -> completed | missed, or re-asserting the current status.
    pub fn can_become(self, next: PlanStatus) -> bool {
        self == next || self == PlanStatus::Planned
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(PlanStatus::Planned),
            "completed" => Ok(PlanStatus::Completed),
            "missed" => Ok(PlanStatus::Missed),
            other => Err(format!("unknown plan status `{other}`")),
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

impl Intensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => Err(format!("unknown intensity `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Breakfast" => Ok(MealType::Breakfast),
            "Lunch" => Ok(MealType::Lunch),
            "Dinner" => Ok(MealType::Dinner),
            "Snack" => Ok(MealType::Snack),
            other => Err(format!("unknown meal type `{other}`")),
        }
    }
}

/// User record. Identity and credentials are owned by the auth service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: String,
    pub xp: i64,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Read-only workout template referenced by plans.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration_min: i32,
    pub difficulty: String,
    pub body_parts: Vec<String>,
    pub calories_per_min: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub status: PlanStatus,
    pub notes: Option<String>,
    pub calories_burned: Option<f64>,
    pub duration_min: Option<i32>,
    pub body_parts: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A plan joined with its template; the template is `None` when the reference dangles.
#[derive(Debug, Clone)]
pub struct PlanWithWorkout {
    pub plan: WorkoutPlan,
    pub workout: Option<WorkoutTemplate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_type: String,
    pub duration_min: i32,
    pub calories_burned: f64,
    pub intensity: Intensity,
    pub notes: Option<String>,
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_name: String,
    pub calories: f64,
    #[serde(rename = "protein")]
    pub protein_g: f64,
    #[serde(rename = "carbs")]
    pub carbs_g: f64,
    #[serde(rename = "fat")]
    pub fat_g: f64,
    pub meal_type: MealType,
    pub notes: Option<String>,
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise: String,
    pub accuracy: f64,
    #[serde(rename = "duration")]
    pub duration_sec: Option<i32>,
    pub keypoints: Option<serde_json::Value>,
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutLog {
    pub user_id: Uuid,
    pub workout_type: String,
    pub duration_min: i32,
    pub calories_burned: f64,
    pub intensity: Intensity,
    pub notes: Option<String>,
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMealLog {
    pub user_id: Uuid,
    pub food_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub meal_type: MealType,
    pub notes: Option<String>,
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPoseLog {
    pub user_id: Uuid,
    pub exercise: String,
    pub accuracy: f64,
    pub duration_sec: Option<i32>,
    pub keypoints: Option<serde_json::Value>,
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutPlan {
    pub user_id: Uuid,
    pub workout_id: Uuid,
    pub date: OffsetDateTime,
    pub notes: Option<String>,
    pub duration_min: Option<i32>,
    pub body_parts: Vec<String>,
}

/// Fields a status change may amend. `None` leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct PlanUpdate {
    pub status: PlanStatus,
    pub calories_burned: Option<f64>,
    pub duration_min: Option<i32>,
}

/// Outcome of a guarded status change. The guard and the write happen in one step.
#[derive(Debug, Clone)]
pub enum PlanTransition {
    Applied(WorkoutPlan),
    /// The plan exists but its current status does not allow the change.
    Rejected(PlanStatus),
    Missing,
}

/// All-time counters for one user, aggregated by the store rather than over capped reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserTotals {
    pub completed_plans: i64,
    pub plan_calories: f64,
    pub workout_logs: i64,
    pub workout_calories: f64,
    pub meal_logs: i64,
    pub meal_calories: f64,
    pub meal_protein_g: f64,
    pub pose_logs: i64,
    pub pose_accuracy_sum: f64,
}

/// Inclusive window on a timestamp column; both ends optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
}

impl TimeRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(from: OffsetDateTime) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.from.map_or(true, |f| at >= f) && self.to.map_or(true, |t| at <= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn plan_status_is_one_way() {
        use PlanStatus::*;
        assert!(Planned.can_become(Completed));
        assert!(Planned.can_become(Missed));
        assert!(Completed.can_become(Completed));
        assert!(!Completed.can_become(Planned));
        assert!(!Completed.can_become(Missed));
        assert!(!Missed.can_become(Completed));
    }

    #[test]
    fn time_range_bounds_are_inclusive() {
        let range = TimeRange {
            from: Some(datetime!(2024-03-01 00:00 UTC)),
            to: Some(datetime!(2024-03-31 23:59 UTC)),
        };
        assert!(range.contains(datetime!(2024-03-01 00:00 UTC)));
        assert!(range.contains(datetime!(2024-03-31 23:59 UTC)));
        assert!(!range.contains(datetime!(2024-02-29 23:59 UTC)));
        assert!(TimeRange::all().contains(datetime!(1999-01-01 00:00 UTC)));
    }
}
