use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{MealLog, PoseLog, WorkoutLog};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLogRequest {
    pub user_id: Option<String>,
    pub workout_type: Option<String>,
    pub duration_min: Option<i32>,
    pub notes: Option<String>,
    pub intensity: Option<String>,
    pub user_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogRequest {
    pub user_id: Option<String>,
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub meal_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseLogRequest {
    pub user_id: Option<String>,
    pub exercise: Option<String>,
    pub accuracy: Option<f64>,
    pub duration: Option<i32>,
    pub keypoints: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub meal_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub log: T,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLogSummary {
    pub total_workouts: usize,
    pub total_calories_burned: f64,
    pub total_duration: i64,
    pub average_calories_per_workout: i64,
}

#[derive(Debug, Serialize)]
pub struct WorkoutLogList {
    pub logs: Vec<WorkoutLog>,
    pub summary: WorkoutLogSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogSummary {
    pub total_meals: usize,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub average_calories_per_meal: i64,
    pub avg_protein_intake: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogList {
    pub logs: Vec<MealLog>,
    pub summary: MealLogSummary,
    pub daily_totals: BTreeMap<String, DayTotals>,
}

#[derive(Debug, Serialize)]
pub struct PoseLogList {
    pub logs: Vec<PoseLog>,
}
