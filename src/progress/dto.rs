use serde::Serialize;

use super::series::{DailyBalance, DailyWorkouts};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub workouts_completed: i64,
    pub avg_calories_burned: i64,
    pub avg_pose_accuracy: i64,
    pub xp: i64,
    pub last7_days: Vec<DailyWorkouts>,
    pub total_workouts: i64,
    pub total_calories_burned: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    pub workouts: usize,
    pub calories_burned: f64,
    pub calories_consumed: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedProgress {
    pub total_workouts: i64,
    pub total_calories_burned: f64,
    pub total_calories_consumed: f64,
    pub avg_protein_intake: i64,
    pub avg_pose_accuracy: i64,
    pub streak_days: u32,
    pub weekly_graph: Vec<DailyBalance>,
    pub weekly_stats: WindowStats,
    pub monthly_stats: WindowStats,
}
