use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{body_parts::BodyPart, period::Period};

#[derive(Debug, Deserialize)]
pub struct TrackerQuery {
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub workout_title: String,
    pub duration: i64,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPartStat {
    pub name: BodyPart,
    pub display_name: &'static str,
    pub workouts: u32,
    pub total_duration: i64,
    pub total_calories: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_workout: Option<OffsetDateTime>,
    pub progress_percentage: u32,
    pub target_workouts: u32,
    pub workouts_list: Vec<WorkoutEntry>,
}

impl BodyPartStat {
    pub fn empty(name: BodyPart, target_workouts: u32) -> Self {
        Self {
            name,
            display_name: name.display_name(),
            workouts: 0,
            total_duration: 0,
            total_calories: 0.0,
            last_workout: None,
            progress_percentage: 0,
            target_workouts,
            workouts_list: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    pub total_duration: i64,
    pub total_calories: f64,
    pub average_duration: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerReport {
    pub period: Period,
    pub total_workouts: usize,
    pub body_part_stats: Vec<BodyPartStat>,
    pub summary: TrackerSummary,
}

#[cfg(test)]
impl TrackerReport {
    pub fn stat(&self, part: BodyPart) -> Option<&BodyPartStat> {
        self.body_part_stats.iter().find(|s| s.name == part)
    }
}
