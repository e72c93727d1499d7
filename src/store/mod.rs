pub mod memory;
pub mod postgres;
pub mod repo_types;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

pub use memory::{MemoryStore, DEMO_USER_ID};
pub use postgres::PgStore;
pub use repo_types::*;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(e),
            other => StoreError::Query(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document-store access used by every feature module.
///
/// Reads never mutate; every list read takes an explicit row cap so a single
/// request cannot pull an unbounded result set.
#[async_trait]
pub trait FitnessStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// Completed plans newest first, joined with their templates.
    async fn completed_plans(
        &self,
        user_id: Uuid,
        since: Option<OffsetDateTime>,
        limit: i64,
    ) -> StoreResult<Vec<PlanWithWorkout>>;

    async fn workout_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
        limit: i64,
    ) -> StoreResult<Vec<WorkoutLog>>;

    async fn meal_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
        meal_type: Option<MealType>,
        limit: i64,
    ) -> StoreResult<Vec<MealLog>>;

    async fn pose_logs(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PoseLog>>;

    /// Uncapped counts and sums over everything the user has recorded.
    async fn user_totals(&self, user_id: Uuid) -> StoreResult<UserTotals>;

    async fn insert_workout_log(&self, log: NewWorkoutLog) -> StoreResult<WorkoutLog>;
    async fn delete_workout_log(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_meal_log(&self, log: NewMealLog) -> StoreResult<MealLog>;
    async fn delete_meal_log(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_pose_log(&self, log: NewPoseLog) -> StoreResult<PoseLog>;

    async fn list_workouts(&self, limit: i64) -> StoreResult<Vec<WorkoutTemplate>>;
    async fn find_workout(&self, id: Uuid) -> StoreResult<Option<WorkoutTemplate>>;

    async fn insert_plan(&self, plan: NewWorkoutPlan) -> StoreResult<WorkoutPlan>;
    /// Plans of a user ascending by date.
    async fn list_plans(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PlanWithWorkout>>;
    /// Applies `update` only if the stored status may become `update.status`.
    async fn transition_plan(&self, id: Uuid, update: PlanUpdate) -> StoreResult<PlanTransition>;
    async fn delete_plan(&self, id: Uuid) -> StoreResult<bool>;
}
