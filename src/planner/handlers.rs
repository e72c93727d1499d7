use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CompletePlanRequest, PlanChanged, PlanDeleted, PlanList, SchedulePlanRequest, WorkoutList},
    services,
};
use crate::{
    api::{ApiJson, OptionalJson, RecordId, Success, UserId},
    error::AppError,
    state::AppState,
};

pub fn planner_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts))
        .route("/planner", post(schedule_plan))
        // GET takes a user id, DELETE a plan id.
        .route("/planner/:id", get(list_plans).delete(delete_plan))
        .route("/planner/:id/complete", patch(complete_plan))
}

#[instrument(skip(state))]
pub async fn list_workouts(State(state): State<AppState>) -> Result<Success<WorkoutList>, AppError> {
    let list = services::list_workouts(state.store.as_ref()).await?;
    Ok(Success::new(list))
}

#[instrument(skip(state, body))]
pub async fn schedule_plan(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SchedulePlanRequest>,
) -> Result<(StatusCode, Success<PlanChanged>), AppError> {
    let plan = services::schedule(state.store.as_ref(), body).await?;
    info!(plan_id = %plan.id, user_id = %plan.user_id, "plan created");
    Ok((
        StatusCode::CREATED,
        Success::new(PlanChanged {
            message: "Workout scheduled successfully",
            plan,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Success<PlanList>, AppError> {
    let list = services::user_plans(state.store.as_ref(), user_id).await?;
    Ok(Success::new(list))
}

#[instrument(skip(state, body))]
pub async fn complete_plan(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    OptionalJson(body): OptionalJson<CompletePlanRequest>,
) -> Result<Success<PlanChanged>, AppError> {
    let plan = services::complete(state.store.as_ref(), id, body).await?;
    info!(plan_id = %plan.id, status = %plan.status, "plan status updated");
    Ok(Success::new(PlanChanged {
        message: "Workout plan updated",
        plan,
    }))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Success<PlanDeleted>, AppError> {
    services::remove(state.store.as_ref(), id).await?;
    Ok(Success::new(PlanDeleted {
        message: "Workout plan deleted",
    }))
}
