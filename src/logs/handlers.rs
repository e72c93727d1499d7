use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{
    dto::{
        Created, Deleted, LogRangeQuery, MealLogList, MealLogRequest, PoseLogList, PoseLogRequest,
        WorkoutLogList, WorkoutLogRequest,
    },
    services,
};
use crate::{
    api::{ApiJson, ApiQuery, RecordId, Success, UserId},
    error::AppError,
    state::AppState,
    store::{MealLog, PoseLog, WorkoutLog},
};

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/workout/log", post(create_workout_log))
        // GET takes a user id, DELETE a log id; both live under one segment.
        .route(
            "/workout/log/:id",
            get(list_workout_logs).delete(delete_workout_log),
        )
        .route("/meal/log", post(create_meal_log))
        .route("/meal/log/:id", get(list_meal_logs).delete(delete_meal_log))
        .route("/pose/log", post(create_pose_log))
        .route("/pose/logs/:user_id", get(list_pose_logs))
}

#[instrument(skip(state, body))]
pub async fn create_workout_log(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<WorkoutLogRequest>,
) -> Result<(StatusCode, Success<Created<WorkoutLog>>), AppError> {
    let log = services::log_workout(state.store.as_ref(), body, OffsetDateTime::now_utc()).await?;
    info!(log_id = %log.id, user_id = %log.user_id, "workout logged");
    Ok((StatusCode::CREATED, Success::new(Created { log })))
}

#[instrument(skip(state))]
pub async fn list_workout_logs(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ApiQuery(q): ApiQuery<LogRangeQuery>,
) -> Result<Success<WorkoutLogList>, AppError> {
    let list = services::workout_history(state.store.as_ref(), user_id, &q).await?;
    Ok(Success::new(list))
}

#[instrument(skip(state))]
pub async fn delete_workout_log(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Success<Deleted>, AppError> {
    if !state.store.delete_workout_log(id).await? {
        return Err(AppError::not_found("Log not found"));
    }
    Ok(Success::new(Deleted {
        message: "Workout log deleted",
    }))
}

#[instrument(skip(state, body))]
pub async fn create_meal_log(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<MealLogRequest>,
) -> Result<(StatusCode, Success<Created<MealLog>>), AppError> {
    let log = services::log_meal(state.store.as_ref(), body, OffsetDateTime::now_utc()).await?;
    info!(log_id = %log.id, user_id = %log.user_id, "meal logged");
    Ok((StatusCode::CREATED, Success::new(Created { log })))
}

#[instrument(skip(state))]
pub async fn list_meal_logs(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ApiQuery(q): ApiQuery<LogRangeQuery>,
) -> Result<Success<MealLogList>, AppError> {
    let list = services::meal_history(state.store.as_ref(), user_id, &q).await?;
    Ok(Success::new(list))
}

#[instrument(skip(state))]
pub async fn delete_meal_log(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Success<Deleted>, AppError> {
    if !state.store.delete_meal_log(id).await? {
        return Err(AppError::not_found("Log not found"));
    }
    Ok(Success::new(Deleted {
        message: "Meal log deleted",
    }))
}

#[instrument(skip(state, body))]
pub async fn create_pose_log(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PoseLogRequest>,
) -> Result<(StatusCode, Success<Created<PoseLog>>), AppError> {
    let log = services::log_pose(state.store.as_ref(), body, OffsetDateTime::now_utc()).await?;
    Ok((StatusCode::CREATED, Success::new(Created { log })))
}

#[instrument(skip(state))]
pub async fn list_pose_logs(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Success<PoseLogList>, AppError> {
    let list = services::pose_history(state.store.as_ref(), user_id).await?;
    Ok(Success::new(list))
}
