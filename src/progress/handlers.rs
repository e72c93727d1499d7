use axum::{extract::State, routing::get, Router};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    dto::{DetailedProgress, ProgressOverview},
    services,
};
use crate::{
    api::{Success, UserId},
    error::AppError,
    state::AppState,
};

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/progress/:user_id", get(get_overview))
        .route("/progress/:user_id/detailed", get(get_detailed))
}

#[instrument(skip(state))]
pub async fn get_overview(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Success<ProgressOverview>, AppError> {
    let view = services::overview(
        state.store.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
        state.row_limit(),
    )
    .await?;
    Ok(Success::new(view))
}

#[instrument(skip(state))]
pub async fn get_detailed(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Success<DetailedProgress>, AppError> {
    let summary = services::detailed(
        state.store.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
        state.row_limit(),
    )
    .await?;
    Ok(Success::new(summary))
}
