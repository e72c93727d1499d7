use axum::{
    extract::State,
    routing::get,
    Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use super::{dto::TrackerQuery, period::Period, services::tracker_report};
use crate::{
    api::{ApiQuery, Success, UserId},
    error::AppError,
    state::AppState,
};

pub fn tracker_routes() -> Router<AppState> {
    Router::new().route("/tracker/:user_id", get(get_tracker))
}

/// GET /tracker/:userId?period=weekly|monthly|total
#[instrument(skip(state))]
pub async fn get_tracker(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ApiQuery(q): ApiQuery<TrackerQuery>,
) -> Result<Success<super::dto::TrackerReport>, AppError> {
    let period = Period::from_query(q.period.as_deref())?;
    let report = tracker_report(
        state.store.as_ref(),
        user_id,
        period,
        OffsetDateTime::now_utc(),
        state.row_limit(),
    )
    .await?;
    Ok(Success::new(report))
}
