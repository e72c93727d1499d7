//! Per-user progress: totals, averages, streak and seven-day series.

mod dto;
pub mod handlers;
pub mod series;
pub mod services;
pub mod streak;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::progress_routes()
}
