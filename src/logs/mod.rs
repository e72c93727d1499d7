//! Workout, meal and pose logs: the raw activity the progress views read.

pub mod calories;
mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::log_routes()
}
