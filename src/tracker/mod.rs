//! Body-part workout statistics over completed plans.

pub mod body_parts;
mod dto;
pub mod handlers;
pub mod period;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::tracker_routes()
}
