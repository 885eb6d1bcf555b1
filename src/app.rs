use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/status", get(handlers::get_status))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/habits", get(handlers::get_habits))
        .route("/api/habits/water", post(handlers::adjust_water))
        .route("/api/habits/vitamins", post(handlers::toggle_vitamins))
        .route("/api/habits/mood", post(handlers::set_mood))
        .route("/api/habits/journal", post(handlers::set_journal))
        .route("/api/habits/routine", post(handlers::toggle_routine))
        .route("/api/routine/catalog", get(handlers::get_routine_catalog))
        .route("/api/end-day", post(handlers::end_day))
        .with_state(state)
}
