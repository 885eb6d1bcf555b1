use crate::calendar::build_calendar_at;
use crate::errors::AppError;
use crate::habits::ROUTINE_CATALOG;
use crate::models::{
    CalendarResponse, ClockStatus, EndDayResponse, JournalRequest, Mood, MoodRequest,
    RoutineRequest, StatusResponse, SummaryResponse, TransientDailyFields, WaterRequest,
};
use crate::state::AppState;
use crate::status::{evaluate_at, headline};
use crate::ui::render_index;
use axum::{Json, extract::State, response::Html};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.status_config))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let sample = *state.ticks.borrow();
    let session_active = state.session.is_active(sample.at.date());
    let shown = if session_active {
        sample.status
    } else {
        ClockStatus::FULL
    };
    let (title, blurb) = headline(shown, session_active, &state.status_config);

    let date = sample.at.date().format("%Y-%m-%d").to_string();
    let reminder = state
        .reminders
        .borrow()
        .clone()
        .filter(|reminder| reminder.date == date);

    Json(StatusResponse {
        time: sample.at,
        date,
        phase: shown.phase,
        health: shown.health,
        title,
        blurb,
        session_active,
        reminder,
    })
}

pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let progress = state.coordinator.progress().await;
    Json(SummaryResponse {
        streak: progress.streak,
        history: progress.history.into_iter().collect(),
        reset_generation: state.coordinator.reset_generation(),
    })
}

pub async fn get_calendar(State(state): State<AppState>) -> Json<CalendarResponse> {
    let today = state.clock.now().date();
    let progress = state.coordinator.progress().await;
    Json(build_calendar_at(today, &progress.history))
}

pub async fn get_habits(State(state): State<AppState>) -> Json<TransientDailyFields> {
    Json(state.habits.load().await)
}

pub async fn get_routine_catalog() -> Json<Vec<&'static str>> {
    Json(ROUTINE_CATALOG.to_vec())
}

pub async fn adjust_water(
    State(state): State<AppState>,
    Json(payload): Json<WaterRequest>,
) -> Result<Json<TransientDailyFields>, AppError> {
    state.habits.adjust_water(payload.delta).await?;
    Ok(Json(state.habits.load().await))
}

pub async fn toggle_vitamins(
    State(state): State<AppState>,
) -> Result<Json<TransientDailyFields>, AppError> {
    state.habits.toggle_vitamins().await?;
    Ok(Json(state.habits.load().await))
}

pub async fn set_mood(
    State(state): State<AppState>,
    Json(payload): Json<MoodRequest>,
) -> Result<Json<TransientDailyFields>, AppError> {
    let Some(mood) = Mood::parse(&payload.mood) else {
        return Err(AppError::bad_request("mood must be 'good', 'meh' or 'bad'"));
    };
    state.habits.set_mood(mood).await?;
    Ok(Json(state.habits.load().await))
}

pub async fn set_journal(
    State(state): State<AppState>,
    Json(payload): Json<JournalRequest>,
) -> Result<Json<TransientDailyFields>, AppError> {
    state.habits.set_journal(payload.text).await?;
    Ok(Json(state.habits.load().await))
}

pub async fn toggle_routine(
    State(state): State<AppState>,
    Json(payload): Json<RoutineRequest>,
) -> Result<Json<TransientDailyFields>, AppError> {
    state.habits.toggle_routine(&payload.item).await?;
    Ok(Json(state.habits.load().await))
}

pub async fn end_day(State(state): State<AppState>) -> Result<Json<EndDayResponse>, AppError> {
    let now = state.clock.now();
    if !state.session.end(now.date()) {
        return Err(AppError::conflict("the day has already been ended"));
    }

    let status = evaluate_at(now, &state.status_config);
    let fields = state.habits.load().await;

    // The remote write keeps running on its own; local state is already committed.
    let receipt = state.coordinator.end_day(now, status, fields).await;
    info!(date = %receipt.date, streak = receipt.streak, "session ended");

    Ok(Json(EndDayResponse {
        date: receipt.date,
        streak: receipt.streak,
        publish_issued: true,
        snapshot: receipt.snapshot,
    }))
}
