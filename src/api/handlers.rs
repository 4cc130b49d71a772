//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::{settings::AVAILABLE_SOUNDS, AppState, Settings, SettingsPatch, TimerSnapshot};
use super::responses::{
    ApiError, HealthResponse, ShowHideResponse, StatusResponse, TimerResponse, TimersResponse,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// One duration input field, as typed by the user or sent as a number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Whole(u64),
    Fraction(f64),
    Text(String),
}

impl DurationField {
    fn as_whole(&self) -> Option<u64> {
        match self {
            DurationField::Whole(v) => Some(*v),
            _ => None,
        }
    }

    fn as_text(&self) -> String {
        match self {
            DurationField::Whole(v) => v.to_string(),
            DurationField::Fraction(v) => v.to_string(),
            DurationField::Text(v) => v.clone(),
        }
    }
}

/// Body of PUT /timers/:id/duration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DurationRequest {
    pub hours: Option<DurationField>,
    pub minutes: Option<DurationField>,
    pub seconds: Option<DurationField>,
}

/// Body of POST /timers/:id/preset
#[derive(Debug, Clone, Deserialize)]
pub struct PresetRequest {
    pub minutes: u64,
}

/// Body of PUT /timers/:id/title
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

/// Handle GET /timers - List every timer in creation order
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<TimerSnapshot>> {
    Ok(Json(state.with_timers(|timers| timers.timers())?))
}

/// Handle POST /timers - Create a new stopped timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<TimerResponse>), ApiError> {
    let timer = state.control("create", |timers| {
        let id = timers.create_timer();
        timers.get(id)
    })?;
    info!("Create endpoint called - timer {} created", timer.id);
    Ok((StatusCode::CREATED, Json(TimerResponse::new("Timer created", timer))))
}

/// Handle GET /timers/:id - Look up one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TimerSnapshot> {
    let timer = state.with_timers(|timers| timers.get(id))??;
    Ok(Json(timer))
}

/// Handle DELETE /timers/:id - Delete a timer
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.control("delete", |timers| timers.delete_timer(id))?;
    info!("Delete endpoint called - timer {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /timers/:id/start - Start or resume a timer
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TimerResponse> {
    let timer = state.control("start", |timers| timers.start(id))?;
    Ok(Json(TimerResponse::new("Start requested", timer)))
}

/// Handle POST /timers/:id/pause - Pause a running timer
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TimerResponse> {
    let timer = state.control("pause", |timers| timers.pause(id))?;
    Ok(Json(TimerResponse::new("Pause requested", timer)))
}

/// Handle POST /timers/:id/reset - Reset a timer to stopped
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TimerResponse> {
    let timer = state.control("reset", |timers| timers.reset(id))?;
    Ok(Json(TimerResponse::new("Timer reset", timer)))
}

/// Handle POST /timers/:id/toggle - Start, pause or reset depending on state
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TimerResponse> {
    let timer = state.control("toggle", |timers| timers.toggle(id))?;
    Ok(Json(TimerResponse::new("Toggle requested", timer)))
}

/// Handle PUT /timers/:id/duration - Configure the next run
///
/// Whole numbers go through exact arithmetic; anything else is treated like
/// the text of the input fields.
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<DurationRequest>,
) -> ApiResult<TimerResponse> {
    let fields = [&request.hours, &request.minutes, &request.seconds];
    let whole: Option<Vec<u64>> = fields
        .iter()
        .map(|f| f.as_ref().map_or(Some(0), DurationField::as_whole))
        .collect();

    let timer = match whole {
        Some(v) => state.control("configure", |timers| timers.configure(id, v[0], v[1], v[2]))?,
        None => {
            let text: Vec<String> = fields
                .iter()
                .map(|f| f.as_ref().map(DurationField::as_text).unwrap_or_default())
                .collect();
            state.control("configure", |timers| {
                timers.configure_input(id, &text[0], &text[1], &text[2])
            })?
        }
    };
    Ok(Json(TimerResponse::new("Duration configured", timer)))
}

/// Handle POST /timers/:id/preset - Reset and load a minute preset
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<PresetRequest>,
) -> ApiResult<TimerResponse> {
    let timer = state.control("preset", |timers| timers.set_preset(id, request.minutes))?;
    Ok(Json(TimerResponse::new(format!("{} minute preset loaded", request.minutes), timer)))
}

/// Handle PUT /timers/:id/title - Rename a timer
pub async fn title_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TitleRequest>,
) -> ApiResult<TimerResponse> {
    let timer = state.control("title", |timers| timers.set_title(id, &request.title))?;
    Ok(Json(TimerResponse::new("Title updated", timer)))
}

/// Handle POST /hotkeys/toggle - Start/pause hotkey for every timer
pub async fn hotkey_toggle_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<TimersResponse> {
    let timers = state.control("hotkey-toggle", |timers| Ok(timers.toggle_all()))?;
    info!("Start/pause hotkey toggled {} timers", timers.len());
    Ok(Json(TimersResponse::new(timers)))
}

/// Handle POST /hotkeys/reset - Reset hotkey for every timer
pub async fn hotkey_reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimersResponse> {
    let timers = state.control("hotkey-reset", |timers| Ok(timers.reset_all()))?;
    info!("Reset hotkey reset {} timers", timers.len());
    Ok(Json(TimersResponse::new(timers)))
}

/// Handle POST /hotkeys/show-hide - Resolve the timer whose window to toggle
pub async fn hotkey_show_hide_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ShowHideResponse> {
    let (id, created) = state.control("hotkey-show-hide", |timers| Ok(timers.toggle_latest()))?;
    Ok(Json(ShowHideResponse { id, created }))
}

/// Handle GET /settings - Current completion settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> ApiResult<Settings> {
    Ok(Json(state.get_settings()?))
}

/// Handle PUT /settings - Update and persist completion settings
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Settings> {
    Ok(Json(state.update_settings(patch)?))
}

/// Handle GET /sounds - Selectable completion sounds
pub async fn sounds_handler() -> Json<Vec<&'static str>> {
    Json(AVAILABLE_SOUNDS.to_vec())
}

/// Handle GET /status - Return current daemon status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let (timer_count, running_count, settings) = state.with_timers(|timers| {
        let running = timers.timers().iter().filter(|t| t.state.is_active()).count();
        (timers.len(), running, timers.settings().clone())
    })?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer_count,
        running_count,
        settings,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream timer events, including flash requests
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events_rx = state.events_tx.subscribe();
    info!("Event subscriber connected ({} total)", state.events_tx.receiver_count());

    let events = stream::unfold(events_rx, |mut events_rx| async move {
        loop {
            match events_rx.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse) => return Some((Ok(sse), events_rx)),
                    Err(e) => warn!("Failed to encode timer event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
