//! HTTP API module
//! 
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler).post(create_timer_handler))
        .route("/timers/:id", get(get_timer_handler).delete(delete_timer_handler))
        .route("/timers/:id/start", post(start_handler))
        .route("/timers/:id/pause", post(pause_handler))
        .route("/timers/:id/reset", post(reset_handler))
        .route("/timers/:id/toggle", post(toggle_handler))
        .route("/timers/:id/duration", put(duration_handler))
        .route("/timers/:id/preset", post(preset_handler))
        .route("/timers/:id/title", put(title_handler))
        // Global hotkey layer
        .route("/hotkeys/toggle", post(hotkey_toggle_handler))
        .route("/hotkeys/reset", post(hotkey_reset_handler))
        .route("/hotkeys/show-hide", post(hotkey_show_hide_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/sounds", get(sounds_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
