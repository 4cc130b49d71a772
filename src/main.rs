//! Desk Timer - A local daemon managing independent countdown timers
//! 
//! This is the main entry point for the desk-timer daemon.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use desk_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{ticker_task, wake_up_recovery_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("desk_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting desk-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, settings={}",
          config.host, config.port, config.tick_ms, config.settings_path().display());

    // Create application state
    let state = Arc::new(AppState::new(&config));

    // Start the background tasks
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        ticker_task(ticker_state).await;
    });

    let wake_state = Arc::clone(&state);
    tokio::spawn(async move {
        wake_up_recovery_task(wake_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    
    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET/POST   /timers                 - List or create timers");
    info!("  GET/DELETE /timers/:id             - Inspect or delete a timer");
    info!("  POST       /timers/:id/start|pause|reset|toggle");
    info!("  PUT        /timers/:id/duration    - Configure hours/minutes/seconds");
    info!("  POST       /timers/:id/preset      - Load a minute preset");
    info!("  PUT        /timers/:id/title       - Rename a timer");
    info!("  POST       /hotkeys/toggle|reset|show-hide");
    info!("  GET/PUT    /settings               - Completion settings");
    info!("  GET        /status, /health, /sounds");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);
    
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
