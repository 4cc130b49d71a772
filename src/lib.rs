//! Desk Timer - A local daemon managing independent countdown timers
//! 
//! This library provides the timer state machine with monotonic drift
//! correction, the timer collection, completion side effects and the HTTP
//! control surface used by menu-bar, hotkey and window front-ends.

pub mod clock;
pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Timer, TimerManager, TimerState};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
