//! State management module
//! 
//! This module contains the timer state machine, the timer collection, the
//! completion settings and the shared application state.

pub mod app_state;
pub mod events;
pub mod manager;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use events::TimerEvent;
pub use manager::TimerManager;
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use timer_state::{Timer, TimerSnapshot, TimerState};
