//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::info;

use super::{Settings, SettingsPatch, SettingsStore, TimerEvent, TimerManager};
use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    error::{AppError, TimerError},
    services::{CompletionActions, CompletionDispatcher, SystemActions},
    utils::format,
};

/// Buffered events per subscriber before a slow one starts lagging
const EVENT_CAPACITY: usize = 256;

/// Shared state behind every handler and background task
///
/// All timer mutation goes through the single `timers` lock, so control calls,
/// scheduled ticks and wake-up ticks are serialized.
pub struct AppState {
    /// Timer collection
    pub timers: Mutex<TimerManager>,
    /// Where settings are persisted
    pub settings_store: SettingsStore,
    /// Channel for timer change notifications
    pub events_tx: broadcast::Sender<TimerEvent>,
    /// Background task cadence
    pub tick_interval: Duration,
    pub wake_check_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the state with the system clock and desktop completion actions
    pub fn new(config: &Config) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let actions = Arc::new(SystemActions::new(events_tx.clone()));

        let clock = SystemClock::new();
        if !clock.counts_through_sleep() {
            info!("Clock pauses during sleep, relying on wake detection to catch up");
        }
        Self::with_parts(config, Arc::new(clock), actions, events_tx)
    }

    /// Create the state from explicit collaborators
    pub fn with_parts(
        config: &Config,
        clock: Arc<dyn Clock>,
        actions: Arc<dyn CompletionActions>,
        events_tx: broadcast::Sender<TimerEvent>,
    ) -> Self {
        let settings_store = SettingsStore::new(config.settings_path());
        let settings = settings_store.load();
        info!("Loaded settings from {}: {:?}", settings_store.path().display(), settings);

        let manager = TimerManager::new(
            clock,
            settings,
            CompletionDispatcher::new(actions),
            events_tx.clone(),
        );

        Self {
            timers: Mutex::new(manager),
            settings_store,
            events_tx,
            tick_interval: config.tick_interval(),
            wake_check_interval: config.wake_check_interval(),
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, TimerManager>, AppError> {
        self.timers.lock().map_err(|_| AppError::LockPoisoned("timer collection"))
    }

    /// Run a read or internal operation against the timer collection
    pub fn with_timers<R>(&self, f: impl FnOnce(&mut TimerManager) -> R) -> Result<R, AppError> {
        let mut timers = self.lock_timers()?;
        Ok(f(&mut timers))
    }

    /// Run a user control call against the timer collection and record it
    pub fn control<R>(
        &self,
        action: &str,
        f: impl FnOnce(&mut TimerManager) -> Result<R, TimerError>,
    ) -> Result<R, AppError> {
        let result = {
            let mut timers = self.lock_timers()?;
            f(&mut timers)?
        };
        self.record_action(action);
        Ok(result)
    }

    pub fn get_settings(&self) -> Result<Settings, AppError> {
        self.with_timers(|timers| timers.settings().clone())
    }

    /// Apply a partial settings update, persist it, then make it live
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, AppError> {
        let mut timers = self.lock_timers()?;
        let mut settings = timers.settings().clone();
        settings.apply(patch)?;

        self.settings_store.save(&settings)?;
        info!("Settings updated: {:?}", settings);
        timers.set_settings(settings.clone());
        drop(timers);

        self.record_action("settings");
        Ok(settings)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format::uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, services::completion::testing::RecordingActions};

    fn state(dir: &tempfile::TempDir) -> AppState {
        let config = Config::for_settings(dir.path().join("settings.json"));
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        AppState::with_parts(
            &config,
            Arc::new(ManualClock::new()),
            Arc::new(RecordingActions::default()),
            events_tx,
        )
    }

    #[test]
    fn settings_update_is_persisted_and_live() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let updated = state
            .update_settings(SettingsPatch { flash_enabled: Some(true), ..Default::default() })
            .unwrap();
        assert!(updated.flash_enabled);
        assert_eq!(state.get_settings().unwrap(), updated);
        assert_eq!(state.settings_store.load(), updated);
    }

    #[test]
    fn control_records_last_action_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        assert!(state.control("start", |t| t.start(uuid::Uuid::new_v4())).is_err());
        assert_eq!(state.get_last_action(), (None, None));

        let id = state.control("create", |t| Ok(t.create_timer())).unwrap();
        state.control("start", |t| t.start(id)).unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("start"));
        assert!(time.is_some());
    }
}
