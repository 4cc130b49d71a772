//! Completion side effects
//!
//! When a timer's completion latch flips, each enabled action runs once. The
//! actions are independent: a failing sound does not stop the notification.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{error::ActionError, state::{Settings, TimerSnapshot}};

/// Desktop notification content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub title: String,
    pub subtitle: String,
    pub body: String,
}

impl CompletionNotice {
    pub fn for_timer(timer: &TimerSnapshot) -> Self {
        Self {
            title: "Timer Completed".to_string(),
            subtitle: timer.title.clone(),
            body: "Your timer has finished!".to_string(),
        }
    }
}

/// Collaborators that deliver completion side effects
pub trait CompletionActions: Send + Sync {
    fn play_sound(&self, sound_name: &str) -> Result<(), ActionError>;
    fn notify(&self, notice: &CompletionNotice) -> Result<(), ActionError>;
    fn flash(&self, timer: &TimerSnapshot) -> Result<(), ActionError>;
}

/// Runs the enabled completion actions for a finished timer
#[derive(Clone)]
pub struct CompletionDispatcher {
    actions: Arc<dyn CompletionActions>,
}

impl CompletionDispatcher {
    pub fn new(actions: Arc<dyn CompletionActions>) -> Self {
        Self { actions }
    }

    pub fn dispatch(&self, settings: &Settings, timer: &TimerSnapshot) {
        info!("Timer '{}' ({}) completed", timer.title, timer.id);

        if settings.sound_enabled {
            if let Err(e) = self.actions.play_sound(&settings.sound_name) {
                warn!("Completion sound failed for timer {}: {}", timer.id, e);
            }
        }

        if settings.notification_enabled {
            if let Err(e) = self.actions.notify(&CompletionNotice::for_timer(timer)) {
                warn!("Completion notification failed for timer {}: {}", timer.id, e);
            }
        }

        if settings.flash_enabled {
            if let Err(e) = self.actions.flash(timer) {
                warn!("Completion flash failed for timer {}: {}", timer.id, e);
            }
        }

        debug!("Completion actions dispatched for timer {}", timer.id);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every action; selected actions can be made to fail
    #[derive(Default)]
    pub struct RecordingActions {
        pub calls: Mutex<Vec<String>>,
        pub fail_sound: bool,
        pub fail_notify: bool,
    }

    impl RecordingActions {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl CompletionActions for RecordingActions {
        fn play_sound(&self, sound_name: &str) -> Result<(), ActionError> {
            self.record(format!("sound:{sound_name}"));
            if self.fail_sound {
                return Err(ActionError::Unavailable("sound player".to_string()));
            }
            Ok(())
        }

        fn notify(&self, notice: &CompletionNotice) -> Result<(), ActionError> {
            self.record(format!("notify:{}", notice.subtitle));
            if self.fail_notify {
                return Err(ActionError::Unavailable("notifications".to_string()));
            }
            Ok(())
        }

        fn flash(&self, timer: &TimerSnapshot) -> Result<(), ActionError> {
            self.record(format!("flash:{}", timer.title));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{testing::RecordingActions, *};
    use crate::{clock::ManualClock, state::Timer};

    fn snapshot() -> TimerSnapshot {
        Timer::new("Tea", Arc::new(ManualClock::new())).snapshot()
    }

    #[test]
    fn runs_only_enabled_actions() {
        let actions = Arc::new(RecordingActions::default());
        let dispatcher = CompletionDispatcher::new(actions.clone());

        dispatcher.dispatch(&Settings::default(), &snapshot());
        assert_eq!(actions.calls(), vec!["sound:Glass", "notify:Tea"]);
    }

    #[test]
    fn failures_do_not_block_other_actions() {
        let actions = Arc::new(RecordingActions {
            fail_sound: true,
            fail_notify: true,
            ..Default::default()
        });
        let dispatcher = CompletionDispatcher::new(actions.clone());
        let settings = Settings { flash_enabled: true, ..Settings::default() };

        dispatcher.dispatch(&settings, &snapshot());
        assert_eq!(actions.calls(), vec!["sound:Glass", "notify:Tea", "flash:Tea"]);
    }

    #[test]
    fn everything_disabled_does_nothing() {
        let actions = Arc::new(RecordingActions::default());
        let dispatcher = CompletionDispatcher::new(actions.clone());
        let settings = Settings {
            sound_enabled: false,
            notification_enabled: false,
            flash_enabled: false,
            ..Settings::default()
        };

        dispatcher.dispatch(&settings, &snapshot());
        assert!(actions.calls().is_empty());
    }

    #[test]
    fn notice_names_the_timer() {
        let notice = CompletionNotice::for_timer(&snapshot());
        assert_eq!(notice.title, "Timer Completed");
        assert_eq!(notice.subtitle, "Tea");
        assert_eq!(notice.body, "Your timer has finished!");
    }
}
