//! Collection of active timers
//!
//! The manager owns every timer and is the only way to reach one. Hotkeys,
//! wake-up recovery and API handlers all call into it directly, and every
//! change is published as a [`TimerEvent`] for observers.

use std::sync::Arc;

use tokio::sync::{broadcast, Notify};
use tracing::{debug, info};
use uuid::Uuid;

use super::{Settings, Timer, TimerEvent, TimerSnapshot};
use crate::{clock::Clock, error::TimerError, services::CompletionDispatcher};

/// Owns the active timers in creation order
pub struct TimerManager {
    timers: Vec<Timer>,
    clock: Arc<dyn Clock>,
    settings: Settings,
    dispatcher: CompletionDispatcher,
    events_tx: broadcast::Sender<TimerEvent>,
    activity: Arc<Notify>,
}

impl TimerManager {
    pub fn new(
        clock: Arc<dyn Clock>,
        settings: Settings,
        dispatcher: CompletionDispatcher,
        events_tx: broadcast::Sender<TimerEvent>,
    ) -> Self {
        Self {
            timers: Vec::new(),
            clock,
            settings,
            dispatcher,
            events_tx,
            activity: Arc::new(Notify::new()),
        }
    }

    /// Signalled on every published change; background work parks on it
    pub fn activity(&self) -> Arc<Notify> {
        Arc::clone(&self.activity)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Create a stopped timer titled after its position among active timers
    pub fn create_timer(&mut self) -> Uuid {
        let number = self.timers.len() + 1;
        let title = if number == 1 {
            "Timer".to_string()
        } else {
            format!("Timer {}", number)
        };

        let timer = Timer::new(title, Arc::clone(&self.clock));
        let id = timer.id();
        info!("Created timer '{}' ({})", timer.title(), id);
        self.publish(TimerEvent::Created(timer.snapshot()));
        self.timers.push(timer);
        id
    }

    pub fn delete_timer(&mut self, id: Uuid) -> Result<(), TimerError> {
        let index = self
            .timers
            .iter()
            .position(|t| t.id() == id)
            .ok_or(TimerError::NotFound(id))?;

        let timer = self.timers.remove(index);
        info!("Deleted timer '{}' ({})", timer.title(), id);
        self.publish(TimerEvent::Deleted { id });
        Ok(())
    }

    /// Snapshots of every timer in creation order
    pub fn timers(&self) -> Vec<TimerSnapshot> {
        self.timers.iter().map(Timer::snapshot).collect()
    }

    pub fn get(&self, id: Uuid) -> Result<TimerSnapshot, TimerError> {
        self.find(id).map(Timer::snapshot)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn any_running(&self) -> bool {
        self.timers.iter().any(|t| t.state().is_active())
    }

    pub fn start(&mut self, id: Uuid) -> Result<TimerSnapshot, TimerError> {
        self.update(id, |t| {
            t.start();
        })
    }

    /// Pause after one last recomputation so the frozen value is current
    pub fn pause(&mut self, id: Uuid) -> Result<TimerSnapshot, TimerError> {
        self.update(id, |t| {
            t.pause();
        })
    }

    pub fn reset(&mut self, id: Uuid) -> Result<TimerSnapshot, TimerError> {
        self.update(id, Timer::reset)
    }

    pub fn toggle(&mut self, id: Uuid) -> Result<TimerSnapshot, TimerError> {
        self.update(id, Timer::toggle)
    }

    pub fn configure(
        &mut self,
        id: Uuid,
        hours: u64,
        minutes: u64,
        seconds: u64,
    ) -> Result<TimerSnapshot, TimerError> {
        self.update(id, |t| {
            t.configure(hours, minutes, seconds);
        })
    }

    pub fn configure_input(
        &mut self,
        id: Uuid,
        hours: &str,
        minutes: &str,
        seconds: &str,
    ) -> Result<TimerSnapshot, TimerError> {
        self.update(id, |t| {
            t.configure_input(hours, minutes, seconds);
        })
    }

    pub fn set_preset(&mut self, id: Uuid, minutes: u64) -> Result<TimerSnapshot, TimerError> {
        self.update(id, |t| {
            t.set_preset(minutes);
        })
    }

    pub fn set_title(&mut self, id: Uuid, title: &str) -> Result<TimerSnapshot, TimerError> {
        self.update(id, |t| {
            t.set_title(title);
        })
    }

    /// Recompute every running timer and fire completions that are due
    ///
    /// Returns the timers that completed on this tick.
    pub fn tick_all(&mut self) -> Vec<TimerSnapshot> {
        let mut completed = Vec::new();

        for timer in self.timers.iter_mut().filter(|t| t.state().is_active()) {
            let finished = timer.tick();
            let snapshot = timer.snapshot();
            if finished {
                completed.push(snapshot);
            } else {
                let _ = self.events_tx.send(TimerEvent::Updated(snapshot));
            }
        }

        for snapshot in &completed {
            self.dispatcher.dispatch(&self.settings, snapshot);
            self.publish(TimerEvent::Completed(snapshot.clone()));
        }
        completed
    }

    /// Out-of-band recomputation after the system wakes from sleep
    pub fn handle_wake(&mut self) -> Vec<TimerSnapshot> {
        let running = self.timers.iter().filter(|t| t.state().is_active()).count();
        info!("Recalibrating {} running timers after wake", running);
        self.tick_all()
    }

    /// Start/pause hotkey: toggle every timer
    pub fn toggle_all(&mut self) -> Vec<TimerSnapshot> {
        self.for_each_timer(Timer::toggle)
    }

    /// Reset hotkey: reset every timer
    pub fn reset_all(&mut self) -> Vec<TimerSnapshot> {
        self.for_each_timer(Timer::reset)
    }

    /// Show/hide hotkey target: the newest timer, created if none exist
    ///
    /// Returns the id and whether it was created by this call.
    pub fn toggle_latest(&mut self) -> (Uuid, bool) {
        match self.timers.last() {
            Some(timer) => (timer.id(), false),
            None => (self.create_timer(), true),
        }
    }

    fn for_each_timer(&mut self, mut op: impl FnMut(&mut Timer)) -> Vec<TimerSnapshot> {
        // Bring running timers up to date so pause freezes the current value.
        self.tick_all();

        let snapshots: Vec<TimerSnapshot> = self
            .timers
            .iter_mut()
            .map(|t| {
                op(t);
                t.snapshot()
            })
            .collect();

        for snapshot in &snapshots {
            self.publish(TimerEvent::Updated(snapshot.clone()));
        }
        snapshots
    }

    fn update(
        &mut self,
        id: Uuid,
        op: impl FnOnce(&mut Timer),
    ) -> Result<TimerSnapshot, TimerError> {
        // Bring a running timer up to date first; this may complete it.
        self.tick_all();

        let timer = self.find_mut(id)?;
        let before = timer.state();
        op(timer);
        let snapshot = timer.snapshot();

        if before != snapshot.state {
            debug!("Timer {} {} -> {}", id, before, snapshot.state);
        }
        self.publish(TimerEvent::Updated(snapshot.clone()));
        Ok(snapshot)
    }

    fn find(&self, id: Uuid) -> Result<&Timer, TimerError> {
        self.timers
            .iter()
            .find(|t| t.id() == id)
            .ok_or(TimerError::NotFound(id))
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut Timer, TimerError> {
        self.timers
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(TimerError::NotFound(id))
    }

    fn publish(&self, event: TimerEvent) {
        self.activity.notify_one();
        if self.events_tx.send(event).is_err() {
            debug!("No subscribers for timer event");
        }
    }
}
