//! Wake-up recovery background task

use std::{sync::Arc, time::{Duration, Instant}};
use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Wall-clock progress beyond process time that counts as a sleep
const SLEEP_GAP_THRESHOLD: Duration = Duration::from_secs(2);

/// Background task that detects system wake-up and recalibrates timers
///
/// The process clock stops while the machine sleeps but the wall clock does
/// not, so a gap between the two over one poll interval means we were asleep.
pub async fn wake_up_recovery_task(state: Arc<AppState>) {
    info!("Starting wake-up recovery task");

    let mut ticks = interval(state.wake_check_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_wall = Utc::now();
    let mut last_mono = Instant::now();

    loop {
        ticks.tick().await;

        let wall = Utc::now();
        let mono = Instant::now();
        let slept = sleep_gap(wall - last_wall, mono - last_mono);
        last_wall = wall;
        last_mono = mono;

        let Some(gap) = slept else {
            continue;
        };

        info!("System wake-up detected (asleep ~{}s), recalibrating timers", gap.as_secs());
        match state.with_timers(|timers| timers.handle_wake()) {
            Ok(completed) if !completed.is_empty() => {
                info!("{} timers completed while the system was asleep", completed.len());
            }
            Ok(_) => debug!("No timers completed during sleep"),
            Err(e) => warn!("Failed to recalibrate timers after wake: {}", e),
        }
    }
}

/// How much longer the wall clock ran than the process clock, if it looks
/// like a sleep rather than scheduling jitter
///
/// Backwards wall-clock adjustments produce a negative gap and are ignored.
pub fn sleep_gap(wall_elapsed: chrono::Duration, mono_elapsed: Duration) -> Option<Duration> {
    let wall = wall_elapsed.to_std().ok()?;
    let gap = wall.checked_sub(mono_elapsed)?;
    (gap > SLEEP_GAP_THRESHOLD).then_some(gap)
}
