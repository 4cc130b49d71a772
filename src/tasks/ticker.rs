//! Periodic recomputation of running timers

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that ticks running timers on a fixed cadence
///
/// While nothing is running the task parks on the manager's activity signal;
/// any control call raises it, which wakes the task to check again. The task
/// holds no event receiver, so event subscribers are all external.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting ticker task ({:?} interval)", state.tick_interval);

    let activity = match state.with_timers(|timers| timers.activity()) {
        Ok(activity) => activity,
        Err(e) => {
            error!("Ticker failed to reach timers, not starting: {}", e);
            return;
        }
    };

    loop {
        match state.with_timers(|timers| timers.any_running()) {
            Ok(true) => {}
            Ok(false) => {
                activity.notified().await;
                continue;
            }
            Err(e) => {
                error!("Ticker failed to inspect timers: {}", e);
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        }

        debug!("Timers running, ticking every {:?}", state.tick_interval);
        let mut ticks = interval(state.tick_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;

            let still_running = state.with_timers(|timers| {
                timers.tick_all();
                timers.any_running()
            });

            match still_running {
                Ok(true) => continue,
                Ok(false) => {
                    debug!("No timers running, ticker idle");
                    break;
                }
                Err(e) => {
                    error!("Ticker failed to tick timers: {}", e);
                    break;
                }
            }
        }
    }
}
