//! Monotonic clock abstraction
//!
//! Timers anchor on readings from a [`Clock`] and recompute remaining time from
//! the delta, so the clock must never go backwards and must ignore wall-clock
//! adjustments. The system implementation also keeps counting while the
//! machine is asleep, which lets a wake-up tick catch up in one step.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::{Duration, Instant},
};

/// Source of monotonic time, measured from an arbitrary origin
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios"
    ))]
    Kernel,
    Process,
}

/// Clock backed by the operating system
///
/// The latest reading is kept so a failed kernel read repeats it instead of
/// switching to a clock with a different origin.
#[derive(Debug)]
pub struct SystemClock {
    source: Source,
    origin: Instant,
    last_nanos: AtomicU64,
}

impl SystemClock {
    /// Create a clock, preferring a kernel clock that counts through suspend
    pub fn new() -> Self {
        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "macos",
            target_os = "ios"
        ))]
        {
            if kernel::read().is_some() {
                return Self::with_source(Source::Kernel);
            }
            tracing::warn!("Suspend-aware clock unavailable, falling back to process clock");
        }

        Self::with_source(Source::Process)
    }

    fn with_source(source: Source) -> Self {
        Self { source, origin: Instant::now(), last_nanos: AtomicU64::new(0) }
    }

    /// Record a reading and return it, or the latest one if the read failed
    fn resolve(&self, reading: Option<Duration>) -> Duration {
        let last = match reading {
            Some(reading) => {
                let nanos = u64::try_from(reading.as_nanos()).unwrap_or(u64::MAX);
                self.last_nanos.fetch_max(nanos, Ordering::AcqRel).max(nanos)
            }
            None => self.last_nanos.load(Ordering::Acquire),
        };
        Duration::from_nanos(last)
    }

    /// Whether this clock keeps counting while the system sleeps
    pub fn counts_through_sleep(&self) -> bool {
        self.source != Source::Process
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        let reading = match self.source {
            #[cfg(any(
                target_os = "linux",
                target_os = "android",
                target_os = "macos",
                target_os = "ios"
            ))]
            Source::Kernel => kernel::read(),
            Source::Process => Some(self.origin.elapsed()),
        };
        self.resolve(reading)
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
))]
mod kernel {
    use std::time::Duration;

    // BOOTTIME on Linux and MONOTONIC on Darwin both include time spent asleep.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    const CLOCK_ID: libc::clockid_t = libc::CLOCK_BOOTTIME;
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    const CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC;

    pub(super) fn read() -> Option<Duration> {
        // SAFETY: timespec is plain data, and `ts` stays valid and writable
        // for the duration of the call.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::clock_gettime(CLOCK_ID, &mut ts) };
        if rc != 0 || ts.tv_sec < 0 {
            return None;
        }
        Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }
}

/// Clock that only moves when told to, for simulating elapsed time and sleep
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}
