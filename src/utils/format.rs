//! Countdown display formatting

use std::time::Duration;

/// Clock-style display: `H:MM:SS` from one hour up, `MM:SS` below
pub fn formatted_time(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let hours = secs / 3600;
    let minutes = secs % 3600 / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Short display for cramped layouts such as a menu bar title
pub fn compact_time(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let minutes = secs / 60;

    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, minutes % 60)
    } else if secs >= 60 {
        format!("{}m {}s", minutes, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// Fraction of the countdown already elapsed, clamped to `[0, 1]`
pub fn progress(total: Duration, remaining: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    let total = total.as_secs_f64();
    ((total - remaining.as_secs_f64()) / total).clamp(0.0, 1.0)
}

/// Format an uptime duration the way the status endpoint reports it
pub fn uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_time_switches_layout_at_one_hour() {
        assert_eq!(formatted_time(Duration::from_secs(3661)), "1:01:01");
        assert_eq!(formatted_time(Duration::from_secs(125)), "02:05");
        assert_eq!(formatted_time(Duration::ZERO), "00:00");
    }

    #[test]
    fn formatted_time_truncates_fractions() {
        assert_eq!(formatted_time(Duration::from_millis(59_999)), "00:59");
    }

    #[test]
    fn compact_time_picks_largest_units() {
        assert_eq!(compact_time(Duration::from_secs(3661)), "1h 1m");
        assert_eq!(compact_time(Duration::from_secs(125)), "2m 5s");
        assert_eq!(compact_time(Duration::from_secs(30)), "30s");
    }

    #[test]
    fn progress_is_clamped() {
        let total = Duration::from_secs(100);
        assert!((progress(total, Duration::from_secs(75)) - 0.25).abs() < 1e-9);
        assert_eq!(progress(total, total), 0.0);
        assert_eq!(progress(total, Duration::ZERO), 1.0);
        assert_eq!(progress(total, Duration::from_secs(150)), 0.0);
        assert_eq!(progress(Duration::ZERO, Duration::ZERO), 0.0);
    }

    #[test]
    fn uptime_omits_empty_leading_units() {
        assert_eq!(uptime(Duration::from_secs(42)), "42s");
        assert_eq!(uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(uptime(Duration::from_secs(7384)), "2h 3m 4s");
    }
}
