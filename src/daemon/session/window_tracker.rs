use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::daemon::sync::records::UsageEvent;

/// Dwell times at or below this many seconds are not reported.
pub const MIN_REPORTED_DWELL_SECONDS: u64 = 10;

/// Follows the foreground window across ticks and closes out an interval every time it changes.
pub struct WindowSessionTracker {
    engineer_id: Arc<str>,
    last_window: Option<Arc<str>>,
    last_change: DateTime<Utc>,
}

impl WindowSessionTracker {
    pub fn new(engineer_id: Arc<str>, now: DateTime<Utc>) -> Self {
        Self {
            engineer_id,
            last_window: None,
            last_change: now,
        }
    }

    pub fn current_window(&self) -> Option<&str> {
        self.last_window.as_deref()
    }

    /// Feeds the window seen in the current tick.
    ///
    /// When the title differs from the previous one (an empty title counts as a title) the
    /// previous interval is closed. It is reported only if it lasted longer than
    /// [MIN_REPORTED_DWELL_SECONDS] and `is_idle` is false. `is_idle` describes the sample that
    /// detected the change, not the interval being closed.
    pub fn observe(
        &mut self,
        window_title: &Arc<str>,
        is_idle: bool,
        now: DateTime<Utc>,
    ) -> Option<UsageEvent> {
        if self.last_window.as_ref() == Some(window_title) {
            return None;
        }

        let previous = self.last_window.replace(window_title.clone());
        let started = std::mem::replace(&mut self.last_change, now);

        let previous = previous?;
        let duration_seconds = whole_seconds_between(started, now);
        if duration_seconds > MIN_REPORTED_DWELL_SECONDS && !is_idle {
            Some(self.usage_event(previous, duration_seconds, now))
        } else {
            None
        }
    }

    /// Closes the open interval when tracking stops. Intervals of an empty title are dropped.
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<UsageEvent> {
        let window = self.last_window.take()?;
        let started = std::mem::replace(&mut self.last_change, now);

        let duration_seconds = whole_seconds_between(started, now);
        if window.is_empty() || duration_seconds <= MIN_REPORTED_DWELL_SECONDS {
            return None;
        }
        Some(self.usage_event(window, duration_seconds, now))
    }

    fn usage_event(
        &self,
        active_window: Arc<str>,
        duration_seconds: u64,
        now: DateTime<Utc>,
    ) -> UsageEvent {
        UsageEvent {
            engineer_id: self.engineer_id.clone(),
            active_window,
            duration_seconds,
            timestamp: now,
        }
    }
}

/// Truncates towards zero. A clock stepping backwards gives zero rather than a negative value.
fn whole_seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}
