use chrono::{DateTime, Duration, Utc};

/// Default send caps: 3 per minute, 200 per day.
pub const MINUTE_LIMIT: u32 = 3;
pub const DAY_LIMIT: u32 = 200;

/// Send caps per accounting window.
#[derive(Clone, Copy, Debug)]
pub struct QuotaLimits {
    pub per_minute: u32,
    pub per_day: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            per_minute: MINUTE_LIMIT,
            per_day: DAY_LIMIT,
        }
    }
}

/// Counters for the per-minute and per-day quota windows.
///
/// Windows are refreshed lazily on each check. A check arriving late rolls
/// the elapsed window exactly once; the new window starts at the check time,
/// so repeated checks within it never reset again.
#[derive(Clone, Debug)]
pub struct QuotaState {
    minute_sent: u32,
    day_sent: u32,
    minute_started: DateTime<Utc>,
    day_started: DateTime<Utc>,
}

impl QuotaState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            minute_sent: 0,
            day_sent: 0,
            minute_started: now,
            day_started: now,
        }
    }

    /// Roll any window whose length has elapsed since its start.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        if now - self.minute_started > Duration::minutes(1) {
            self.minute_sent = 0;
            self.minute_started = now;
        }
        if now - self.day_started > Duration::days(1) {
            self.day_sent = 0;
            self.day_started = now;
        }
    }

    pub fn has_headroom(&self, limits: &QuotaLimits) -> bool {
        self.minute_sent < limits.per_minute && self.day_sent < limits.per_day
    }

    /// Account one send attempt against both windows. A failed delivery
    /// counts the same as a successful one.
    pub fn consume(&mut self) {
        self.minute_sent += 1;
        self.day_sent += 1;
    }

    pub fn minute_sent(&self) -> u32 {
        self.minute_sent
    }

    pub fn day_sent(&self) -> u32 {
        self.day_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn headroom_reflects_both_windows() {
        let limits = QuotaLimits {
            per_minute: 2,
            per_day: 3,
        };
        let mut quota = QuotaState::new(start());

        assert!(quota.has_headroom(&limits));
        quota.consume();
        quota.consume();
        assert!(!quota.has_headroom(&limits));

        // Minute rolls over; the day cap now binds after one more send.
        quota.refresh(start() + Duration::seconds(61));
        assert!(quota.has_headroom(&limits));
        quota.consume();
        assert_eq!(quota.day_sent(), 3);

        quota.refresh(start() + Duration::seconds(122));
        assert!(!quota.has_headroom(&limits));
    }

    #[test]
    fn late_check_resets_a_window_exactly_once() {
        let mut quota = QuotaState::new(start());
        quota.consume();
        quota.consume();

        // Checked well after the minute elapsed: one reset, window re-anchored.
        let late = start() + Duration::seconds(200);
        quota.refresh(late);
        assert_eq!(quota.minute_sent(), 0);

        quota.consume();

        // Re-checking within the re-anchored window must not reset again.
        quota.refresh(late + Duration::seconds(30));
        assert_eq!(quota.minute_sent(), 1);
    }

    #[test]
    fn exact_window_length_does_not_reset() {
        let mut quota = QuotaState::new(start());
        quota.consume();

        quota.refresh(start() + Duration::seconds(60));
        assert_eq!(quota.minute_sent(), 1);

        quota.refresh(start() + Duration::seconds(61));
        assert_eq!(quota.minute_sent(), 0);
    }

    #[test]
    fn day_window_resets_independently() {
        let mut quota = QuotaState::new(start());
        for _ in 0..5 {
            quota.consume();
        }
        assert_eq!(quota.day_sent(), 5);

        quota.refresh(start() + Duration::days(1) + Duration::seconds(1));
        assert_eq!(quota.day_sent(), 0);
        assert_eq!(quota.minute_sent(), 0);
    }
}
