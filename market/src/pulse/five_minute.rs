use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use super::{Pulse, PulseOutcome, WindowKind, percent_change};
use crate::history::PriceHistory;

/// Samples required before the 5-minute comparison can run.
pub const FIVE_MIN_SAMPLES: usize = 300;

/// Compares the incoming price against the oldest sample currently in the
/// window (~5 minutes back at one tick per second), at most once per five
/// minutes.
///
/// Unlike the other windows this one always reports when due; `fired` only
/// decides whether the notification body carries the alert prefix.
pub struct FiveMinutePulse {
    threshold_pct: f64,
    checkpoint: DateTime<Utc>,
}

impl FiveMinutePulse {
    pub fn new(threshold_pct: f64, start: DateTime<Utc>) -> Self {
        Self {
            threshold_pct,
            checkpoint: start,
        }
    }

    pub fn checkpoint(&self) -> DateTime<Utc> {
        self.checkpoint
    }
}

impl Pulse for FiveMinutePulse {
    fn evaluate(
        &mut self,
        history: &PriceHistory,
        price_now: f64,
        ts: DateTime<Utc>,
    ) -> Option<PulseOutcome> {
        if history.len() < FIVE_MIN_SAMPLES {
            return None;
        }
        if ts - self.checkpoint < Duration::minutes(5) {
            return None;
        }

        self.checkpoint = ts;

        let then = history.oldest()?;
        let Some(change_pct) = percent_change(price_now, then.price) else {
            warn!(baseline = then.price, "non-positive baseline; 5min check skipped");
            return None;
        };

        Some(PulseOutcome {
            kind: WindowKind::FiveMinute,
            price_now,
            price_then: then.price,
            change_pct,
            fired: change_pct.abs() >= self.threshold_pct,
        })
    }
}
