use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use super::{Pulse, PulseOutcome, WindowKind, percent_change};
use crate::history::PriceHistory;

/// Samples required before the 1-minute comparison can run.
pub const ONE_MIN_SAMPLES: usize = 60;

/// Compares the incoming price against the sample sixty positions back from
/// the tail, at most once per minute.
///
/// The checkpoint advances on every due evaluation, whether or not the
/// threshold fired, so the window never re-fires within its interval.
pub struct MinutePulse {
    threshold_pct: f64,
    checkpoint: DateTime<Utc>,
}

impl MinutePulse {
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

impl Pulse for MinutePulse {
    fn evaluate(
        &mut self,
        history: &PriceHistory,
        price_now: f64,
        ts: DateTime<Utc>,
    ) -> Option<PulseOutcome> {
        if history.len() < ONE_MIN_SAMPLES {
            return None;
        }
        if ts - self.checkpoint < Duration::minutes(1) {
            return None;
        }

        // The interval is consumed even if the comparison fails below.
        self.checkpoint = ts;

        let then = history.recent(ONE_MIN_SAMPLES)?;
        let Some(change_pct) = percent_change(price_now, then.price) else {
            warn!(baseline = then.price, "non-positive baseline; 1min check skipped");
            return None;
        };

        Some(PulseOutcome {
            kind: WindowKind::OneMinute,
            price_now,
            price_then: then.price,
            change_pct,
            fired: change_pct.abs() >= self.threshold_pct,
        })
    }
}
