use chrono::{DateTime, Utc};
use tracing::warn;

use super::{Pulse, PulseOutcome, WindowKind, percent_change};
use crate::history::PriceHistory;

/// Tick-over-tick comparison against the most recent stored sample.
///
/// Runs on every tick once at least one sample is stored; the change value
/// is always computed so that below-threshold outcomes can still be logged.
pub struct InstantPulse {
    threshold_pct: f64,
}

impl InstantPulse {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }
}

impl Pulse for InstantPulse {
    fn evaluate(
        &mut self,
        history: &PriceHistory,
        price_now: f64,
        _ts: DateTime<Utc>,
    ) -> Option<PulseOutcome> {
        let prev = history.latest()?;

        let Some(change_pct) = percent_change(price_now, prev.price) else {
            warn!(baseline = prev.price, "non-positive baseline; instant check skipped");
            return None;
        };

        Some(PulseOutcome {
            kind: WindowKind::Instant,
            price_now,
            price_then: prev.price,
            change_pct,
            fired: change_pct.abs() >= self.threshold_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PricePoint;
    use chrono::{TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn history_with(price: f64) -> PriceHistory {
        let mut history = PriceHistory::new();
        history.push(PricePoint { ts: now(), price });
        history
    }

    #[test]
    fn empty_history_yields_no_outcome() {
        let mut pulse = InstantPulse::new(0.1);
        assert!(pulse.evaluate(&PriceHistory::new(), 100.0, now()).is_none());
    }

    #[test]
    fn fires_at_threshold() {
        let mut pulse = InstantPulse::new(0.1);
        let history = history_with(100.0);

        let outcome = pulse.evaluate(&history, 100.1, now()).unwrap();
        assert!(outcome.fired);
        assert!((outcome.change_pct - 0.1).abs() < 1e-9);
        assert_eq!(outcome.kind, WindowKind::Instant);
    }

    #[test]
    fn below_threshold_still_reports_the_change() {
        let mut pulse = InstantPulse::new(0.1);
        let history = history_with(100.0);

        let outcome = pulse.evaluate(&history, 100.05, now()).unwrap();
        assert!(!outcome.fired);
        assert!((outcome.change_pct - 0.05).abs() < 1e-9);
    }

    #[test]
    fn non_positive_baseline_is_skipped() {
        let mut pulse = InstantPulse::new(0.1);
        let history = history_with(0.0);

        assert!(pulse.evaluate(&history, 100.0, now()).is_none());
    }
}
