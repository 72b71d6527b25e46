pub mod five_minute;
pub mod instant;
pub mod minute;

use chrono::{DateTime, Utc};

use crate::history::PriceHistory;

/// Named comparison horizon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowKind {
    Instant,
    OneMinute,
    FiveMinute,
}

impl WindowKind {
    /// Short label used in notification bodies and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            WindowKind::Instant => "1s",
            WindowKind::OneMinute => "1min",
            WindowKind::FiveMinute => "5min",
        }
    }
}

/// One evaluated comparison of the incoming price against a baseline taken
/// from the window.
#[derive(Clone, Debug)]
pub struct PulseOutcome {
    pub kind: WindowKind,
    pub price_now: f64,
    pub price_then: f64,
    pub change_pct: f64,
    /// Whether |change| reached the configured threshold.
    pub fired: bool,
}

/// Evaluates one window kind for a single instrument.
///
/// The incoming sample is NOT yet part of `history`; the existing window is
/// the comparison baseline. Returns `None` when the check is not due, has
/// too little history, or hit a detection failure (logged by the
/// implementation).
pub trait Pulse {
    fn evaluate(
        &mut self,
        history: &PriceHistory,
        price_now: f64,
        ts: DateTime<Utc>,
    ) -> Option<PulseOutcome>;
}

/// Percent change of `now` against `then`. `None` on a non-positive
/// baseline, which callers treat as a detection failure for that check only.
pub(crate) fn percent_change(now: f64, then: f64) -> Option<f64> {
    if then <= 0.0 {
        return None;
    }
    Some((now - then) / then * 100.0)
}
