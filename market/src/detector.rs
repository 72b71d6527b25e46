//! Sliding-window change detection over a fixed instrument set.
//!
//! One [`MarketEngine`] instance is driven by the tick processing loop.
//! Single ownership keeps history appends and checkpoint updates ordered
//! per instrument: every tick finishes all window checks and its append
//! before the next tick is looked at.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::history::{PriceHistory, PricePoint};
use crate::pulse::five_minute::FiveMinutePulse;
use crate::pulse::instant::InstantPulse;
use crate::pulse::minute::MinutePulse;
use crate::pulse::{Pulse, PulseOutcome};
use crate::types::{Instrument, Notification, Thresholds, Tick};

/// Everything the engine tracks for one instrument: the price window, the
/// per-window-kind checkpoints (owned by the pulses) and the initial-price
/// flag. Created at startup, lives for the process lifetime.
struct InstrumentState {
    history: PriceHistory,
    instant: InstantPulse,
    minute: MinutePulse,
    five_minute: FiveMinutePulse,
    initial_sent: bool,
}

impl InstrumentState {
    fn new(thresholds: &Thresholds, start: DateTime<Utc>) -> Self {
        Self {
            history: PriceHistory::new(),
            instant: InstantPulse::new(thresholds.instant_pct),
            minute: MinutePulse::new(thresholds.one_min_pct, start),
            five_minute: FiveMinutePulse::new(thresholds.five_min_pct, start),
            initial_sent: false,
        }
    }
}

/// Evaluates the three comparison windows for every incoming tick and turns
/// firing outcomes into notifications.
pub struct MarketEngine {
    states: HashMap<Instrument, InstrumentState>,
}

impl MarketEngine {
    pub fn new(instruments: &[Instrument], thresholds: Thresholds, start: DateTime<Utc>) -> Self {
        let states = instruments
            .iter()
            .map(|instrument| (instrument.clone(), InstrumentState::new(&thresholds, start)))
            .collect();

        Self { states }
    }

    /// Runs all window checks against the existing window, then appends the
    /// new sample. Returns the notifications this tick produced, in check
    /// order.
    pub fn on_tick(&mut self, tick: &Tick) -> Vec<Notification> {
        let Some(state) = self.states.get_mut(&tick.instrument) else {
            // The feed filters instruments; reaching this means a wiring bug.
            warn!(instrument = %tick.instrument, "tick for unconfigured instrument dropped");
            return Vec::new();
        };

        let mut out = Vec::new();
        let symbol = tick.instrument.display_symbol();

        // The very first sample bypasses all checks and announces itself,
        // once per instrument per process lifetime.
        if !state.initial_sent {
            state.initial_sent = true;
            info!(instrument = %tick.instrument, price = tick.price, "initial price observed");
            out.push(Notification {
                instrument: tick.instrument.clone(),
                body: format!("{symbol} Initial Price: ${:.4}", tick.price),
            });
        }

        if let Some(outcome) = state.instant.evaluate(&state.history, tick.price, tick.ts) {
            if outcome.fired {
                info!(
                    instrument = %tick.instrument,
                    change_pct = outcome.change_pct,
                    "1s price change detected"
                );
                out.push(Notification {
                    instrument: tick.instrument.clone(),
                    body: render_alert(&symbol, &outcome),
                });
            } else {
                debug!(
                    instrument = %tick.instrument,
                    samples = state.history.len(),
                    change_pct = outcome.change_pct,
                    price = outcome.price_now,
                    prev = outcome.price_then,
                    "1s change below threshold"
                );
            }
        }

        if let Some(outcome) = state.minute.evaluate(&state.history, tick.price, tick.ts) {
            if outcome.fired {
                info!(
                    instrument = %tick.instrument,
                    change_pct = outcome.change_pct,
                    "1min price change detected"
                );
                out.push(Notification {
                    instrument: tick.instrument.clone(),
                    body: render_alert(&symbol, &outcome),
                });
            } else {
                debug!(
                    instrument = %tick.instrument,
                    change_pct = outcome.change_pct,
                    "1min change below threshold"
                );
            }
        }

        if let Some(outcome) = state.five_minute.evaluate(&state.history, tick.price, tick.ts) {
            // Always reported when due; the threshold only decides the
            // alert prefix.
            info!(
                instrument = %tick.instrument,
                change_pct = outcome.change_pct,
                alert = outcome.fired,
                "5min status"
            );
            out.push(Notification {
                instrument: tick.instrument.clone(),
                body: render_five_minute(&symbol, &outcome),
            });
        }

        state.history.push(PricePoint {
            ts: tick.ts,
            price: tick.price,
        });

        out
    }
}

fn render_alert(symbol: &str, outcome: &PulseOutcome) -> String {
    let label = outcome.kind.label();
    format!(
        "{symbol} {label} 🚨:\nPrice now: ${:.4}\nPrice {label} ago: ${:.4}\nChange: {:.4}%",
        outcome.price_now, outcome.price_then, outcome.change_pct
    )
}

fn render_five_minute(symbol: &str, outcome: &PulseOutcome) -> String {
    let body = format!(
        "{symbol} 5min update:\nPrice now: ${:.4}\nPrice 5min ago: ${:.4}\nChange: {:.4}%",
        outcome.price_now, outcome.price_then, outcome.change_pct
    );

    if outcome.fired {
        format!("{symbol} 5min 🚨:\n{body}")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::WindowKind;

    fn outcome(change_pct: f64, fired: bool) -> PulseOutcome {
        PulseOutcome {
            kind: WindowKind::FiveMinute,
            price_now: 103.0,
            price_then: 100.0,
            change_pct,
            fired,
        }
    }

    #[test]
    fn five_minute_prefix_tracks_the_fired_flag() {
        let alerted = render_five_minute("BTCUSDT", &outcome(3.0, true));
        assert!(alerted.starts_with("BTCUSDT 5min 🚨:\n"));
        assert!(alerted.contains("BTCUSDT 5min update:"));

        let quiet = render_five_minute("BTCUSDT", &outcome(1.0, false));
        assert!(quiet.starts_with("BTCUSDT 5min update:"));
        assert!(!quiet.contains("🚨"));
    }
}
