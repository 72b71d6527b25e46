use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single monitored trading pair symbol, normalized to lowercase.
///
/// The monitored set is fixed at startup; there is no dynamic add/remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used in notification bodies.
    pub fn display_symbol(&self) -> String {
        self.0.to_uppercase()
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One decoded price update from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub instrument: Instrument,
    pub price: f64,
    pub ts: DateTime<Utc>,
}

/// Percentage thresholds for the three comparison horizons.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub instant_pct: f64,
    pub one_min_pct: f64,
    pub five_min_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            instant_pct: 0.1,
            one_min_pct: 1.0,
            five_min_pct: 2.0,
        }
    }
}

/// A push notification produced by the detector, pending admission.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub instrument: Instrument,
    pub body: String,
}
