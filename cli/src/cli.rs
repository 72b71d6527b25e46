use clap::Parser;

use market::types::{Instrument, Thresholds};

#[derive(Debug, Parser)]
#[clap(name = "pricewatch", version)]
pub struct Cli {
    /// Instruments to monitor (comma-separated Binance symbols)
    #[clap(long, value_delimiter = ',', default_value = "btcusdt")]
    pub instruments: Vec<String>,

    /// Instant (tick-over-tick) change threshold, in percent
    #[clap(long, default_value_t = 0.1)]
    pub instant_threshold: f64,

    /// 1-minute change threshold, in percent
    #[clap(long, default_value_t = 1.0)]
    pub one_min_threshold: f64,

    /// 5-minute change threshold, in percent
    #[clap(long, default_value_t = 2.0)]
    pub five_min_threshold: f64,

    /// Override the Binance WebSocket endpoint
    #[clap(long, default_value = feed::connector::DEFAULT_WS_URL)]
    pub ws_url: String,
}

impl Cli {
    pub fn instruments(&self) -> Vec<Instrument> {
        self.instruments.iter().map(Instrument::new).collect()
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            instant_pct: self.instant_threshold,
            one_min_pct: self.one_min_threshold,
            five_min_pct: self.five_min_threshold,
        }
    }
}
