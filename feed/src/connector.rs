//! Binance WebSocket feed connector.
//!
//! Maintains a reconnecting subscription to combined `@ticker` streams and
//! forwards decoded ticks over an mpsc channel. The loop never gives up:
//! availability is favored over fail-fast, so any error path falls back to
//! a fixed backoff and a fresh connection attempt.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, warn};

use common::clock::Clock;
use market::types::{Instrument, Tick};

use crate::parser::parse_ticker;

pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Delay between reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Long-lived subscription to Binance ticker streams for a fixed
/// instrument set.
pub struct BinanceFeed {
    ws_url: String,
    instruments: Vec<Instrument>,
    watched: HashSet<Instrument>,
    clock: Arc<dyn Clock>,
}

impl BinanceFeed {
    pub fn new(ws_url: String, instruments: Vec<Instrument>, clock: Arc<dyn Clock>) -> Self {
        let watched = instruments.iter().cloned().collect();
        Self {
            ws_url,
            instruments,
            watched,
            clock,
        }
    }

    /// One logical stream per instrument, combined into a single connection.
    fn stream_url(&self) -> String {
        let streams: Vec<String> = self
            .instruments
            .iter()
            .map(|i| format!("{}@ticker", i.as_str()))
            .collect();

        format!("{}/{}", self.ws_url, streams.join("/"))
    }

    /// Connect, stream, and on any error reconnect after a fixed backoff.
    /// Returns only once the tick channel is closed.
    pub async fn run(&self, tick_tx: Sender<Tick>) -> anyhow::Result<()> {
        let url = self.stream_url();

        loop {
            info!(url = %url, "connecting to price feed");

            match connect_async(url.as_str()).await {
                Ok((ws, _)) => {
                    info!("price feed connected");
                    let (_write, mut read) = ws.split();

                    while let Some(msg) = read.next().await {
                        let msg = match msg {
                            Ok(m) => m,
                            Err(e) => {
                                warn!(error = %e, "feed stream error");
                                break;
                            }
                        };

                        if !msg.is_text() {
                            continue;
                        }

                        let raw = match msg.to_text() {
                            Ok(t) => t,
                            Err(e) => {
                                warn!(error = %e, "non-utf8 feed frame dropped");
                                continue;
                            }
                        };

                        let Some(tick) = self.decode(raw) else {
                            continue;
                        };

                        if tick_tx.send(tick).await.is_err() {
                            info!("tick channel closed; stopping feed");
                            return Ok(());
                        }
                    }

                    warn!("price feed disconnected");
                }
                Err(e) => error!(error = %e, "price feed connection failed"),
            }

            info!(delay_s = RECONNECT_DELAY.as_secs(), "reconnecting after backoff");
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    /// Decode and filter one frame. Malformed input and unwatched
    /// instruments are dropped without affecting the connection.
    fn decode(&self, raw: &str) -> Option<Tick> {
        let raw_tick = match parse_ticker(raw) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "malformed feed message dropped");
                return None;
            }
        };

        let instrument = Instrument::new(&raw_tick.symbol);
        if !self.watched.contains(&instrument) {
            debug!(instrument = %instrument, "tick for unwatched instrument discarded");
            return None;
        }

        Some(Tick {
            instrument,
            price: raw_tick.price,
            ts: self.clock.now_utc(),
        })
    }
}
