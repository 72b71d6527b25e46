use serde::Deserialize;
use thiserror::Error;

/// The fields of a Binance `@ticker` event we consume. Every other field is
/// ignored.
#[derive(Debug, Deserialize)]
pub struct TickerEvent {
    /// Symbol, e.g. "BTCUSDT".
    #[serde(rename = "s")]
    pub symbol: String,

    /// Last traded price, string-encoded decimal.
    #[serde(rename = "c")]
    pub last_price: String,
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("undecodable ticker message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid price field {0:?}")]
    InvalidPrice(String),
}

/// Decoded (symbol, price) pair before instrument filtering and
/// timestamping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTick {
    pub symbol: String,
    pub price: f64,
}

/// Decode one text frame into a raw tick. The feed is assumed to never emit
/// non-positive prices; if it does anyway the frame is rejected here.
pub fn parse_ticker(raw: &str) -> Result<RawTick, FeedError> {
    let event: TickerEvent = serde_json::from_str(raw)?;

    let price: f64 = event
        .last_price
        .parse()
        .map_err(|_| FeedError::InvalidPrice(event.last_price.clone()))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(FeedError::InvalidPrice(event.last_price));
    }

    Ok(RawTick {
        symbol: event.symbol,
        price,
    })
}
