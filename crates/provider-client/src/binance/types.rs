use serde::{Deserialize, Serialize};

/// Subset of the 24hr ticker statistics payload.
///
/// Binance serializes numeric fields as strings; they are parsed lazily so a
/// malformed field degrades that line instead of failing the whole decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker24h {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, rename = "lastPrice")]
    pub last_price: Option<String>,
    #[serde(default, rename = "priceChangePercent")]
    pub price_change_percent: Option<String>,
    #[serde(default, rename = "quoteVolume")]
    pub quote_volume: Option<String>,
}
