use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of `simple/price`, keyed by canonical coin id.
pub type SimplePriceResponse = HashMap<String, CoinQuote>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinQuote {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
}
