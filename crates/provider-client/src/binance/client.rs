use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::Ticker24h;
use crate::adapter::SourceAdapter;
use crate::types::{format_amount, CoinRef, FetchRequest, ProviderResult, SourceCategory};

const TICKER_URL: &str = "https://api.binance.com/api/v3/ticker/24hr";

pub const NAME: &str = "Binance API";
const WEIGHT: u8 = 98;

#[derive(Debug)]
pub struct BinanceClient {
    http: Client,
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BinanceClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// 24-hour rolling window statistics for one exchange symbol.
    #[instrument(name = "binance.ticker_24h", skip(self))]
    pub async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h> {
        let url = format!("{TICKER_URL}?symbol={}", urlencoding::encode(symbol));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch Binance ticker")?;

        if !response.status().is_success() {
            anyhow::bail!("Binance ticker fetch failed for {symbol}: {}", response.status());
        }

        response
            .json::<Ticker24h>()
            .await
            .context("Failed to decode Binance response")
    }
}

/// One ticker line, or `None` when the last price is absent or unparseable.
fn render_ticker(coin: &CoinRef, symbol: &str, ticker: &Ticker24h) -> Option<String> {
    let price: f64 = ticker.last_price.as_deref()?.parse().ok()?;
    let mut line = format!("{} {symbol}: ${}", coin.label, format_amount(price, 2));

    if let Some(change) = ticker
        .price_change_percent
        .as_deref()
        .and_then(|p| p.parse::<f64>().ok())
    {
        line.push_str(&format!(" (24h {change:+.2}%"));
        if let Some(volume) = ticker
            .quote_volume
            .as_deref()
            .and_then(|v| v.parse::<f64>().ok())
        {
            line.push_str(&format!(", Vol ${}", format_amount(volume, 0)));
        }
        line.push(')');
    }
    Some(line)
}

#[async_trait]
impl SourceAdapter for BinanceClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Market
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "binance.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let mut lines = Vec::new();

        // Not every coin is listed on Binance (Nosana has no ticker symbol).
        for coin in request.coins.iter().filter(|c| c.symbol.is_some()) {
            let Some(symbol) = coin.symbol.as_deref() else {
                continue;
            };
            match self.ticker_24h(symbol).await {
                Ok(ticker) => {
                    if let Some(line) = render_ticker(coin, symbol, &ticker) {
                        lines.push(line);
                    }
                }
                Err(error) => {
                    debug!(symbol, error = %error, "Binance ticker failed");
                }
            }
        }

        if lines.is_empty() {
            return None;
        }
        Some(ProviderResult::new(NAME, lines.join("; "), WEIGHT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethereum() -> CoinRef {
        CoinRef {
            id: "ethereum".to_string(),
            symbol: Some("ETHUSDT".to_string()),
            label: "Ethereum".to_string(),
        }
    }

    #[test]
    fn renders_full_ticker() {
        let ticker = Ticker24h {
            symbol: Some("ETHUSDT".to_string()),
            last_price: Some("3520.40".to_string()),
            price_change_percent: Some("-1.25".to_string()),
            quote_volume: Some("2100000000.55".to_string()),
        };
        let line = render_ticker(&ethereum(), "ETHUSDT", &ticker).expect("line");
        assert_eq!(line, "Ethereum ETHUSDT: $3,520.4 (24h -1.25%, Vol $2,100,000,001)");
    }

    #[test]
    fn unparseable_price_renders_nothing() {
        let ticker = Ticker24h {
            symbol: None,
            last_price: Some("not-a-number".to_string()),
            price_change_percent: None,
            quote_volume: None,
        };
        assert!(render_ticker(&ethereum(), "ETHUSDT", &ticker).is_none());
    }
}
