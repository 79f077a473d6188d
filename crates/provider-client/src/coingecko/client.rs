use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::{CoinQuote, SimplePriceResponse};
use crate::adapter::SourceAdapter;
use crate::types::{
    format_amount, CoinRef, FetchOutcome, FetchRequest, ProviderResult, SourceCategory,
};

const SIMPLE_PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

pub const NAME: &str = "CoinGecko API";
const WEIGHT: u8 = 99;
/// Applied when the 24h change field is missing from an otherwise valid quote.
const PENALIZED_WEIGHT: u8 = 90;

#[derive(Debug)]
pub struct CoinGeckoClient {
    http: Client,
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Bulk spot-price lookup for a set of canonical coin ids.
    #[instrument(name = "coingecko.simple_price", skip(self))]
    pub async fn simple_price(&self, ids: &[String]) -> Result<SimplePriceResponse> {
        let joined = ids.join(",");
        let url = format!(
            "{SIMPLE_PRICE_URL}?ids={}&vs_currencies=usd&include_24hr_change=true&include_market_cap=true",
            urlencoding::encode(&joined)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch CoinGecko prices")?;

        if !response.status().is_success() {
            anyhow::bail!("CoinGecko price fetch failed: {}", response.status());
        }

        response
            .json::<SimplePriceResponse>()
            .await
            .context("Failed to decode CoinGecko response")
    }

    fn decode(coins: &[CoinRef], prices: &SimplePriceResponse) -> FetchOutcome {
        let mut lines = Vec::new();
        let mut penalized = false;

        for coin in coins {
            let Some(quote) = prices.get(&coin.id) else {
                continue;
            };
            let Some(line) = render_quote(coin, quote) else {
                continue;
            };
            if quote.usd_24h_change.is_none() {
                penalized = true;
            }
            lines.push(line);
        }

        if lines.is_empty() {
            return FetchOutcome::Empty;
        }

        let confidence = if penalized { PENALIZED_WEIGHT } else { WEIGHT };
        FetchOutcome::Hit(ProviderResult::new(NAME, lines.join("; "), confidence))
    }
}

/// One human-readable quote line, or `None` when the spot price is absent.
fn render_quote(coin: &CoinRef, quote: &CoinQuote) -> Option<String> {
    let price = quote.usd?;
    let mut line = format!("{}: ${}", coin.label, format_amount(price, 6));

    if let Some(change) = quote.usd_24h_change {
        line.push_str(&format!(" (24h {change:+.2}%)"));
    }
    if let Some(market_cap) = quote.usd_market_cap {
        line.push_str(&format!(", MCap ${}", format_amount(market_cap, 0)));
    }
    Some(line)
}

#[async_trait]
impl SourceAdapter for CoinGeckoClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Market
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "coingecko.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        if request.coins.is_empty() {
            return None;
        }

        let ids: Vec<String> = request.coins.iter().map(|c| c.id.clone()).collect();
        match self.simple_price(&ids).await {
            Ok(prices) => Self::decode(&request.coins, &prices).hit(),
            Err(error) => {
                debug!(error = %error, "CoinGecko fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitcoin() -> CoinRef {
        CoinRef {
            id: "bitcoin".to_string(),
            symbol: Some("BTCUSDT".to_string()),
            label: "Bitcoin".to_string(),
        }
    }

    #[test]
    fn renders_full_quote() {
        let quote = CoinQuote {
            usd: Some(67_250.5),
            usd_24h_change: Some(2.154),
            usd_market_cap: Some(1_320_000_000_000.0),
        };
        let line = render_quote(&bitcoin(), &quote).expect("line");
        assert_eq!(line, "Bitcoin: $67,250.5 (24h +2.15%), MCap $1,320,000,000,000");
    }

    #[test]
    fn missing_price_renders_nothing() {
        let quote = CoinQuote {
            usd: None,
            usd_24h_change: Some(1.0),
            usd_market_cap: None,
        };
        assert!(render_quote(&bitcoin(), &quote).is_none());
    }

    #[test]
    fn missing_change_penalizes_confidence() {
        let mut prices = SimplePriceResponse::new();
        prices.insert(
            "bitcoin".to_string(),
            CoinQuote {
                usd: Some(67_000.0),
                usd_24h_change: None,
                usd_market_cap: None,
            },
        );
        let outcome = CoinGeckoClient::decode(&[bitcoin()], &prices);
        let result = outcome.hit().expect("hit");
        assert_eq!(result.confidence, PENALIZED_WEIGHT);
    }

    #[test]
    fn unknown_coin_yields_empty() {
        let prices = SimplePriceResponse::new();
        let outcome = CoinGeckoClient::decode(&[bitcoin()], &prices);
        assert!(outcome.hit().is_none());
    }
}
