use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::{DexPair, DexSearchResponse};
use crate::adapter::SourceAdapter;
use crate::types::{format_amount, FetchOutcome, FetchRequest, ProviderResult, SourceCategory};

const SEARCH_URL: &str = "https://api.dexscreener.com/latest/dex/search";

pub const NAME: &str = "DexScreener";
const WEIGHT: u8 = 94;

#[derive(Debug)]
pub struct DexScreenerClient {
    http: Client,
}

impl Default for DexScreenerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DexScreenerClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Search DEX pairs by token name.
    #[instrument(name = "dexscreener.search", skip(self))]
    pub async fn search(&self, query: &str) -> Result<DexSearchResponse> {
        let url = format!("{SEARCH_URL}?q={}", urlencoding::encode(query));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch DexScreener pairs")?;

        if !response.status().is_success() {
            anyhow::bail!("DexScreener search failed: {}", response.status());
        }

        response
            .json::<DexSearchResponse>()
            .await
            .context("Failed to decode DexScreener response")
    }

    fn decode(pairs: &[DexPair]) -> FetchOutcome {
        let Some(pair) = pairs.first() else {
            return FetchOutcome::Empty;
        };
        match render_pair(pair) {
            Some(line) => FetchOutcome::Hit(ProviderResult::new(NAME, line, WEIGHT)),
            None => FetchOutcome::Malformed,
        }
    }
}

fn render_pair(pair: &DexPair) -> Option<String> {
    let price: f64 = pair.price_usd.as_deref()?.parse().ok()?;
    let base = pair
        .base_token
        .as_ref()
        .and_then(|t| t.symbol.as_deref())
        .unwrap_or("?");
    let quote = pair
        .quote_token
        .as_ref()
        .and_then(|t| t.symbol.as_deref())
        .unwrap_or("USD");
    let liquidity = pair.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);

    Some(format!(
        "{base}/{quote}: ${price:.4}, Liquidity: ${}",
        format_amount(liquidity, 0)
    ))
}

#[async_trait]
impl SourceAdapter for DexScreenerClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Market
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "dexscreener.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        // Only consulted for coins that have no centralized exchange ticker.
        let coin = request.coins.iter().find(|c| c.symbol.is_none())?;

        match self.search(&coin.label).await {
            Ok(results) => Self::decode(&results.pairs).hit(),
            Err(error) => {
                debug!(coin = %coin.id, error = %error, "DexScreener fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dexscreener::types::{DexLiquidity, DexToken};

    #[test]
    fn renders_first_pair() {
        let pair = DexPair {
            base_token: Some(DexToken {
                symbol: Some("NOS".to_string()),
            }),
            quote_token: Some(DexToken {
                symbol: Some("USDC".to_string()),
            }),
            price_usd: Some("0.8421".to_string()),
            liquidity: Some(DexLiquidity {
                usd: Some(1_532_890.0),
            }),
        };
        let line = render_pair(&pair).expect("line");
        assert_eq!(line, "NOS/USDC: $0.8421, Liquidity: $1,532,890");
    }

    #[test]
    fn empty_pairs_is_empty_outcome() {
        assert!(DexScreenerClient::decode(&[]).hit().is_none());
    }

    #[test]
    fn decodes_camel_case_payload() {
        let body = r#"{
            "pairs": [{
                "baseToken": {"symbol": "NOS"},
                "quoteToken": {"symbol": "USDC"},
                "priceUsd": "0.8421",
                "liquidity": {"usd": 1532890.0}
            }]
        }"#;
        let decoded: DexSearchResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(decoded.pairs.len(), 1);
        assert_eq!(decoded.pairs[0].price_usd.as_deref(), Some("0.8421"));
    }

    #[test]
    fn missing_price_is_malformed() {
        let pair = DexPair {
            base_token: None,
            quote_token: None,
            price_usd: None,
            liquidity: None,
        };
        assert!(matches!(
            DexScreenerClient::decode(&[pair]),
            FetchOutcome::Malformed
        ));
    }
}
